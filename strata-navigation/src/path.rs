//! Path canonicalization, side-panel keys and collection lookup.

use strata_model::EntityCollection;

const SEPARATOR: char = '/';

/// Strips one leading and one trailing `/`, leaving internal separators alone.
pub fn canonicalize(path: &str) -> &str {
    let path = path.strip_prefix(SEPARATOR).unwrap_or(path);
    path.strip_suffix(SEPARATOR).unwrap_or(path)
}

/// Key of the view showing `path` (a collection) or `path/entity_id` (one entity).
///
/// This is the only key used by the override store, so list and detail views
/// of the same path never share an entry.
pub fn side_panel_key(path: &str, entity_id: Option<&str>) -> String {
    match entity_id {
        Some(entity_id) => format!("{}/{}", canonicalize(path), canonicalize(entity_id)),
        None => canonicalize(path).to_string(),
    }
}

/// Finds the collection registered under `path`.
///
/// Subcollection paths are relative to their parent, with one entity id
/// segment in between: `products/42/locales` finds `locales` under `products`.
pub fn find_collection<'a>(
    path: &str,
    collections: &'a [EntityCollection],
) -> Option<&'a EntityCollection> {
    let path = canonicalize(path);
    collections.iter().find_map(|collection| {
        let own = canonicalize(&collection.path);
        if path == own {
            return Some(collection);
        }
        let rest = path.strip_prefix(own)?.strip_prefix(SEPARATOR)?;
        let (_entity_id, sub_path) = rest.split_once(SEPARATOR)?;
        find_collection(sub_path, collection.subcollections.as_deref()?)
    })
}

//! Mapping between application URLs and collection data paths.

use crate::error::{NavigationError, NavigationResult};
use crate::path::canonicalize;

/// URL layout of the application: everything lives under `base_path`, and
/// collections under `base_path/base_collection_path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmsUrls {
    base_path: String,
    base_collection_path: String,
    home_url: String,
    full_collection_path: String,
}

impl CmsUrls {
    pub fn new(base_path: &str, base_collection_path: &str) -> Self {
        let base_path = canonicalize(base_path).to_string();
        let base_collection_path = canonicalize(base_collection_path).to_string();
        let (home_url, full_collection_path) = if base_path.is_empty() {
            ("/".to_string(), format!("/{base_collection_path}"))
        } else {
            (
                format!("/{base_path}"),
                format!("/{base_path}/{base_collection_path}"),
            )
        };
        Self {
            base_path,
            base_collection_path,
            home_url,
            full_collection_path,
        }
    }

    pub fn home_url(&self) -> &str {
        &self.home_url
    }

    /// Absolute URL prefix of the collection area, e.g. `/admin/c`.
    pub fn full_collection_path(&self) -> &str {
        &self.full_collection_path
    }

    /// Whether `url` points inside the collection area.
    pub fn is_url_collection_path(&self, url: &str) -> bool {
        let area = format!("{}/", canonicalize(&self.full_collection_path));
        canonicalize(&format!("{url}/")).starts_with(&area)
    }

    /// Strips the collection-area prefix from `url`, returning the canonical data path.
    pub fn url_path_to_data_path(&self, url: &str) -> NavigationResult<String> {
        url.strip_prefix(self.full_collection_path.as_str())
            .filter(|rest| rest.is_empty() || rest.starts_with('/'))
            .map(|rest| canonicalize(rest).to_string())
            .ok_or_else(|| NavigationError::InvalidUrlPath {
                path: url.to_string(),
                expected_prefix: self.full_collection_path.clone(),
            })
    }

    /// URL of a collection, relative to the application root.
    pub fn build_url_collection_path(&self, path: &str) -> String {
        format!("{}/{}", self.base_collection_path, canonicalize(path))
    }

    /// Absolute URL of an application-relative `path`.
    pub fn build_cms_url_path(&self, path: &str) -> String {
        if self.base_path.is_empty() {
            format!("/{}", canonicalize(path))
        } else {
            format!("/{}/{}", self.base_path, canonicalize(path))
        }
    }
}

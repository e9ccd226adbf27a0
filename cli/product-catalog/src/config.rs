//! Configuration types for catalog client construction.

use std::collections::BTreeMap;
use std::time::Duration;

/// Base URL used when none is configured.
pub const DEFAULT_CATALOG_URL: &str = "http://127.0.0.1:5000/api";

/// Configuration for catalog client construction.
#[derive(Debug, Clone)]
pub struct CatalogClientConfig {
    /// Base URL of the API; the product collection lives at `{catalog_url}/products`.
    pub catalog_url: String,
    /// Additional headers to include in requests.
    pub extra_headers: BTreeMap<String, String>,
    /// Value of the `user-agent` header, reqwest's default if unset.
    pub user_agent: Option<String>,
    /// Upper bound for a whole request.
    ///
    /// Requests are not bounded unless this is set.
    pub request_timeout: Option<Duration>,
}

impl Default for CatalogClientConfig {
    fn default() -> Self {
        Self {
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            extra_headers: BTreeMap::new(),
            user_agent: None,
            request_timeout: None,
        }
    }
}

use std::time::Duration;

use anyhow::Context;
use product_catalog::{CatalogClient, CatalogClientConfig};
use tracing::debug;

use crate::config::Config;

/// `user-agent` sent unless configured otherwise.
pub const DEFAULT_USER_AGENT: &str = concat!("products/", env!("CARGO_PKG_VERSION"));

/// Translate the user configuration into a client configuration.
pub fn catalog_client_config(config: &Config) -> CatalogClientConfig {
    CatalogClientConfig {
        catalog_url: config.catalog_url.clone(),
        extra_headers: config.extra_headers.clone(),
        user_agent: Some(
            config
                .user_agent
                .clone()
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        ),
        request_timeout: config.request_timeout_secs.map(Duration::from_secs),
    }
}

/// Initialize the catalog API client
pub fn init_catalog_client(config: &Config) -> Result<CatalogClient, anyhow::Error> {
    let client_config = catalog_client_config(config);
    debug!("using catalog client with url: {}", client_config.catalog_url);

    CatalogClient::new(client_config).context("could not set up the catalog client")
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use pretty_assertions::assert_eq;

    use super::*;

    fn config() -> Config {
        Config {
            catalog_url: "http://localhost:8080/api".to_string(),
            user_agent: None,
            request_timeout_secs: None,
            extra_headers: BTreeMap::new(),
            config_dir: Default::default(),
        }
    }

    #[test]
    fn defaults_user_agent_and_no_timeout() {
        let client_config = catalog_client_config(&config());
        assert_eq!(client_config.catalog_url, "http://localhost:8080/api");
        assert_eq!(client_config.user_agent.as_deref(), Some(DEFAULT_USER_AGENT));
        assert_eq!(client_config.request_timeout, None);
    }

    #[test]
    fn configured_values_are_passed_on() {
        let config = Config {
            user_agent: Some("custom".to_string()),
            request_timeout_secs: Some(30),
            extra_headers: BTreeMap::from([("x-team".to_string(), "shop".to_string())]),
            ..config()
        };
        let client_config = catalog_client_config(&config);
        assert_eq!(client_config.user_agent.as_deref(), Some("custom"));
        assert_eq!(client_config.request_timeout, Some(Duration::from_secs(30)));
        assert_eq!(client_config.extra_headers, config.extra_headers);
    }

    #[test]
    fn invalid_url_is_reported() {
        let config = Config {
            catalog_url: "not a url".to_string(),
            ..config()
        };
        let err = init_catalog_client(&config).unwrap_err();
        assert_eq!(err.to_string(), "could not set up the catalog client");
    }
}

use std::collections::{BTreeMap, HashMap};
use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use config::{Config as HierarchicalConfig, Environment};
use product_catalog::DEFAULT_CATALOG_URL;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Name of the directory holding our configuration
pub const PRODUCTS_DIR_NAME: &str = "products";
const PRODUCTS_CONFIG_DIR_VAR: &str = "PRODUCTS_CONFIG_DIR";
const PRODUCTS_ENV_PREFIX: &str = "PRODUCTS_";
pub const PRODUCTS_CONFIG_FILE: &str = "products.toml";

/// Describes the configuration of the products CLI
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Config {
    /// Base URL of the product API, the collection is at `{catalog_url}/products`
    pub catalog_url: String,

    /// `user-agent` header to send
    pub user_agent: Option<String>,

    /// Give up on a request after this many seconds.
    ///
    /// Requests are not bounded by default.
    pub request_timeout_secs: Option<u64>,

    /// Additional headers to send with every request
    #[serde(default)]
    pub extra_headers: BTreeMap<String, String>,

    /// Directory the configuration file is read from (default:
    /// `$XDG_CONFIG_HOME/products`)
    pub config_dir: PathBuf,
}

impl Config {
    /// Creates a [Config] from the environment and config file
    pub fn parse() -> Result<Config> {
        let config_dir = match env::var(PRODUCTS_CONFIG_DIR_VAR) {
            Ok(v) => {
                debug!("`${PRODUCTS_CONFIG_DIR_VAR}` set: {v}");
                PathBuf::from(v)
            },
            Err(_) => {
                let config_dir = dirs::config_dir()
                    .ok_or_else(|| anyhow!("Could not determine the user config directory"))?
                    .join(PRODUCTS_DIR_NAME);
                debug!("`${PRODUCTS_CONFIG_DIR_VAR}` not set, using {config_dir:?}");
                config_dir
            },
        };

        let products_envs = env::vars()
            .filter_map(|(k, v)| {
                k.strip_prefix(PRODUCTS_ENV_PREFIX)
                    .map(|k| (k.to_owned(), v))
            })
            .collect::<HashMap<_, _>>();

        Self::read(&config_dir, products_envs)
    }

    /// Layer defaults, the config file in `config_dir` and `PRODUCTS_*`
    /// variables (given with the prefix stripped).
    fn read(config_dir: &Path, products_envs: HashMap<String, String>) -> Result<Config> {
        let config_file = config_dir.join(PRODUCTS_CONFIG_FILE);
        debug!(?config_file, "reading config");

        let builder = HierarchicalConfig::builder()
            .set_default("catalog_url", DEFAULT_CATALOG_URL)?
            // Config dir is added to the config for completeness;
            // the config file cannot change the config dir.
            .set_override("config_dir", config_dir.to_string_lossy().as_ref())?
            .add_source(
                config::File::from(config_file.clone())
                    .format(config::FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                Environment::default()
                    .source(Some(products_envs))
                    .try_parsing(true),
            );

        let final_config = builder
            .build()
            .with_context(|| format!("Could not read config file {config_file:?}"))?;

        final_config
            .try_deserialize()
            .context("Could not parse config")
    }

    /// Apply overrides given on the command line.
    pub fn with_catalog_url(mut self, catalog_url: Option<String>) -> Self {
        if let Some(catalog_url) = catalog_url {
            self.catalog_url = catalog_url;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn defaults_without_file() {
        let dir = tempdir().unwrap();
        let config = Config::read(dir.path(), HashMap::new()).unwrap();

        assert_eq!(config.catalog_url, DEFAULT_CATALOG_URL);
        assert_eq!(config.user_agent, None);
        assert_eq!(config.request_timeout_secs, None);
        assert!(config.extra_headers.is_empty());
        assert_eq!(config.config_dir, dir.path());
    }

    #[test]
    fn file_values() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(PRODUCTS_CONFIG_FILE), indoc! {r#"
            catalog_url = "https://shop.example.com/api"
            request_timeout_secs = 10

            [extra_headers]
            x-team = "shop"
        "#})
        .unwrap();

        let config = Config::read(dir.path(), HashMap::new()).unwrap();
        assert_eq!(config.catalog_url, "https://shop.example.com/api");
        assert_eq!(config.request_timeout_secs, Some(10));
        assert_eq!(
            config.extra_headers,
            BTreeMap::from([("x-team".to_string(), "shop".to_string())])
        );
    }

    #[test]
    fn environment_overrides_file() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(PRODUCTS_CONFIG_FILE),
            "catalog_url = \"https://shop.example.com/api\"\n",
        )
        .unwrap();

        let envs = HashMap::from([
            ("CATALOG_URL".to_string(), "http://localhost:9000/api".to_string()),
            ("REQUEST_TIMEOUT_SECS".to_string(), "5".to_string()),
        ]);
        let config = Config::read(dir.path(), envs).unwrap();
        assert_eq!(config.catalog_url, "http://localhost:9000/api");
        assert_eq!(config.request_timeout_secs, Some(5));
    }

    #[test]
    fn command_line_overrides_everything() {
        let dir = tempdir().unwrap();
        let envs = HashMap::from([(
            "CATALOG_URL".to_string(),
            "http://localhost:9000/api".to_string(),
        )]);
        let config = Config::read(dir.path(), envs)
            .unwrap()
            .with_catalog_url(Some("http://10.0.0.1/api".to_string()));
        assert_eq!(config.catalog_url, "http://10.0.0.1/api");
    }

    #[test]
    fn config_dir_cannot_be_changed_by_file() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(PRODUCTS_CONFIG_FILE),
            "config_dir = \"/somewhere/else\"\n",
        )
        .unwrap();

        let config = Config::read(dir.path(), HashMap::new()).unwrap();
        assert_eq!(config.config_dir, dir.path());
    }

    #[test]
    fn invalid_file_is_an_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(PRODUCTS_CONFIG_FILE), "catalog_url = [").unwrap();

        let err = Config::read(dir.path(), HashMap::new()).unwrap_err();
        assert!(err.to_string().starts_with("Could not read config file"));
    }
}

use crate::config::toml_config::TomlConfig;
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_identifier, validate_path, validate_range, validate_url, Validate,
};
use serde::Serialize;

pub const DEFAULT_FEED_URL: &str =
    "https://raw.githubusercontent.com/firehol/blocklist-ipsets/master/firehol_level1.netset";
pub const DEFAULT_DATABASE: &str = "./blocklist.db";
pub const DEFAULT_COLLECTION: &str = "blocklist";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_PIPELINE_NAME: &str = "blocklist-etl";

/// Fully resolved run settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub pipeline_name: String,
    pub feed_url: String,
    pub database: String,
    pub collection: String,
    pub timeout_seconds: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pipeline_name: DEFAULT_PIPELINE_NAME.to_string(),
            feed_url: DEFAULT_FEED_URL.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

impl Settings {
    /// Defaults overlaid with whatever the file sets.
    pub fn from_toml(config: &TomlConfig) -> Self {
        let defaults = Self::default();
        Self {
            pipeline_name: config
                .pipeline
                .name
                .clone()
                .unwrap_or(defaults.pipeline_name),
            feed_url: config.source.url.clone().unwrap_or(defaults.feed_url),
            database: config.sink.database.clone().unwrap_or(defaults.database),
            collection: config
                .sink
                .collection
                .clone()
                .unwrap_or(defaults.collection),
            timeout_seconds: config
                .source
                .timeout_seconds
                .unwrap_or(defaults.timeout_seconds),
        }
    }
}

impl ConfigProvider for Settings {
    fn feed_url(&self) -> &str {
        &self.feed_url
    }

    fn database_path(&self) -> &str {
        &self.database
    }

    fn collection(&self) -> &str {
        &self.collection
    }

    fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_url("feed_url", &self.feed_url)?;
        validate_path("database", &self.database)?;
        validate_identifier("collection", &self.collection)?;
        validate_range("timeout_seconds", self.timeout_seconds, 1, 600)?;

        tracing::debug!("✅ Configuration validation passed");
        Ok(())
    }
}

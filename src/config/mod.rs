pub mod settings;
pub mod toml_config;

pub use settings::Settings;
pub use toml_config::TomlConfig;

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "blocklist-etl")]
#[command(about = "Load an IP/CIDR blocklist feed into a keyed document store")]
pub struct CliConfig {
    /// Feed URL (newline-delimited addresses and CIDR blocks)
    #[arg(long)]
    pub feed_url: Option<String>,

    /// SQLite database file used as the document store
    #[arg(long)]
    pub database: Option<String>,

    /// Collection (table) name inside the database
    #[arg(long)]
    pub collection: Option<String>,

    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Normalize into memory and print the records instead of writing them
    #[arg(long)]
    pub dry_run: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Resolve settings: command line flags, then the config file, then defaults.
    pub fn resolve(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path);
                Settings::from_toml(&TomlConfig::from_file(path)?)
            }
            None => Settings::default(),
        };

        if let Some(feed_url) = &self.feed_url {
            settings.feed_url = feed_url.clone();
        }
        if let Some(database) = &self.database {
            settings.database = database.clone();
        }
        if let Some(collection) = &self.collection {
            settings.collection = collection.clone();
        }
        if let Some(timeout) = self.timeout_seconds {
            settings.timeout_seconds = timeout;
        }

        Ok(settings)
    }
}

pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;
pub use crate::config::{Settings, TomlConfig};

pub use crate::adapters::{http::HttpFeedSource, memory::MemorySink, sqlite::SqliteSink};
pub use crate::core::etl::EtlEngine;
pub use crate::core::normalizer::{normalize, normalize_at, normalize_report};
pub use crate::domain::model::{AddressKind, AddressRecord, NormalizeReport, RunSummary};
pub use crate::utils::error::{EtlError, Result};

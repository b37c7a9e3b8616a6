pub mod etl;
pub mod normalizer;

pub use crate::domain::model::{AddressKind, AddressRecord, NormalizeReport, RunSummary};
pub use crate::domain::ports::{ConfigProvider, FeedSource, RecordSink};
pub use crate::utils::error::Result;

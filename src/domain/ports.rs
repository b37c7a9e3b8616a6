use crate::domain::model::{AddressRecord, UpsertOutcome};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Where the raw feed lines come from.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_lines(&self) -> Result<Vec<String>>;
}

/// Keyed store that accepts repeated upserts of the same record.
pub trait RecordSink: Send + Sync {
    fn upsert(
        &self,
        record: &AddressRecord,
    ) -> impl std::future::Future<Output = Result<UpsertOutcome>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn feed_url(&self) -> &str;
    fn database_path(&self) -> &str;
    fn collection(&self) -> &str;
    fn timeout_seconds(&self) -> u64;
}

use crate::domain::model::{AddressRecord, StoredRecord, UpsertOutcome};
use crate::domain::ports::RecordSink;
use crate::utils::error::Result;
use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use tokio::sync::Mutex;

/// In-process keyed store with the same upsert semantics as [`super::sqlite::SqliteSink`].
/// Used for dry runs. Documents keep the order of their first insert.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    documents: Arc<Mutex<Documents>>,
}

#[derive(Debug, Default)]
struct Documents {
    records: Vec<StoredRecord>,
    index: HashMap<String, usize>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &str) -> Option<StoredRecord> {
        let documents = self.documents.lock().await;
        documents
            .index
            .get(key)
            .map(|&slot| documents.records[slot].clone())
    }

    pub async fn len(&self) -> usize {
        self.documents.lock().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.lock().await.records.is_empty()
    }

    /// All documents in first-insert order.
    pub async fn snapshot(&self) -> Vec<StoredRecord> {
        self.documents.lock().await.records.clone()
    }

    /// Writes one JSON record per line, in first-insert order.
    pub async fn write_json_lines<W: Write>(&self, mut out: W) -> Result<()> {
        let documents = self.documents.lock().await;
        for stored in &documents.records {
            serde_json::to_writer(&mut out, &stored.record)?;
            out.write_all(b"\n")?;
        }
        out.flush()?;
        Ok(())
    }
}

impl RecordSink for MemorySink {
    async fn upsert(&self, record: &AddressRecord) -> Result<UpsertOutcome> {
        let mut documents = self.documents.lock().await;

        let existing = documents.index.get(record.key()).copied();
        if let Some(slot) = existing {
            documents.records[slot].record = record.clone();
            return Ok(UpsertOutcome::Updated);
        }

        let slot = documents.records.len();
        documents.records.push(StoredRecord {
            record: record.clone(),
            first_seen: record.observed_at(),
        });
        documents.index.insert(record.key().to_string(), slot);
        Ok(UpsertOutcome::Inserted)
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Whether a feed entry names one host or a whole network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AddressKind {
    Single,
    Range,
}

impl AddressKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressKind::Single => "SINGLE",
            AddressKind::Range => "RANGE",
        }
    }
}

impl fmt::Display for AddressKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AddressKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SINGLE" => Ok(AddressKind::Single),
            "RANGE" => Ok(AddressKind::Range),
            other => Err(format!("unknown address kind: {}", other)),
        }
    }
}

/// Canonical output unit of the normalizer. The key is the upsert key at the sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRecord {
    key: String,
    kind: AddressKind,
    observed_at: DateTime<Utc>,
}

impl AddressRecord {
    pub fn new(key: impl Into<String>, kind: AddressKind, observed_at: DateTime<Utc>) -> Self {
        Self {
            key: key.into(),
            kind,
            observed_at,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn kind(&self) -> AddressKind {
        self.kind
    }

    pub fn observed_at(&self) -> DateTime<Utc> {
        self.observed_at
    }
}

/// A feed line that could not be parsed, kept for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedLine {
    /// 1-based position in the input.
    pub line_number: usize,
    pub line: String,
    pub reason: String,
}

/// Everything one normalize pass produced.
#[derive(Debug, Clone, Default)]
pub struct NormalizeReport {
    pub records: Vec<AddressRecord>,
    pub rejected: Vec<RejectedLine>,
    /// Blank and comment lines.
    pub skipped: usize,
    pub duplicates: usize,
}

/// A record as held by a sink, with the time it was first stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredRecord {
    pub record: AddressRecord,
    pub first_seen: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

/// Counters for one full pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub fetched_lines: usize,
    pub records: usize,
    pub rejected: usize,
    pub duplicates: usize,
    pub skipped: usize,
    pub inserted: usize,
    pub updated: usize,
    pub failed: usize,
}

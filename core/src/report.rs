use crate::{CarveError, Fat16Geometry};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Outcome of one successfully persisted chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveredFileSummary {
    pub start_cluster: usize,
    pub clusters_read: usize,
    pub raw_length: u64,
    pub length: u64,
    pub crc32: u32,
    pub path: Option<PathBuf>,
}

/// A non-fatal problem recorded during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionFailure {
    /// `None` for failures not tied to a chain, such as the table dump
    pub start_cluster: Option<usize>,
    pub kind: String,
    pub message: String,
}

impl ExtractionFailure {
    pub fn new(start_cluster: Option<usize>, error: &CarveError) -> Self {
        Self {
            start_cluster,
            kind: error.kind().to_string(),
            message: error.to_string(),
        }
    }
}

/// Everything a run produced apart from the recovered bytes themselves
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryReport {
    pub geometry: Fat16Geometry,
    pub table_entries: usize,
    pub beginnings: Vec<usize>,
    pub endings: Vec<usize>,
    pub file_starts: Vec<usize>,
    pub recovered: Vec<RecoveredFileSummary>,
    pub failures: Vec<ExtractionFailure>,
    pub table_dump: Option<PathBuf>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RecoveryReport {
    pub fn recovered_count(&self) -> usize {
        self.recovered.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn to_json(&self) -> Result<String, CarveError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

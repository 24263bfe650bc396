//! Storage abstractions for collected records.
//!
//! A run ends with a single write of every record, in the order produced:
//! state iteration order, then ranking within the state.

pub mod local;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{MarathonRecord, RECORD_HEADERS, RunStats};

// Re-export for convenience
pub use local::LocalStorage;

/// Metadata about a storage write operation.
#[derive(Debug, Clone)]
pub struct WriteSummary {
    /// Where the records were written
    pub location: String,
    /// Number of records written
    pub record_count: usize,
    /// Timestamp of the write
    pub timestamp: DateTime<Utc>,
}

/// JSON document written for the `json` output format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordSnapshot {
    pub generated_at: DateTime<Utc>,
    pub count: usize,
    pub stats: RunStats,
    pub records: Vec<MarathonRecord>,
}

impl RecordSnapshot {
    pub fn new(records: &[MarathonRecord], stats: &RunStats) -> Self {
        Self {
            generated_at: Utc::now(),
            count: records.len(),
            stats: stats.clone(),
            records: records.to_vec(),
        }
    }
}

/// Trait for record storage backends.
#[async_trait]
pub trait RecordStorage: Send + Sync {
    /// Persist the full record set of a run.
    async fn write_records(
        &self,
        records: &[MarathonRecord],
        stats: &RunStats,
    ) -> Result<WriteSummary>;
}

/// Render records as CSV with a header row; unknown values as "-".
pub fn render_csv(records: &[MarathonRecord]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(RECORD_HEADERS)?;
    for record in records {
        writer.write_record(record.to_row())?;
    }
    writer
        .into_inner()
        .map_err(|e| AppError::Io(e.into_error()))
}

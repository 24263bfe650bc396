//! Local filesystem storage implementation.
//!
//! Writes the run's records to a single file, CSV or JSON, replacing any
//! previous output atomically.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use tokio::io::AsyncWriteExt;

use crate::error::Result;
use crate::models::{MarathonRecord, OutputFormat, RunStats};
use crate::storage::{RecordSnapshot, RecordStorage, WriteSummary, render_csv};

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    path: PathBuf,
    format: OutputFormat,
}

impl LocalStorage {
    /// Create a LocalStorage writing to `path` in the given format.
    pub fn new(path: impl Into<PathBuf>, format: OutputFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        self.ensure_dir().await?;

        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    fn render(&self, records: &[MarathonRecord], stats: &RunStats) -> Result<Vec<u8>> {
        match self.format {
            OutputFormat::Csv => render_csv(records),
            OutputFormat::Json => {
                let snapshot = RecordSnapshot::new(records, stats);
                Ok(serde_json::to_vec_pretty(&snapshot)?)
            }
        }
    }
}

#[async_trait]
impl RecordStorage for LocalStorage {
    async fn write_records(
        &self,
        records: &[MarathonRecord],
        stats: &RunStats,
    ) -> Result<WriteSummary> {
        let bytes = self.render(records, stats)?;
        self.write_bytes(&bytes).await?;

        log::info!(
            "Wrote {} records to {}",
            records.len(),
            self.path.display()
        );

        Ok(WriteSummary {
            location: self.path.display().to_string(),
            record_count: records.len(),
            timestamp: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ElevationReading, RaceCandidate, UsState};
    use tempfile::TempDir;

    fn records() -> Vec<MarathonRecord> {
        vec![MarathonRecord::new(
            &UsState::new("Oregon", "OR"),
            RaceCandidate {
                name: "Portland Marathon".to_string(),
                city: "Portland".to_string(),
                date: Some("2025-10-05".to_string()),
                finishers: 3_100,
                course_type: Some("Rolling Hills".to_string()),
            },
            ElevationReading {
                gain_ft: Some(587),
                loss_ft: Some(591),
            },
        )]
    }

    #[tokio::test]
    async fn test_write_csv_creates_parent_dirs() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out/nested/marathons.csv");
        let storage = LocalStorage::new(&path, OutputFormat::Csv);

        let summary = storage
            .write_records(&records(), &RunStats::start(1))
            .await
            .unwrap();

        assert_eq!(summary.record_count, 1);
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("State,State_Code,"));
        assert!(text.contains("Oregon,OR,Portland Marathon,Portland,3100,Rolling Hills,587,591,2025-10-05"));
        assert!(!path.with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn test_write_json_snapshot() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("marathons.json");
        let storage = LocalStorage::new(&path, OutputFormat::Json);

        storage
            .write_records(&records(), &RunStats::start(1))
            .await
            .unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let snapshot: RecordSnapshot = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(snapshot.count, 1);
        assert_eq!(snapshot.records, records());
        assert_eq!(snapshot.stats.states_total, 1);
    }

    #[tokio::test]
    async fn test_write_replaces_previous_output() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("marathons.csv");
        let storage = LocalStorage::new(&path, OutputFormat::Csv);

        storage.write_records(&records(), &RunStats::start(1)).await.unwrap();
        storage.write_records(&[], &RunStats::start(1)).await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 1);
    }
}

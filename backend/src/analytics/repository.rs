use crate::metrics::Metrics;
use async_trait::async_trait;
use shared::{records_from_rows, AttemptRecord, AttemptRow, EventLog, Result, SharedError};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Source of attempt-log snapshots.
///
/// Each call returns a freshly validated log; callers never share a
/// snapshot across requests.
#[async_trait]
pub trait AttemptRepository: Send + Sync {
    async fn load_log(&self) -> Result<EventLog>;

    /// Short description of the backing store for logs and health output.
    fn describe(&self) -> String;
}

/// Attempt log stored on disk, CSV with a header row or a JSON array
/// when the file ends in `.json`. The file is re-read on every call.
#[derive(Debug, Clone)]
pub struct CsvAttemptRepository {
    path: PathBuf,
}

impl CsvAttemptRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_json(&self) -> bool {
        self.path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false)
    }
}

/// Parses CSV bytes with a header row into wire rows.
pub fn parse_csv(bytes: &[u8]) -> Result<Vec<AttemptRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes);
    let mut rows = Vec::new();
    for row in reader.deserialize::<AttemptRow>() {
        rows.push(row?);
    }
    Ok(rows)
}

pub fn parse_json(bytes: &[u8]) -> Result<Vec<AttemptRow>> {
    Ok(serde_json::from_slice(bytes)?)
}

#[async_trait]
impl AttemptRepository for CsvAttemptRepository {
    async fn load_log(&self) -> Result<EventLog> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            SharedError::Io(format!("failed to read {}: {}", self.path.display(), e))
        })?;

        let rows = if self.is_json() {
            parse_json(&bytes)?
        } else {
            parse_csv(&bytes)?
        };
        let log = EventLog::from_records(records_from_rows(rows)?)?;

        log::debug!(
            "Loaded {} attempts for {} contestants from {}",
            log.len(),
            log.runs().len(),
            self.path.display()
        );
        if let Some(metrics) = Metrics::global() {
            metrics.analytics.log_records.set(log.len() as i64);
        }
        Ok(log)
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

/// Fixed set of records, validated on every load like the file store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAttemptRepository {
    records: Arc<Vec<AttemptRecord>>,
}

impl InMemoryAttemptRepository {
    pub fn new(records: Vec<AttemptRecord>) -> Self {
        Self {
            records: Arc::new(records),
        }
    }
}

#[async_trait]
impl AttemptRepository for InMemoryAttemptRepository {
    async fn load_log(&self) -> Result<EventLog> {
        EventLog::from_records(self.records.as_ref().clone())
    }

    fn describe(&self) -> String {
        format!("memory:{} records", self.records.len())
    }
}

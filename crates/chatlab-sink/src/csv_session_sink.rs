//! Append-only CSV implementation of the `SessionSink` trait.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::info;

use chatlab_core::error::DomainError;
use chatlab_core::sink::{SessionRecord, SessionSink};

/// Column headers, written once when the file is empty.
pub const CSV_HEADERS: [&str; 8] = [
    "Session ID",
    "Timestamp",
    "Condition",
    "Chat History",
    "Knowledge Rating",
    "Empathy Rating",
    "Comments",
    "Script Version",
];

/// Timestamp format for the `Timestamp` column.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Session sink appending one row per session to a local CSV file.
///
/// Appends are serialized through a lock shared by all clones, and each row
/// reaches the file in a single write.
#[derive(Debug, Clone)]
pub struct CsvSessionSink {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl CsvSessionSink {
    /// Creates a sink writing to `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// The target file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn to_row(record: &SessionRecord) -> Result<[String; 8], DomainError> {
    Ok([
        record.session_id.clone(),
        record.recorded_at.format(TIMESTAMP_FORMAT).to_string(),
        record.condition.clone(),
        record.chat_history_json()?,
        record.survey_knowledge.to_string(),
        record.survey_empathy.to_string(),
        record.survey_comments.clone(),
        record.script_version.clone(),
    ])
}

fn encode_row(row: &[String; 8], with_header: bool) -> Result<Vec<u8>, DomainError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    if with_header {
        writer
            .write_record(CSV_HEADERS)
            .map_err(|e| DomainError::SinkWrite(format!("csv header write failed: {e}")))?;
    }
    writer
        .write_record(row)
        .map_err(|e| DomainError::SinkWrite(format!("csv row write failed: {e}")))?;
    writer
        .into_inner()
        .map_err(|e| DomainError::SinkWrite(format!("csv encode failed: {e}")))
}

fn append_row(path: &Path, lock: &Mutex<()>, row: &[String; 8]) -> Result<(), DomainError> {
    let _guard = lock
        .lock()
        .map_err(|e| DomainError::SinkWrite(format!("csv write lock poisoned: {e}")))?;

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| DomainError::SinkWrite(format!("cannot open {}: {e}", path.display())))?;
    let is_empty = file
        .metadata()
        .map_err(|e| DomainError::SinkWrite(format!("cannot stat {}: {e}", path.display())))?
        .len()
        == 0;

    let bytes = encode_row(row, is_empty)?;
    file.write_all(&bytes)
        .and_then(|()| file.flush())
        .map_err(|e| DomainError::SinkWrite(format!("csv append to {} failed: {e}", path.display())))
}

#[async_trait]
impl SessionSink for CsvSessionSink {
    async fn record(&self, record: &SessionRecord) -> Result<(), DomainError> {
        let row = to_row(record)?;
        let path = self.path.clone();
        let lock = Arc::clone(&self.write_lock);

        tokio::task::spawn_blocking(move || append_row(&path, &lock, &row))
            .await
            .map_err(|e| DomainError::SinkWrite(format!("csv writer task failed: {e}")))??;

        info!(
            session_id = %record.session_id,
            path = %self.path.display(),
            "session recorded to CSV"
        );
        Ok(())
    }
}

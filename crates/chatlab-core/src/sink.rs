//! Session sink abstraction.
//!
//! A sink is the system of record for completed sessions. The engine hands it
//! one [`SessionRecord`] per session; the transport (table row, CSV line,
//! document) is the sink's business.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// One transcript entry in its persisted shape.
///
/// Field names match the `chat_history` column consumed by analysis tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    /// `assistant` or `user`.
    pub role: String,
    /// Resolved text shown to, or typed by, the participant.
    pub content: String,
    /// Optional image path or URI attached to the turn.
    pub image: Option<String>,
    /// `message`, `section_header`, `question`, or `user`.
    #[serde(rename = "type")]
    pub kind: String,
}

/// The package handed to a sink when a session completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Session identifier.
    pub session_id: String,
    /// Assigned experimental condition.
    pub condition: String,
    /// Full transcript in turn order.
    pub chat_history: Vec<TranscriptEntry>,
    /// Perceived knowledge rating, 1 to 5.
    pub survey_knowledge: u8,
    /// Perceived empathy rating, 1 to 5.
    pub survey_empathy: u8,
    /// Free-text comments.
    pub survey_comments: String,
    /// Hash of the script the session ran against.
    pub script_version: String,
    /// When the record was handed to the sink.
    pub recorded_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Serializes `chat_history` to a JSON string for flat storage.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SinkWrite` if serialization fails.
    pub fn chat_history_json(&self) -> Result<String, DomainError> {
        serde_json::to_string(&self.chat_history)
            .map_err(|e| DomainError::SinkWrite(format!("chat history serialization failed: {e}")))
    }
}

/// Port for persisting completed sessions.
#[async_trait]
pub trait SessionSink: Send + Sync {
    /// Persists one completed session.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SinkWrite` if the record could not be stored.
    async fn record(&self, record: &SessionRecord) -> Result<(), DomainError>;
}

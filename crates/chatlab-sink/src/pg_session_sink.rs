//! `PostgreSQL` implementation of the `SessionSink` trait.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use chatlab_core::error::DomainError;
use chatlab_core::sink::{SessionRecord, SessionSink};

use crate::schema::CREATE_SESSION_RECORDS_TABLE;

/// PostgreSQL-backed session sink: one row per completed session.
#[derive(Debug, Clone)]
pub struct PgSessionSink {
    pool: PgPool,
}

impl PgSessionSink {
    /// Creates a new `PgSessionSink`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the `session_records` table if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the DDL fails.
    pub async fn ensure_schema(&self) -> Result<(), DomainError> {
        sqlx::raw_sql(CREATE_SESSION_RECORDS_TABLE)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Infrastructure(format!("schema setup failed: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl SessionSink for PgSessionSink {
    async fn record(&self, record: &SessionRecord) -> Result<(), DomainError> {
        let chat_history = serde_json::to_value(&record.chat_history).map_err(|e| {
            DomainError::SinkWrite(format!("chat history serialization failed: {e}"))
        })?;

        sqlx::query(
            r"
            INSERT INTO session_records (
                session_id, recorded_at, condition, chat_history,
                survey_knowledge, survey_empathy, survey_comments, script_version
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(&record.session_id)
        .bind(record.recorded_at)
        .bind(&record.condition)
        .bind(chat_history)
        .bind(i16::from(record.survey_knowledge))
        .bind(i16::from(record.survey_empathy))
        .bind(&record.survey_comments)
        .bind(&record.script_version)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::SinkWrite(format!("insert into session_records failed: {e}")))?;

        info!(session_id = %record.session_id, "session recorded to PostgreSQL");
        Ok(())
    }
}

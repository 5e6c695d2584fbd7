//! Primary-then-fallback composite sink.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use chatlab_core::error::DomainError;
use chatlab_core::sink::{SessionRecord, SessionSink};

/// Writes to the primary sink when one is configured and falls back to a
/// secondary sink if it is absent or fails.
#[derive(Clone)]
pub struct FallbackSessionSink {
    primary: Option<Arc<dyn SessionSink>>,
    fallback: Arc<dyn SessionSink>,
}

impl std::fmt::Debug for FallbackSessionSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackSessionSink")
            .field("has_primary", &self.primary.is_some())
            .finish_non_exhaustive()
    }
}

impl FallbackSessionSink {
    /// Creates a composite sink.
    #[must_use]
    pub fn new(primary: Option<Arc<dyn SessionSink>>, fallback: Arc<dyn SessionSink>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl SessionSink for FallbackSessionSink {
    async fn record(&self, record: &SessionRecord) -> Result<(), DomainError> {
        if let Some(primary) = &self.primary {
            match primary.record(record).await {
                Ok(()) => return Ok(()),
                Err(e) => warn!(
                    session_id = %record.session_id,
                    error = %e,
                    "primary session sink failed; trying fallback"
                ),
            }
        }

        self.fallback.record(record).await.map_err(|e| {
            DomainError::SinkWrite(format!("all session sinks failed; last error: {e}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatlab_test_support::{FailingSessionSink, RecordingSessionSink};
    use chrono::Utc;

    fn record() -> SessionRecord {
        SessionRecord {
            session_id: "sess_1".to_owned(),
            condition: "High_Expertise".to_owned(),
            chat_history: Vec::new(),
            survey_knowledge: 3,
            survey_empathy: 3,
            survey_comments: String::new(),
            script_version: String::new(),
            recorded_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_primary_success_skips_fallback() {
        let primary = Arc::new(RecordingSessionSink::new());
        let fallback = Arc::new(RecordingSessionSink::new());
        let sink = FallbackSessionSink::new(Some(primary.clone()), fallback.clone());

        sink.record(&record()).await.unwrap();

        assert_eq!(primary.recorded().len(), 1);
        assert!(fallback.recorded().is_empty());
    }

    #[tokio::test]
    async fn test_primary_failure_uses_fallback() {
        let fallback = Arc::new(RecordingSessionSink::new());
        let sink = FallbackSessionSink::new(Some(Arc::new(FailingSessionSink)), fallback.clone());

        sink.record(&record()).await.unwrap();

        assert_eq!(fallback.recorded().len(), 1);
    }

    #[tokio::test]
    async fn test_no_primary_goes_straight_to_fallback() {
        let fallback = Arc::new(RecordingSessionSink::new());
        let sink = FallbackSessionSink::new(None, fallback.clone());

        sink.record(&record()).await.unwrap();

        assert_eq!(fallback.recorded().len(), 1);
    }

    #[tokio::test]
    async fn test_both_failing_reports_sink_write_error() {
        let sink = FallbackSessionSink::new(
            Some(Arc::new(FailingSessionSink)),
            Arc::new(FailingSessionSink),
        );

        let result = sink.record(&record()).await;

        match result {
            Err(DomainError::SinkWrite(msg)) => assert!(msg.contains("all session sinks failed")),
            other => panic!("expected SinkWrite, got {other:?}"),
        }
    }
}

//! Query handlers for the Session context.
//!
//! Returns read-only view DTOs of live sessions.

use chatlab_core::error::DomainError;
use chatlab_core::sink::TranscriptEntry;
use chatlab_dialogue::domain::design::ExperimentDesign;
use serde::Serialize;
use uuid::Uuid;

use crate::application::store::SessionStore;
use crate::domain::aggregates::SessionState;

/// Read-only view of a session.
#[derive(Debug, Serialize)]
pub struct SessionView {
    /// The session identifier.
    pub session_id: Uuid,
    /// The assigned condition.
    pub condition: String,
    /// Cursor position.
    pub position: usize,
    /// Script length.
    pub total_steps: usize,
    /// Lifecycle state.
    pub state: SessionState,
    /// Transcript so far.
    pub transcript: Vec<TranscriptEntry>,
    /// Whether the survey has been recorded.
    pub survey_recorded: bool,
}

/// Retrieves a session by its ID.
///
/// # Errors
///
/// Returns `DomainError::SessionNotFound` if no live session has the ID.
pub async fn get_session_by_id(
    session_id: Uuid,
    design: &ExperimentDesign,
    store: &dyn SessionStore,
) -> Result<SessionView, DomainError> {
    let session = store
        .load(session_id)
        .await?
        .ok_or(DomainError::SessionNotFound(session_id))?;

    Ok(SessionView {
        session_id,
        condition: session.condition().as_str().to_owned(),
        position: session.position(),
        total_steps: design.script().total_steps(),
        state: session.state(design.script()),
        transcript: session.transcript().iter().map(|t| t.to_entry()).collect(),
        survey_recorded: session.survey().is_some(),
    })
}

#[cfg(test)]
mod tests {
    use chatlab_core::error::DomainError;
    use chatlab_dialogue::domain::condition::{Condition, ConditionSet};
    use chatlab_dialogue::domain::design::ExperimentDesign;
    use chatlab_dialogue::domain::script::{Script, ScriptFormat, ScriptStore};
    use chrono::Utc;
    use uuid::Uuid;

    use crate::application::query_handlers::get_session_by_id;
    use crate::application::store::{InMemorySessionStore, SessionStore};
    use crate::domain::aggregates::{ChatSession, SessionState};

    fn design() -> ExperimentDesign {
        let script = Script::parse(
            r#"[
                {"type": "message", "text": "Hi"},
                {"type": "question", "text": "Name?"},
                {"type": "message", "text": "Bye"}
            ]"#,
            ScriptFormat::Json,
        )
        .unwrap();
        let conditions = ConditionSet::new(vec!["A".to_owned()], None).unwrap();
        ExperimentDesign::new(ScriptStore::from_script(script), conditions)
    }

    #[tokio::test]
    async fn test_get_session_by_id_returns_view_with_state() {
        // Arrange
        let design = design();
        let store = InMemorySessionStore::new();
        let mut session = ChatSession::new(Uuid::new_v4(), Condition::new("A"), Utc::now());
        session.advance(design.script(), design.resolver()).unwrap();
        let session_id = session.id;
        store.save(session, 0).await.unwrap();

        // Act
        let view = get_session_by_id(session_id, &design, &store).await.unwrap();

        // Assert
        assert_eq!(view.session_id, session_id);
        assert_eq!(view.condition, "A");
        assert_eq!(view.position, 2);
        assert_eq!(view.total_steps, 3);
        assert_eq!(view.state, SessionState::HaltedForInput);
        assert_eq!(view.transcript.len(), 2);
        assert_eq!(view.transcript[1].kind, "question");
        assert!(!view.survey_recorded);
    }

    #[tokio::test]
    async fn test_get_session_by_id_returns_not_found() {
        let design = design();
        let store = InMemorySessionStore::new();
        let session_id = Uuid::new_v4();

        let result = get_session_by_id(session_id, &design, &store).await;

        match result.unwrap_err() {
            DomainError::SessionNotFound(id) => assert_eq!(id, session_id),
            other => panic!("expected SessionNotFound, got {other:?}"),
        }
    }
}

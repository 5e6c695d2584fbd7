//! Command handlers for the Session context.
//!
//! Each handler loads the session, runs the domain operation, and saves the
//! result: load, execute, persist.

use std::sync::Mutex;

use chatlab_core::clock::Clock;
use chatlab_core::command::Command;
use chatlab_core::error::DomainError;
use chatlab_core::rng::DeterministicRng;
use chatlab_core::sink::SessionSink;
use chatlab_dialogue::domain::condition::Condition;
use chatlab_dialogue::domain::design::ExperimentDesign;
use chatlab_dialogue::domain::turn::Turn;
use tracing::{info, warn};
use uuid::Uuid;

use crate::application::store::SessionStore;
use crate::domain::aggregates::{ChatSession, SessionState};
use crate::domain::commands::{RecordReply, StartSession, SubmitSurvey};
use crate::domain::survey::SurveyResponse;

/// Result of a command that advanced the conversation.
#[derive(Debug)]
pub struct SessionCommandResult {
    /// The session affected by the command.
    pub session_id: Uuid,
    /// The session's assigned condition.
    pub condition: Condition,
    /// Assistant turns emitted by this command, in order.
    pub turns: Vec<Turn>,
    /// State after the command.
    pub state: SessionState,
}

async fn load_session(
    session_id: Uuid,
    store: &dyn SessionStore,
) -> Result<ChatSession, DomainError> {
    store
        .load(session_id)
        .await?
        .ok_or(DomainError::SessionNotFound(session_id))
}

/// Handles the `StartSession` command: creates a session, assigns a
/// condition, and emits the opening turns.
///
/// This is a CREATION command: the handler generates the session ID.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the RNG mutex is poisoned or the
/// store fails.
pub async fn handle_start_session(
    command: &StartSession,
    design: &ExperimentDesign,
    clock: &dyn Clock,
    rng: &Mutex<dyn DeterministicRng + Send>,
    store: &dyn SessionStore,
) -> Result<SessionCommandResult, DomainError> {
    // Lock RNG only for the synchronous assignment, never across an await.
    let mut session = {
        let mut rng_guard = rng
            .lock()
            .map_err(|e| DomainError::Infrastructure(format!("RNG mutex poisoned: {e}")))?;
        ChatSession::create(design.conditions(), &mut *rng_guard, clock)
    };

    info!(
        command = command.command_type(),
        correlation_id = %command.correlation_id(),
        session_id = %session.id,
        condition = %session.condition(),
        "session assigned to condition"
    );

    let turns = session.advance(design.script(), design.resolver())?;
    let result = SessionCommandResult {
        session_id: session.id,
        condition: session.condition().clone(),
        turns,
        state: session.state(design.script()),
    };

    store.save(session, 0).await?;

    Ok(result)
}

/// Handles the `RecordReply` command: appends the reply, then emits the next
/// batch of assistant turns.
///
/// # Errors
///
/// Returns `DomainError::SessionNotFound` for an unknown session,
/// `DomainError::InvalidState` if no reply is expected, and
/// `DomainError::Validation` for a blank reply, and
/// `DomainError::ConcurrencyConflict` if another reply for the same session
/// was saved first.
pub async fn handle_record_reply(
    command: &RecordReply,
    design: &ExperimentDesign,
    store: &dyn SessionStore,
) -> Result<SessionCommandResult, DomainError> {
    let mut session = load_session(command.session_id, store).await?;
    let expected_version = session.version();

    session.record_reply(&command.text, design.script())?;
    let turns = session.advance(design.script(), design.resolver())?;
    let state = session.state(design.script());

    if state == SessionState::Finished {
        info!(
            correlation_id = %command.correlation_id(),
            session_id = %session.id,
            "script finished; survey is open"
        );
    }

    let result = SessionCommandResult {
        session_id: session.id,
        condition: session.condition().clone(),
        turns,
        state,
    };

    store.save(session, expected_version).await?;

    Ok(result)
}

/// Handles the `SubmitSurvey` command: validates the response, claims the
/// submission, hands the session package to the sink, and marks the session
/// completed only if the sink accepted it.
///
/// The claim is saved before the sink is called, so of two concurrent
/// submissions for one session only one reaches the sink. A sink failure
/// releases the claim so the submission can be retried.
///
/// # Errors
///
/// Returns `DomainError::SessionNotFound`, `DomainError::Validation` for bad
/// ratings, `DomainError::InvalidState` if the script is unfinished, a
/// survey was already recorded, or another submission is in flight, and
/// `DomainError::SinkWrite` if the sink fails.
pub async fn handle_submit_survey(
    command: &SubmitSurvey,
    design: &ExperimentDesign,
    clock: &dyn Clock,
    store: &dyn SessionStore,
    sink: &dyn SessionSink,
) -> Result<Uuid, DomainError> {
    let response = SurveyResponse::new(
        command.knowledge_rating,
        command.empathy_rating,
        command.comments.clone(),
    )?;
    let mut session = load_session(command.session_id, store).await?;
    let loaded_version = session.version();

    let record = session.begin_survey(&response, design.script(), clock)?;
    store
        .save(session.clone(), loaded_version)
        .await
        .map_err(|e| match e {
            DomainError::ConcurrencyConflict { session_id, .. } => DomainError::InvalidState(
                format!("session {session_id} has a survey submission in progress"),
            ),
            other => other,
        })?;
    let claimed_version = loaded_version + 1;

    if let Err(e) = sink.record(&record).await {
        warn!(
            correlation_id = %command.correlation_id(),
            session_id = %session.id,
            error = %e,
            "session sink rejected survey submission"
        );
        session.abort_survey();
        store.save(session, claimed_version).await?;
        return Err(e);
    }

    session.complete(response)?;
    store.save(session, claimed_version).await?;

    info!(
        correlation_id = %command.correlation_id(),
        session_id = %command.session_id,
        "session recorded"
    );

    Ok(command.session_id)
}

//! Routes for the Session context.

use axum::extract::{Path, State};
use axum::{
    Json, Router,
    routing::{get, post},
};
use chatlab_core::sink::TranscriptEntry;
use chatlab_session::application::command_handlers::{self, SessionCommandResult};
use chatlab_session::application::query_handlers::{self, SessionView};
use chatlab_session::domain::aggregates::SessionState;
use chatlab_session::domain::commands;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /{session_id}/replies.
#[derive(Debug, Deserialize)]
pub struct ReplyRequest {
    /// The participant's reply, stored verbatim.
    pub text: String,
}

/// Request body for POST /{session_id}/survey.
#[derive(Debug, Deserialize)]
pub struct SurveyRequest {
    /// Knowledge rating, 1 to 5.
    pub knowledge_rating: u8,
    /// Empathy rating, 1 to 5.
    pub empathy_rating: u8,
    /// Optional free-text comments.
    #[serde(default)]
    pub comments: String,
}

/// Response body for commands that emit assistant turns.
#[derive(Debug, Serialize)]
pub struct TurnsResponse {
    /// The session identifier.
    pub session_id: Uuid,
    /// The assigned condition.
    pub condition: String,
    /// Assistant turns to render, in order.
    pub turns: Vec<TranscriptEntry>,
    /// Session state after the command.
    pub state: SessionState,
}

impl From<SessionCommandResult> for TurnsResponse {
    fn from(result: SessionCommandResult) -> Self {
        Self {
            session_id: result.session_id,
            condition: result.condition.as_str().to_owned(),
            turns: result.turns.iter().map(|t| t.to_entry()).collect(),
            state: result.state,
        }
    }
}

/// Response body after a survey is recorded.
#[derive(Debug, Serialize)]
pub struct SurveyResponseBody {
    /// The session identifier.
    pub session_id: Uuid,
    /// Always true on success.
    pub recorded: bool,
}

/// POST /
#[instrument(skip(state))]
async fn start_session(State(state): State<AppState>) -> Result<Json<TurnsResponse>, ApiError> {
    let command = commands::StartSession {
        correlation_id: Uuid::new_v4(),
    };

    info!(correlation_id = %command.correlation_id, "handling start_session command");

    let result = command_handlers::handle_start_session(
        &command,
        &state.design,
        state.clock.as_ref(),
        &state.rng,
        &*state.sessions,
    )
    .await?;

    Ok(Json(result.into()))
}

/// POST /{session_id}/replies
#[instrument(skip(state, request), fields(session_id = %session_id))]
async fn record_reply(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<ReplyRequest>,
) -> Result<Json<TurnsResponse>, ApiError> {
    let command = commands::RecordReply {
        correlation_id: Uuid::new_v4(),
        session_id,
        text: request.text,
    };

    info!(correlation_id = %command.correlation_id, "handling record_reply command");

    let result =
        command_handlers::handle_record_reply(&command, &state.design, &*state.sessions).await?;

    Ok(Json(result.into()))
}

/// POST /{session_id}/survey
#[instrument(skip(state, request), fields(session_id = %session_id))]
async fn submit_survey(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<SurveyRequest>,
) -> Result<Json<SurveyResponseBody>, ApiError> {
    let command = commands::SubmitSurvey {
        correlation_id: Uuid::new_v4(),
        session_id,
        knowledge_rating: request.knowledge_rating,
        empathy_rating: request.empathy_rating,
        comments: request.comments,
    };

    info!(correlation_id = %command.correlation_id, "handling submit_survey command");

    let session_id = command_handlers::handle_submit_survey(
        &command,
        &state.design,
        state.clock.as_ref(),
        &*state.sessions,
        &*state.sink,
    )
    .await?;

    Ok(Json(SurveyResponseBody {
        session_id,
        recorded: true,
    }))
}

/// GET /{session_id}
#[instrument(skip(state), fields(session_id = %session_id))]
async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let view = query_handlers::get_session_by_id(session_id, &state.design, &*state.sessions)
        .await?;
    Ok(Json(view))
}

/// Returns the router for the session context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(start_session))
        .route("/{session_id}", get(get_session))
        .route("/{session_id}/replies", post(record_reply))
        .route("/{session_id}/survey", post(submit_survey))
}

//! Commands for the Session context.

use chatlab_core::command::Command;
use uuid::Uuid;

/// Command to create a session and seed its opening turns.
#[derive(Debug, Clone)]
pub struct StartSession {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
}

impl Command for StartSession {
    fn command_type(&self) -> &'static str {
        "session.start"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to record a participant reply and advance the script.
#[derive(Debug, Clone)]
pub struct RecordReply {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session replying.
    pub session_id: Uuid,
    /// Reply text, stored verbatim.
    pub text: String,
}

impl Command for RecordReply {
    fn command_type(&self) -> &'static str {
        "session.record_reply"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to submit the post-chat survey.
#[derive(Debug, Clone)]
pub struct SubmitSurvey {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session being completed.
    pub session_id: Uuid,
    /// Raw knowledge rating.
    pub knowledge_rating: u8,
    /// Raw empathy rating.
    pub empathy_rating: u8,
    /// Free-text comments.
    pub comments: String,
}

impl Command for SubmitSurvey {
    fn command_type(&self) -> &'static str {
        "session.submit_survey"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

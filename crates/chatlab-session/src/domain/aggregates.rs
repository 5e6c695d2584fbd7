//! Aggregate root for the Session context.

use chatlab_core::clock::Clock;
use chatlab_core::error::DomainError;
use chatlab_core::rng::DeterministicRng;
use chatlab_core::sink::SessionRecord;
use chatlab_dialogue::domain::condition::{Condition, ConditionSet};
use chatlab_dialogue::domain::cursor::Cursor;
use chatlab_dialogue::domain::resolver::ConditionResolver;
use chatlab_dialogue::domain::script::Script;
use chatlab_dialogue::domain::turn::Turn;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::survey::SurveyResponse;

/// Lifecycle state of a session, derived from cursor position and transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Created but the opening turns have not been emitted yet.
    AwaitingAdvance,
    /// Stopped on a question, waiting for a reply.
    HaltedForInput,
    /// Script exhausted; the survey is open.
    Finished,
    /// Survey recorded by the sink.
    Completed,
}

/// One participant's run through the script.
#[derive(Debug, Clone)]
pub struct ChatSession {
    /// Session identifier.
    pub id: Uuid,
    condition: Condition,
    transcript: Vec<Turn>,
    cursor: Cursor,
    survey: Option<SurveyResponse>,
    survey_pending: bool,
    started_at: DateTime<Utc>,
    version: u64,
}

impl ChatSession {
    /// Creates a session with an explicit condition.
    #[must_use]
    pub fn new(id: Uuid, condition: Condition, started_at: DateTime<Utc>) -> Self {
        Self {
            id,
            condition,
            transcript: Vec::new(),
            cursor: Cursor::new(),
            survey: None,
            survey_pending: false,
            started_at,
            version: 0,
        }
    }

    /// Creates a session with a fresh identifier and a uniformly random
    /// condition from `conditions`.
    #[must_use]
    pub fn create(
        conditions: &ConditionSet,
        rng: &mut dyn DeterministicRng,
        clock: &dyn Clock,
    ) -> Self {
        Self::new(Uuid::new_v4(), conditions.pick(rng), clock.now())
    }

    /// The assigned condition. Fixed for the session's lifetime.
    #[must_use]
    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    /// Turns rendered or received so far, in order.
    #[must_use]
    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    /// Current cursor position.
    #[must_use]
    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    /// The recorded survey, once the sink accepted it.
    #[must_use]
    pub fn survey(&self) -> Option<&SurveyResponse> {
        self.survey.as_ref()
    }

    /// When the session was created.
    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Store version of this copy; 0 until first saved.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Records the version assigned by the session store on save.
    pub fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    /// Whether a survey has been handed to the sink and not yet settled.
    #[must_use]
    pub fn survey_pending(&self) -> bool {
        self.survey_pending
    }

    /// Whether the script is exhausted. Derived from the position only.
    #[must_use]
    pub fn is_finished(&self, script: &Script) -> bool {
        self.cursor.is_finished(script)
    }

    /// Whether the last transcript turn is a question still waiting for a reply.
    #[must_use]
    pub fn awaiting_reply(&self) -> bool {
        self.transcript.last().is_some_and(Turn::is_question)
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self, script: &Script) -> SessionState {
        if self.survey.is_some() {
            SessionState::Completed
        } else if self.is_finished(script) {
            SessionState::Finished
        } else if self.awaiting_reply() {
            SessionState::HaltedForInput
        } else {
            SessionState::AwaitingAdvance
        }
    }

    /// Emits assistant turns until the next question or the end of the
    /// script, appending them to the transcript.
    ///
    /// Returns an empty batch once the script is exhausted.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidState` if a question is still unanswered.
    pub fn advance(
        &mut self,
        script: &Script,
        resolver: &ConditionResolver,
    ) -> Result<Vec<Turn>, DomainError> {
        if self.is_finished(script) {
            return Ok(Vec::new());
        }
        if self.awaiting_reply() {
            return Err(DomainError::InvalidState(format!(
                "session {} is waiting for a reply at position {}",
                self.id,
                self.position()
            )));
        }

        let advance = self.cursor.advance(script, resolver, &self.condition);
        self.transcript.extend(advance.turns.iter().cloned());
        Ok(advance.turns)
    }

    /// Appends a participant reply, verbatim, to the transcript.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidState` if the session is finished or no
    /// question is pending, and `DomainError::Validation` for a blank reply.
    pub fn record_reply(&mut self, text: &str, script: &Script) -> Result<(), DomainError> {
        if self.is_finished(script) {
            return Err(DomainError::InvalidState(format!(
                "session {} is finished; no further replies are accepted",
                self.id
            )));
        }
        if !self.awaiting_reply() {
            return Err(DomainError::InvalidState(format!(
                "session {} has no question awaiting a reply",
                self.id
            )));
        }
        if text.trim().is_empty() {
            return Err(DomainError::Validation("reply must not be empty".into()));
        }

        self.transcript.push(Turn::user(text.to_owned()));
        Ok(())
    }

    /// Builds the sink package for a survey submission without changing
    /// session state.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidState` if the script is not finished, a
    /// survey was already recorded, or a submission is in flight.
    pub fn survey_record(
        &self,
        response: &SurveyResponse,
        script: &Script,
        clock: &dyn Clock,
    ) -> Result<SessionRecord, DomainError> {
        if !self.is_finished(script) {
            return Err(DomainError::InvalidState(format!(
                "session {} has not finished the script (position {} of {})",
                self.id,
                self.position(),
                script.total_steps()
            )));
        }
        if self.survey.is_some() {
            return Err(DomainError::InvalidState(format!(
                "session {} already recorded a survey",
                self.id
            )));
        }
        if self.survey_pending {
            return Err(DomainError::InvalidState(format!(
                "session {} has a survey submission in progress",
                self.id
            )));
        }

        Ok(SessionRecord {
            session_id: self.id.to_string(),
            condition: self.condition.as_str().to_owned(),
            chat_history: self.transcript.iter().map(Turn::to_entry).collect(),
            survey_knowledge: response.knowledge_rating.value(),
            survey_empathy: response.empathy_rating.value(),
            survey_comments: response.comments.clone(),
            script_version: script.version_hash().to_owned(),
            recorded_at: clock.now(),
        })
    }

    /// Builds the sink package and claims the submission, so a concurrent
    /// submit for the same session is rejected until this one settles.
    ///
    /// # Errors
    ///
    /// Same as [`survey_record`](Self::survey_record).
    pub fn begin_survey(
        &mut self,
        response: &SurveyResponse,
        script: &Script,
        clock: &dyn Clock,
    ) -> Result<SessionRecord, DomainError> {
        let record = self.survey_record(response, script, clock)?;
        self.survey_pending = true;
        Ok(record)
    }

    /// Releases a claimed submission after the sink rejected it.
    pub fn abort_survey(&mut self) {
        self.survey_pending = false;
    }

    /// Marks the survey as recorded after the sink accepted it.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidState` if a survey was already recorded.
    pub fn complete(&mut self, response: SurveyResponse) -> Result<(), DomainError> {
        if self.survey.is_some() {
            return Err(DomainError::InvalidState(format!(
                "session {} already recorded a survey",
                self.id
            )));
        }
        self.survey = Some(response);
        self.survey_pending = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatlab_dialogue::domain::script::ScriptFormat;
    use chatlab_dialogue::domain::turn::{Role, TurnKind};
    use chatlab_test_support::{FixedClock, SequenceRng};
    use chrono::TimeZone;

    fn fixed_clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap())
    }

    fn script(json: &str) -> Script {
        Script::parse(json, ScriptFormat::Json).unwrap()
    }

    fn two_question_script() -> Script {
        script(
            r#"[
                {"type": "message", "text": "Hi"},
                {"type": "question", "text": "Name?"},
                {"type": "section_header", "text": "Part 2"},
                {"type": "question", "text": {"High_Empathy": "Feel?", "High_Expertise": "Skin?"}},
                {"type": "message", "text": "Bye"}
            ]"#,
        )
    }

    fn resolver() -> ConditionResolver {
        ConditionResolver::new(Condition::new("High_Empathy"))
    }

    fn session(condition: &str) -> ChatSession {
        ChatSession::new(Uuid::new_v4(), Condition::new(condition), fixed_clock().now())
    }

    fn survey() -> SurveyResponse {
        SurveyResponse::new(4, 5, "nice".to_owned()).unwrap()
    }

    #[test]
    fn test_create_assigns_condition_from_rng() {
        // Arrange
        let conditions = ConditionSet::new(
            vec!["High_Empathy".to_owned(), "High_Expertise".to_owned()],
            None,
        )
        .unwrap();
        let mut rng = SequenceRng::new(vec![1]);
        let clock = fixed_clock();

        // Act
        let session = ChatSession::create(&conditions, &mut rng, &clock);

        // Assert
        assert_eq!(session.condition().as_str(), "High_Expertise");
        assert_eq!(session.position(), 0);
        assert!(session.transcript().is_empty());
        assert_eq!(session.started_at(), clock.now());
    }

    #[test]
    fn test_full_conversation_reaches_finished() {
        // Arrange
        let script = two_question_script();
        let mut session = session("High_Expertise");

        // Act
        let opening = session.advance(&script, &resolver()).unwrap();
        assert_eq!(session.state(&script), SessionState::HaltedForInput);
        session.record_reply("Ada", &script).unwrap();
        let second = session.advance(&script, &resolver()).unwrap();
        session.record_reply("Dry", &script).unwrap();
        let last = session.advance(&script, &resolver()).unwrap();

        // Assert
        assert_eq!(opening.len(), 2);
        assert_eq!(second.len(), 2);
        assert_eq!(second[1].content, "Skin?");
        assert_eq!(last.len(), 1);
        assert_eq!(session.state(&script), SessionState::Finished);

        let kinds: Vec<TurnKind> = session.transcript().iter().map(|t| t.kind).collect();
        assert_eq!(kinds.len(), 7);
        assert_eq!(kinds[2], TurnKind::User);
        assert_eq!(session.transcript()[2].role, Role::User);
        assert_eq!(session.transcript()[2].content, "Ada");
    }

    #[test]
    fn test_advance_while_question_pending_is_rejected() {
        let script = two_question_script();
        let mut session = session("High_Empathy");
        session.advance(&script, &resolver()).unwrap();

        let result = session.advance(&script, &resolver());

        assert!(matches!(result, Err(DomainError::InvalidState(_))));
        assert_eq!(session.position(), 2);
    }

    #[test]
    fn test_reply_before_opening_is_rejected() {
        let script = two_question_script();
        let mut session = session("High_Empathy");

        let result = session.record_reply("hello", &script);

        assert!(matches!(result, Err(DomainError::InvalidState(_))));
        assert!(session.transcript().is_empty());
    }

    #[test]
    fn test_reply_after_finish_is_rejected() {
        let script = script(r#"[{"type": "message", "text": "Only"}]"#);
        let mut session = session("High_Empathy");
        session.advance(&script, &resolver()).unwrap();

        let result = session.record_reply("late", &script);

        match result {
            Err(DomainError::InvalidState(msg)) => assert!(msg.contains("finished")),
            other => panic!("expected InvalidState, got {other:?}"),
        }
    }

    #[test]
    fn test_blank_reply_is_rejected() {
        let script = two_question_script();
        let mut session = session("High_Empathy");
        session.advance(&script, &resolver()).unwrap();

        let result = session.record_reply("   ", &script);

        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert_eq!(session.transcript().len(), 2);
    }

    #[test]
    fn test_reply_is_stored_verbatim() {
        let script = two_question_script();
        let mut session = session("High_Empathy");
        session.advance(&script, &resolver()).unwrap();

        session.record_reply("  Ada Lovelace \n", &script).unwrap();

        assert_eq!(session.transcript()[2].content, "  Ada Lovelace \n");
    }

    #[test]
    fn test_empty_script_finishes_immediately() {
        let script = script("[]");
        let mut session = session("High_Empathy");

        let turns = session.advance(&script, &resolver()).unwrap();

        assert!(turns.is_empty());
        assert_eq!(session.state(&script), SessionState::Finished);
        assert!(session.survey_record(&survey(), &script, &fixed_clock()).is_ok());
    }

    #[test]
    fn test_survey_before_finish_is_rejected() {
        let script = two_question_script();
        let mut session = session("High_Empathy");
        session.advance(&script, &resolver()).unwrap();

        let result = session.survey_record(&survey(), &script, &fixed_clock());

        match result {
            Err(DomainError::InvalidState(msg)) => assert!(msg.contains("position 2 of 5")),
            other => panic!("expected InvalidState, got {other:?}"),
        }
    }

    #[test]
    fn test_survey_record_carries_transcript_and_ratings() {
        let script = script(
            r#"[{"type": "question", "text": "Name?", "image": "a.png"}, {"type": "message", "text": "Thanks"}]"#,
        );
        let mut session = session("High_Expertise");
        session.advance(&script, &resolver()).unwrap();
        session.record_reply("Ada", &script).unwrap();
        session.advance(&script, &resolver()).unwrap();
        let clock = fixed_clock();

        let record = session.survey_record(&survey(), &script, &clock).unwrap();

        assert_eq!(record.session_id, session.id.to_string());
        assert_eq!(record.condition, "High_Expertise");
        assert_eq!(record.chat_history.len(), 3);
        assert_eq!(record.chat_history[0].image.as_deref(), Some("a.png"));
        assert_eq!(record.chat_history[1].kind, "user");
        assert_eq!(record.survey_knowledge, 4);
        assert_eq!(record.survey_empathy, 5);
        assert_eq!(record.survey_comments, "nice");
        assert_eq!(record.script_version, script.version_hash());
        assert_eq!(record.recorded_at, clock.now());
        assert!(session.survey().is_none());
    }

    #[test]
    fn test_duplicate_survey_is_rejected() {
        let script = script("[]");
        let mut session = session("High_Empathy");
        session.complete(survey()).unwrap();

        let built = session.survey_record(&survey(), &script, &fixed_clock());
        let completed = session.complete(survey());

        assert!(matches!(built, Err(DomainError::InvalidState(_))));
        assert!(matches!(completed, Err(DomainError::InvalidState(_))));
        assert_eq!(session.state(&script), SessionState::Completed);
    }

    #[test]
    fn test_pending_submission_blocks_second_claim() {
        // Arrange
        let script = script("[]");
        let mut session = session("High_Empathy");
        let clock = fixed_clock();
        session.begin_survey(&survey(), &script, &clock).unwrap();

        // Act
        let second = session.begin_survey(&survey(), &script, &clock);

        // Assert
        assert!(matches!(second, Err(DomainError::InvalidState(_))));
        assert!(session.survey_pending());
        assert_eq!(session.state(&script), SessionState::Finished);
    }

    #[test]
    fn test_aborted_submission_can_be_claimed_again() {
        let script = script("[]");
        let mut session = session("High_Empathy");
        let clock = fixed_clock();
        session.begin_survey(&survey(), &script, &clock).unwrap();

        session.abort_survey();

        assert!(!session.survey_pending());
        assert!(session.begin_survey(&survey(), &script, &clock).is_ok());
        session.complete(survey()).unwrap();
        assert!(!session.survey_pending());
        assert_eq!(session.state(&script), SessionState::Completed);
    }

    #[test]
    fn test_position_never_decreases() {
        let script = two_question_script();
        let mut session = session("High_Empathy");
        let mut last = session.position();

        let _ = session.advance(&script, &resolver());
        for reply in ["a", "b", "c"] {
            assert!(session.position() >= last);
            last = session.position();
            let _ = session.record_reply(reply, &script);
            let _ = session.advance(&script, &resolver());
            let _ = session.advance(&script, &resolver());
        }

        assert!(session.position() >= last);
        assert_eq!(session.position(), script.total_steps());
    }
}

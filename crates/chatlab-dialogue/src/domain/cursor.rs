//! Conversation Cursor: the auto-advance-or-halt state machine.
//!
//! The only persistent state is `position`. Statements and section headers
//! are emitted back to back; a question is emitted and then the machine halts
//! until the caller supplies a reply.

use tracing::{debug, warn};

use super::condition::Condition;
use super::resolver::{ConditionResolver, TextSource};
use super::script::Script;
use super::turn::Turn;

/// Observable state of the machine after an advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// Stopped on a question; waiting for a reply.
    HaltedForInput,
    /// Script exhausted.
    Finished,
}

/// Result of one [`advance_until_halt`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advance {
    /// Assistant turns to render, in order.
    pub turns: Vec<Turn>,
    /// Position after the last emitted turn.
    pub position: usize,
    /// Whether the call stopped on a question.
    pub halted_on_question: bool,
}

impl Advance {
    /// State the machine is left in.
    #[must_use]
    pub fn state(&self) -> CursorState {
        if self.halted_on_question {
            CursorState::HaltedForInput
        } else {
            CursorState::Finished
        }
    }
}

/// Whether the script is exhausted at `position`.
#[must_use]
pub fn is_finished(script: &Script, position: usize) -> bool {
    position >= script.total_steps()
}

/// Emits turns from `position` until a question is emitted or the script
/// runs out.
#[must_use]
pub fn advance_until_halt(
    script: &Script,
    resolver: &ConditionResolver,
    condition: &Condition,
    mut position: usize,
) -> Advance {
    let mut turns = Vec::new();

    while let Some(step) = script.step_at(position) {
        let (content, source) = resolver.resolve_traced(step, condition);
        match source {
            TextSource::Default => debug!(
                position,
                condition = %condition,
                default = %resolver.default_condition(),
                "turn text fell back to default condition"
            ),
            TextSource::Missing => warn!(
                position,
                condition = %condition,
                "turn has no text for condition or default; rendering empty"
            ),
            TextSource::Literal | TextSource::Condition => {}
        }

        turns.push(Turn::assistant(step.turn_type, content, step.media.clone()));
        position += 1;

        if step.turn_type.halts() {
            return Advance {
                turns,
                position,
                halted_on_question: true,
            };
        }
    }

    Advance {
        turns,
        position,
        halted_on_question: false,
    }
}

/// Per-session cursor owning a monotonically non-decreasing position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    position: usize,
}

impl Cursor {
    /// A cursor at the start of the script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current position.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Whether the script is exhausted.
    #[must_use]
    pub fn is_finished(&self, script: &Script) -> bool {
        is_finished(script, self.position)
    }

    /// Runs [`advance_until_halt`] from the current position and moves the
    /// cursor forward.
    pub fn advance(
        &mut self,
        script: &Script,
        resolver: &ConditionResolver,
        condition: &Condition,
    ) -> Advance {
        let advance = advance_until_halt(script, resolver, condition, self.position);
        self.position = self.position.max(advance.position);
        advance
    }
}

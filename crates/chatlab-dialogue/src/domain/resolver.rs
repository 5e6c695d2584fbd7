//! Condition Resolver: picks the text variant for the assigned arm.

use super::condition::Condition;
use super::turn::{TextVariants, TurnDefinition};

/// Where a resolved string came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSource {
    /// The turn has a single condition-independent string.
    Literal,
    /// The entry for the assigned condition.
    Condition,
    /// The assigned condition was absent; the default arm's entry was used.
    Default,
    /// Neither entry existed; resolved to the empty string.
    Missing,
}

/// Resolves turn text with the fallback chain
/// assigned condition, then default condition, then empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionResolver {
    default: Condition,
}

impl ConditionResolver {
    /// Creates a resolver that falls back to `default`.
    #[must_use]
    pub fn new(default: Condition) -> Self {
        Self { default }
    }

    /// The fallback arm.
    #[must_use]
    pub fn default_condition(&self) -> &Condition {
        &self.default
    }

    /// Returns the text to display for `turn` under `condition`.
    #[must_use]
    pub fn resolve(&self, turn: &TurnDefinition, condition: &Condition) -> String {
        self.resolve_traced(turn, condition).0
    }

    /// Like [`resolve`](Self::resolve), also reporting which branch of the
    /// fallback chain produced the text.
    #[must_use]
    pub fn resolve_traced(
        &self,
        turn: &TurnDefinition,
        condition: &Condition,
    ) -> (String, TextSource) {
        match &turn.text {
            TextVariants::Literal(text) => (text.clone(), TextSource::Literal),
            TextVariants::PerCondition(map) => {
                if let Some(text) = map.get(condition.as_str()) {
                    (text.clone(), TextSource::Condition)
                } else if let Some(text) = map.get(self.default.as_str()) {
                    (text.clone(), TextSource::Default)
                } else {
                    (String::new(), TextSource::Missing)
                }
            }
        }
    }
}

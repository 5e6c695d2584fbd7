//! Experimental conditions (arms) and uniform assignment.

use std::fmt;

use chatlab_core::error::DomainError;
use chatlab_core::rng::DeterministicRng;
use serde::{Deserialize, Serialize};

/// One experiment arm label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Condition(String);

impl Condition {
    /// Wraps a label.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Returns the label.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The closed, ordered set of arms plus the designated fallback arm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionSet {
    labels: Vec<Condition>,
    default: Condition,
}

impl ConditionSet {
    /// Builds a condition set.
    ///
    /// Labels are trimmed and de-duplicated in declaration order. When
    /// `default` is `None` the first declared label is the default.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if no non-empty label is given or
    /// the default is not one of the labels.
    pub fn new(labels: Vec<String>, default: Option<String>) -> Result<Self, DomainError> {
        let mut unique: Vec<Condition> = Vec::with_capacity(labels.len());
        for label in labels {
            let label = label.trim();
            if label.is_empty() || unique.iter().any(|c| c.as_str() == label) {
                continue;
            }
            unique.push(Condition::new(label));
        }

        let Some(first) = unique.first().cloned() else {
            return Err(DomainError::Validation(
                "at least one condition label is required".into(),
            ));
        };

        let default = match default.as_deref().map(str::trim) {
            None | Some("") => first,
            Some(label) => unique
                .iter()
                .find(|c| c.as_str() == label)
                .cloned()
                .ok_or_else(|| {
                    DomainError::Validation(format!(
                        "default condition {label} is not one of the configured conditions"
                    ))
                })?,
        };

        Ok(Self {
            labels: unique,
            default,
        })
    }

    /// The arms in declaration order.
    #[must_use]
    pub fn labels(&self) -> &[Condition] {
        &self.labels
    }

    /// The arm whose text is used when a turn lacks the assigned arm.
    #[must_use]
    pub fn default_condition(&self) -> &Condition {
        &self.default
    }

    /// Whether `label` is one of the arms.
    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|c| c.as_str() == label)
    }

    /// Picks one arm uniformly at random.
    pub fn pick(&self, rng: &mut dyn DeterministicRng) -> Condition {
        let index = rng.next_index(self.labels.len());
        // Out-of-range indices clamp to the last arm.
        self.labels[index.min(self.labels.len() - 1)].clone()
    }
}

//! Feedback survey values.

use chatlab_core::error::DomainError;
use serde::{Deserialize, Serialize};

/// A 1-to-5 Likert rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    /// Lowest accepted rating.
    pub const MIN: u8 = 1;
    /// Highest accepted rating.
    pub const MAX: u8 = 5;

    /// Returns the numeric value.
    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(DomainError::Validation(format!(
                "rating must be between {} and {}, got {value}",
                Self::MIN,
                Self::MAX
            )))
        }
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

/// The participant's answers to the post-chat survey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyResponse {
    /// How knowledgeable the assistant seemed.
    pub knowledge_rating: Rating,
    /// How empathetic the assistant seemed.
    pub empathy_rating: Rating,
    /// Free-text comments, stored verbatim.
    pub comments: String,
}

impl SurveyResponse {
    /// Validates raw ratings and builds a response.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if either rating is outside 1 to 5.
    pub fn new(
        knowledge_rating: u8,
        empathy_rating: u8,
        comments: String,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            knowledge_rating: Rating::try_from(knowledge_rating)?,
            empathy_rating: Rating::try_from(empathy_rating)?,
            comments,
        })
    }
}

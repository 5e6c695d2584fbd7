//! Turn definitions (authored) and rendered turns (emitted).

use std::collections::BTreeMap;
use std::fmt;

use chatlab_core::sink::TranscriptEntry;
use serde::{Deserialize, Deserializer, Serialize};

/// Kind of an authored turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnType {
    /// A plain statement; never waits for input.
    #[serde(rename = "message")]
    Statement,
    /// A visual divider with a caption; never waits for input.
    SectionHeader,
    /// A prompt the participant must answer before the script continues.
    Question,
}

impl TurnType {
    /// Returns the wire name used in script sources and transcripts.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Statement => "message",
            Self::SectionHeader => "section_header",
            Self::Question => "question",
        }
    }

    /// Whether the cursor halts after emitting a turn of this kind.
    #[must_use]
    pub fn halts(self) -> bool {
        matches!(self, Self::Question)
    }
}

/// Identifier of an authored turn. Informational only; any scalar or
/// structured value is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TurnId {
    /// Integer identifier.
    Number(i64),
    /// Textual identifier.
    Text(String),
    /// Anything else (`2.1`, `true`, ...), kept as written.
    Other(serde_json::Value),
}

impl fmt::Display for TurnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::Other(value) => write!(f, "{value}"),
        }
    }
}

/// Text of a turn: either shared by every arm or keyed by condition label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextVariants {
    /// Condition-independent text.
    Literal(String),
    /// Text per condition label.
    PerCondition(BTreeMap<String, String>),
}

impl Default for TextVariants {
    fn default() -> Self {
        Self::Literal(String::new())
    }
}

/// Reference to an image shown with a turn.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaRef(pub String);

impl MediaRef {
    /// Returns the path or URI.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn null_as_default<'de, D>(deserializer: D) -> Result<TextVariants, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<TextVariants>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// One authored step of a script. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnDefinition {
    /// Author-supplied identifier.
    #[serde(default)]
    pub id: Option<TurnId>,
    /// Turn kind.
    #[serde(rename = "type")]
    pub turn_type: TurnType,
    /// Literal or per-condition text. Missing or null means empty.
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: TextVariants,
    /// Optional image.
    #[serde(default, rename = "image")]
    pub media: Option<MediaRef>,
}

/// Who produced a rendered turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Scripted assistant output.
    Assistant,
    /// Participant input.
    User,
}

impl Role {
    /// Returns the transcript name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Assistant => "assistant",
            Self::User => "user",
        }
    }
}

/// Type tag carried by a rendered turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnKind {
    /// An assistant turn carrying its definition's type.
    Scripted(TurnType),
    /// A participant reply.
    User,
}

impl TurnKind {
    /// Returns the transcript name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scripted(turn_type) => turn_type.as_str(),
            Self::User => "user",
        }
    }
}

/// A turn as rendered and appended to a transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Producer of the turn.
    pub role: Role,
    /// Type tag.
    pub kind: TurnKind,
    /// Resolved text.
    pub content: String,
    /// Optional image.
    pub media: Option<MediaRef>,
}

impl Turn {
    /// Builds an assistant turn for an authored step.
    #[must_use]
    pub fn assistant(turn_type: TurnType, content: String, media: Option<MediaRef>) -> Self {
        Self {
            role: Role::Assistant,
            kind: TurnKind::Scripted(turn_type),
            content,
            media,
        }
    }

    /// Builds a participant reply, stored verbatim.
    #[must_use]
    pub fn user(content: String) -> Self {
        Self {
            role: Role::User,
            kind: TurnKind::User,
            content,
            media: None,
        }
    }

    /// Whether this is an assistant question.
    #[must_use]
    pub fn is_question(&self) -> bool {
        self.role == Role::Assistant && self.kind == TurnKind::Scripted(TurnType::Question)
    }

    /// Converts to the persisted transcript shape.
    #[must_use]
    pub fn to_entry(&self) -> TranscriptEntry {
        TranscriptEntry {
            role: self.role.as_str().to_owned(),
            content: self.content.clone(),
            image: self.media.as_ref().map(|m| m.as_str().to_owned()),
            kind: self.kind.as_str().to_owned(),
        }
    }
}

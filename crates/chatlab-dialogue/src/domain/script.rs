//! Script Store: loading, validation and indexed lookup of authored turns.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{error, info, warn};

use super::condition::{Condition, ConditionSet};
use super::turn::{TextVariants, TurnDefinition};

/// Failure to obtain a script from its source.
#[derive(Debug, Error)]
pub enum ScriptLoadError {
    /// The source could not be read.
    #[error("cannot read script {path}: {source}")]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The source was read but is not a valid list of turn definitions.
    #[error("malformed script: {0}")]
    Malformed(String),

    /// The file extension does not map to a known format.
    #[error("unsupported script format: {0}")]
    UnsupportedFormat(String),
}

/// Serialization format of a script source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptFormat {
    /// JSON array of turn objects.
    Json,
    /// YAML sequence of turn mappings.
    Yaml,
}

impl ScriptFormat {
    /// Picks a format from a file extension.
    ///
    /// # Errors
    ///
    /// Returns `ScriptLoadError::UnsupportedFormat` for anything other than
    /// `.json`, `.yaml` or `.yml`.
    pub fn from_path(path: &Path) -> Result<Self, ScriptLoadError> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("json") => Ok(Self::Json),
            Some("yaml" | "yml") => Ok(Self::Yaml),
            _ => Err(ScriptLoadError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// An ordered, immutable sequence of turn definitions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    turns: Vec<TurnDefinition>,
    version_hash: String,
}

impl Script {
    /// Builds a script from already-parsed turns.
    #[must_use]
    pub fn new(turns: Vec<TurnDefinition>, version_hash: String) -> Self {
        Self {
            turns,
            version_hash,
        }
    }

    /// Parses a script from source text.
    ///
    /// # Errors
    ///
    /// Returns `ScriptLoadError::Malformed` if the text is not a list of turn
    /// definitions in the given format.
    pub fn parse(source: &str, format: ScriptFormat) -> Result<Self, ScriptLoadError> {
        let turns: Vec<TurnDefinition> = match format {
            ScriptFormat::Json => serde_json::from_str(source)
                .map_err(|e| ScriptLoadError::Malformed(e.to_string()))?,
            ScriptFormat::Yaml => serde_yaml::from_str(source)
                .map_err(|e| ScriptLoadError::Malformed(e.to_string()))?,
        };
        Ok(Self::new(turns, hash_source(source.as_bytes())))
    }

    /// Reads and parses a script file, choosing the format by extension.
    ///
    /// # Errors
    ///
    /// Returns `ScriptLoadError` if the file is unreadable, has an unknown
    /// extension, or is malformed.
    pub fn from_file(path: &Path) -> Result<Self, ScriptLoadError> {
        let format = ScriptFormat::from_path(path)?;
        let source = std::fs::read_to_string(path).map_err(|source| ScriptLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&source, format)
    }

    /// Returns the number of turns.
    #[must_use]
    pub fn total_steps(&self) -> usize {
        self.turns.len()
    }

    /// Returns the turn at `index`, or `None` past the end.
    ///
    /// Out of range is the terminal signal for the cursor, not an error.
    #[must_use]
    pub fn step_at(&self, index: usize) -> Option<&TurnDefinition> {
        self.turns.get(index)
    }

    /// Hex SHA-256 of the source the script was parsed from.
    #[must_use]
    pub fn version_hash(&self) -> &str {
        &self.version_hash
    }

    /// Number of question turns; bounds the advance calls needed to finish.
    #[must_use]
    pub fn question_count(&self) -> usize {
        self.turns
            .iter()
            .filter(|t| t.turn_type.halts())
            .count()
    }

    /// Lists per-condition turns lacking text for a configured arm.
    #[must_use]
    pub fn missing_variants(&self, conditions: &ConditionSet) -> Vec<MissingVariant> {
        let mut missing = Vec::new();
        for (index, turn) in self.turns.iter().enumerate() {
            if let TextVariants::PerCondition(map) = &turn.text {
                for condition in conditions.labels() {
                    if !map.contains_key(condition.as_str()) {
                        missing.push(MissingVariant {
                            index,
                            condition: condition.clone(),
                        });
                    }
                }
            }
        }
        missing
    }
}

/// A per-condition turn with no entry for one of the configured arms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingVariant {
    /// Position of the turn in the script.
    pub index: usize,
    /// Arm without an entry.
    pub condition: Condition,
}

fn hash_source(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Holds the script for the lifetime of the process.
///
/// Loading never fails: an unreadable or malformed source is logged and
/// replaced with an empty script, so every session finishes immediately.
/// The captured error stays available through [`ScriptStore::load_error`].
#[derive(Debug)]
pub struct ScriptStore {
    script: Script,
    load_error: Option<ScriptLoadError>,
}

impl ScriptStore {
    /// Loads the script at `path`, falling back to an empty script.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        match Script::from_file(path) {
            Ok(script) => {
                info!(
                    path = %path.display(),
                    total_steps = script.total_steps(),
                    version = script.version_hash(),
                    "script loaded"
                );
                Self::from_script(script)
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "script load failed; using empty script");
                Self {
                    script: Script::new(Vec::new(), hash_source(&[])),
                    load_error: Some(e),
                }
            }
        }
    }

    /// Wraps an already-built script.
    #[must_use]
    pub fn from_script(script: Script) -> Self {
        Self {
            script,
            load_error: None,
        }
    }

    /// The loaded (or fallback) script.
    #[must_use]
    pub fn script(&self) -> &Script {
        &self.script
    }

    /// The error that forced the empty-script fallback, if any.
    #[must_use]
    pub fn load_error(&self) -> Option<&ScriptLoadError> {
        self.load_error.as_ref()
    }

    /// Returns `len(script)`.
    #[must_use]
    pub fn total_steps(&self) -> usize {
        self.script.total_steps()
    }

    /// Returns the turn at `index`, or `None` past the end.
    #[must_use]
    pub fn step_at(&self, index: usize) -> Option<&TurnDefinition> {
        self.script.step_at(index)
    }

    /// Logs a warning for every missing per-condition variant.
    pub fn warn_missing_variants(&self, conditions: &ConditionSet) {
        for missing in self.script.missing_variants(conditions) {
            warn!(
                index = missing.index,
                condition = %missing.condition,
                "turn has no text for condition; resolver will fall back"
            );
        }
    }
}

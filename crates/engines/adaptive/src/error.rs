//! Error and warning types for the engine.
//!
//! Only initialization can fail from the caller's point of view. Damaged
//! book or learning files are recovered locally and surface as
//! [`EngineWarning`]s instead.

use std::path::PathBuf;

/// Errors that can occur while preparing or persisting engine resources
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Engine resources could not be prepared, after every retry
    #[error("Engine initialization failed after {attempts} attempt(s): {reason}")]
    Initialization { attempts: u32, reason: String },

    /// Configuration values that cannot work together
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Opening book file is truncated or unsorted
    #[error("Malformed opening book {}: {reason}", .path.display())]
    MalformedBook { path: PathBuf, reason: String },

    /// Learning store could not be parsed
    #[error("Malformed learning store {}: {reason}", .path.display())]
    MalformedLearningStore { path: PathBuf, reason: String },

    /// Filesystem access failed
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config parse error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EngineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EngineError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// A recovered fault the caller may want to show or log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineWarning {
    /// The book was unusable; lookups return nothing.
    BookDisabled { path: PathBuf, reason: String },
    /// The learning store was unusable; learning restarted from empty.
    LearningReset { path: PathBuf, reason: String },
    /// Learned data could not be written back.
    PersistenceFailed { path: PathBuf, reason: String },
}

impl std::fmt::Display for EngineWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineWarning::BookDisabled { path, reason } => {
                write!(f, "opening book {} disabled: {reason}", path.display())
            }
            EngineWarning::LearningReset { path, reason } => {
                write!(f, "learning store {} reset: {reason}", path.display())
            }
            EngineWarning::PersistenceFailed { path, reason } => {
                write!(f, "could not save learning store {}: {reason}", path.display())
            }
        }
    }
}

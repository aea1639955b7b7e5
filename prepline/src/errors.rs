//! Error types for the prepline engine.
//!
//! Every engine error is raised eagerly at the boundary of a public
//! operation, before any side effect is committed. Once a stage is
//! running, its failures pass through [`PreplineError::Stage`] untouched.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for prepline operations.
#[derive(Debug, Error)]
pub enum PreplineError {
    /// Construction arguments were missing or contradictory.
    #[error("{0}")]
    Arguments(#[from] ArgumentsError),

    /// A parameter merge collided with a key already in the bag.
    #[error("{0}")]
    DuplicateParam(#[from] DuplicateParamError),

    /// A name used for removal or anchoring matched no registered stage.
    #[error("{0}")]
    StageNotFound(#[from] StageNotFoundError),

    /// A stage name was registered twice.
    #[error("{0}")]
    DuplicateStage(#[from] DuplicateStageError),

    /// Reading or writing a configuration document failed.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// A stage action failed. The failure aborts the run and is
    /// propagated as raised.
    #[error(transparent)]
    Stage(#[from] anyhow::Error),
}

/// Error raised when call arguments are structurally invalid or
/// contradictory.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ArgumentsError {
    /// The error message.
    pub message: String,
}

impl ArgumentsError {
    /// Creates a new arguments error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Error raised when a parameter merge would overwrite an existing key.
#[derive(Debug, Clone, Error)]
#[error("Parameter '{key}' already exists in the pipeline parameters")]
pub struct DuplicateParamError {
    /// The colliding key.
    pub key: String,
}

impl DuplicateParamError {
    /// Creates a new duplicate parameter error.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

/// Error raised when a stage name is not part of the pipeline.
#[derive(Debug, Clone, Error)]
#[error("Stage '{name}' is not a part of the pipeline")]
pub struct StageNotFoundError {
    /// The unresolved stage name.
    pub name: String,
}

impl StageNotFoundError {
    /// Creates a new stage-not-found error.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Error raised when a stage name is already part of the pipeline.
#[derive(Debug, Clone, Error)]
#[error("Stage '{name}' is already a part of the pipeline")]
pub struct DuplicateStageError {
    /// The colliding stage name.
    pub name: String,
}

impl DuplicateStageError {
    /// Creates a new duplicate stage error.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Errors from reading or writing a configuration document.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The path does not reference an existing regular file.
    #[error("Config file not found at {}", .path.display())]
    NotFound {
        /// The path that was checked.
        path: PathBuf,
    },

    /// The document could not be parsed as a JSON object.
    #[error("Config file at {} is not a valid JSON document: {source}", .path.display())]
    Format {
        /// The path of the offending document.
        path: PathBuf,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// The file could not be read or written.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

//! Error handling for shiftwork
//!
//! This module defines the crate error type and a Result alias for use
//! throughout the library. Construction errors surface while a pipeline is
//! assembled; wiring and readiness errors surface at the call that caused them.

use crate::pipeline::id::WorkerId;
use crate::pipeline::task::TaskShape;
use thiserror::Error;

/// Main error type for shiftwork operations
#[derive(Error, Debug)]
pub enum ShiftworkError {
    /// A stage archetype was given a task of the wrong shape
    #[error("{stage} stage expects a {expected} task, got a {found} task")]
    InvalidTaskShape {
        stage: &'static str,
        expected: TaskShape,
        found: TaskShape,
    },

    /// A stage archetype was built without a required callable
    #[error("{0} stage requires a task")]
    MissingTask(&'static str),

    /// Mutually exclusive construction arguments were both supplied
    #[error("Conflicting arguments: {0}")]
    ConflictingArguments(String),

    /// An archetype option is out of range
    #[error("Invalid option for {stage} stage: {message}")]
    InvalidOption {
        stage: &'static str,
        message: String,
    },

    /// A supply was attached to a producer-only worker
    #[error("{0} is a source, and cannot accept a supply")]
    SourceImmutable(WorkerId),

    /// A worker that needs upstream input was pulled without a supply
    #[error("{0}'s task expects to receive a value from a supplier, but has no supply")]
    NotReady(WorkerId),

    /// A gang or roster operation needed at least one worker
    #[error("Roster has no workers")]
    EmptyRoster,

    /// A worker was pulled while its own pull was still in flight
    #[error("{0} was pulled while already working (cyclic supply)")]
    Reentrant(WorkerId),

    /// Errors raised from inside a task body
    #[error("Task error: {0}")]
    Task(String),

    /// Errors related to pipeline configuration loading/validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ShiftworkError>,
    },
}

impl ShiftworkError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ShiftworkError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Create a task error from any displayable failure
    pub fn task(message: impl std::fmt::Display) -> Self {
        ShiftworkError::Task(message.to_string())
    }

    /// Whether this error was raised while constructing a stage.
    pub fn is_construction(&self) -> bool {
        match self {
            ShiftworkError::InvalidTaskShape { .. }
            | ShiftworkError::MissingTask(_)
            | ShiftworkError::ConflictingArguments(_)
            | ShiftworkError::InvalidOption { .. } => true,
            ShiftworkError::WithContext { source, .. } => source.is_construction(),
            _ => false,
        }
    }
}

/// Result type alias for shiftwork operations
pub type Result<T> = std::result::Result<T, ShiftworkError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

//! Application error types.
//!
//! All errors use `thiserror` for automatic Error trait derivation and provide
//! clear error messages with context.

use thiserror::Error;

/// Application result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for the directory watcher.
///
/// Event translation, enqueue, close, consume and stop never fail; only
/// registration with the external subsystem and configuration loading do.
#[derive(Error, Debug)]
pub enum Error {
    /// The file coordinator refused to register a path.
    #[error("registration error: {0}")]
    Registration(String),

    /// Operation requires an active watcher.
    #[error("state transition error: {0}")]
    StateTransition(String),

    /// Configuration that cannot be honoured.
    #[error("validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

// Convenience constructors
impl Error {
    pub fn registration(msg: impl Into<String>) -> Self {
        Self::Registration(msg.into())
    }

    pub fn state_transition(msg: impl Into<String>) -> Self {
        Self::StateTransition(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

/// Error a presenter hands back through a coordination completion.
///
/// The adapter always answers `Ok(())`; a policy that needs to veto a save or
/// a deletion reports it with this type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoordinationError {
    /// The presenter refuses the requested operation.
    #[error("coordination refused: {0}")]
    Refused(String),
}

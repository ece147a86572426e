//! Error types for the MockStack core.

use std::fmt;

/// Core error type for MockStack infrastructure.
#[derive(Debug, thiserror::Error)]
pub enum MockStackError {
    /// Invalid AWS account ID format.
    #[error("invalid AWS account ID: {0} (must be 12-digit numeric string)")]
    InvalidAccountId(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience result type for MockStack operations.
pub type MockStackResult<T> = Result<T, MockStackError>;

/// Closed classification of every failure a service can report.
///
/// The gateway picks the HTTP status of an error response from its kind and
/// the emulated service's own conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad input from the caller.
    Client,
    /// The addressed resource does not exist.
    NotFound,
    /// A create collided with an existing resource.
    Conflict,
    /// An optimistic-concurrency token did not match the stored version.
    VersionConflict,
    /// Unexpected failure inside the emulator.
    Internal,
}

impl ErrorKind {
    /// Short, stable name of the kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Client => "Client",
            Self::NotFound => "NotFound",
            Self::Conflict => "Conflict",
            Self::VersionConflict => "VersionConflict",
            Self::Internal => "Internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

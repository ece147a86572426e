//! The error type crossing the handler boundary.
//!
//! Service handlers return [`ServiceError`] for every failure. It carries a
//! closed [`ErrorKind`], the AWS exception name reported in `__type`, and a
//! message. The translator in [`response`](crate::response) turns it into a
//! wire envelope.

use mockstack_core::{ErrorKind, StoreError};

/// A typed service failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {message}")]
pub struct ServiceError {
    /// Classification driving the HTTP status.
    pub kind: ErrorKind,
    /// Exception name reported as `__type` (e.g. `ClientException`).
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Status that overrides the protocol convention, if any.
    pub status: Option<http::StatusCode>,
}

impl ServiceError {
    /// Create an error from its parts.
    #[must_use]
    pub fn new(kind: ErrorKind, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: code.into(),
            message: message.into(),
            status: None,
        }
    }

    /// Replace the exception name, keeping kind and message.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Pin the HTTP status regardless of the service's convention.
    #[must_use]
    pub fn with_status(mut self, status: http::StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    // -- Convenience constructors --

    /// Bad caller input.
    #[must_use]
    pub fn client(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Client, code, message)
    }

    /// Missing resource.
    #[must_use]
    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, code, message)
    }

    /// Unexpected emulator failure.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, "InternalFailure", message)
    }

    /// `X-Amz-Target` header without a `.` separator.
    #[must_use]
    pub fn invalid_target(target: &str) -> Self {
        Self::client(
            "InvalidTarget",
            format!("X-Amz-Target header must have the form <prefix>.<operation>, got '{target}'"),
        )
    }

    /// Known target prefix, unknown operation.
    #[must_use]
    pub fn unknown_operation(target: &str) -> Self {
        Self::client(
            "UnknownOperationException",
            format!("Unrecognized operation: {target}"),
        )
    }

    /// Request body could not be decoded.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::client("SerializationException", message)
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        let code = match &err {
            StoreError::NotFound { .. } => "ResourceNotFoundException",
            StoreError::Conflict { .. } => "ResourceAlreadyExistsException",
            StoreError::VersionConflict { .. } => "ConcurrentModificationException",
            StoreError::InvalidTransition { .. } => "InvalidParameterException",
        };
        Self::new(err.kind(), code, err.to_string())
    }
}

/// Convenience result type for service handlers.
pub type ServiceResult<T> = Result<T, ServiceError>;

//! Batch exception names.
//!
//! Batch reports every caller-side failure as `ClientException`. The error
//! kind is kept so the service's convention picks the status.

use mockstack_core::StoreError;
use mockstack_gateway::ServiceError;

/// Exception name of every Batch caller error.
pub const CLIENT_EXCEPTION: &str = "ClientException";

/// `ClientException` for bad input.
#[must_use]
pub fn client(message: impl Into<String>) -> ServiceError {
    ServiceError::client(CLIENT_EXCEPTION, message)
}

/// `ClientException` for a missing resource.
#[must_use]
pub fn not_found(message: impl Into<String>) -> ServiceError {
    ServiceError::not_found(CLIENT_EXCEPTION, message)
}

/// Convert a store error into a Batch `ClientException`.
///
/// Takes `err` by value because this is used as a closure argument to `.map_err()`.
#[must_use]
#[allow(clippy::needless_pass_by_value)]
pub fn store_error_to_batch(err: StoreError) -> ServiceError {
    let message = match &err {
        StoreError::NotFound { resource_type, key } => {
            format!("{} {key} does not exist", display_name(resource_type))
        }
        StoreError::Conflict { resource_type, key } => {
            format!("Object already exists: {} {key}", display_name(resource_type))
        }
        StoreError::VersionConflict { .. } | StoreError::InvalidTransition { .. } => {
            err.to_string()
        }
    };
    ServiceError::new(err.kind(), CLIENT_EXCEPTION, message)
}

fn display_name(resource_type: &str) -> &str {
    match resource_type {
        "compute-environment" => "ComputeEnvironment",
        "job-queue" => "JobQueue",
        other => other,
    }
}

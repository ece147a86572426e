//! ECS exception names.

use mockstack_core::StoreError;
use mockstack_gateway::ServiceError;

/// `ClientException` for bad input.
#[must_use]
pub fn client(message: impl Into<String>) -> ServiceError {
    ServiceError::client("ClientException", message)
}

/// `InvalidParameterException`.
#[must_use]
pub fn invalid_parameter(message: impl Into<String>) -> ServiceError {
    ServiceError::client("InvalidParameterException", message)
}

/// `ClusterNotFoundException`.
#[must_use]
pub fn cluster_not_found() -> ServiceError {
    ServiceError::not_found("ClusterNotFoundException", "Cluster not found.")
}

/// Convert a cluster store error into an ECS exception.
///
/// Takes `err` by value because this is used as a closure argument to `.map_err()`.
#[must_use]
#[allow(clippy::needless_pass_by_value)]
pub fn cluster_store_error(err: StoreError) -> ServiceError {
    match &err {
        StoreError::NotFound { .. } => cluster_not_found(),
        StoreError::VersionConflict { .. } => ServiceError::new(
            err.kind(),
            "UpdateInProgressException",
            "The cluster is being updated by another request. Try again.",
        ),
        StoreError::Conflict { .. } | StoreError::InvalidTransition { .. } => {
            ServiceError::new(err.kind(), "ClientException", err.to_string())
        }
    }
}

/// Convert a task definition store error into an ECS exception.
///
/// Takes `err` by value because this is used as a closure argument to `.map_err()`.
#[must_use]
#[allow(clippy::needless_pass_by_value)]
pub fn task_definition_store_error(err: StoreError) -> ServiceError {
    let message = match err {
        StoreError::NotFound { .. } => "Unable to describe task definition.".to_owned(),
        _ => err.to_string(),
    };
    ServiceError::new(err.kind(), "ClientException", message)
}

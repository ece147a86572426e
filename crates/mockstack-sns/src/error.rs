//! SNS exception names.

use mockstack_core::StoreError;
use mockstack_gateway::ServiceError;

/// `NotFoundException` for a missing topic or subscription.
#[must_use]
pub fn not_found(message: impl Into<String>) -> ServiceError {
    ServiceError::not_found("NotFoundException", message)
}

/// `InvalidParameterException`.
#[must_use]
pub fn invalid_parameter(message: impl Into<String>) -> ServiceError {
    ServiceError::client("InvalidParameterException", message)
}

/// Convert a store error into the SNS exception for it.
///
/// Takes `err` by value because this is used as a closure argument to `.map_err()`.
#[must_use]
#[allow(clippy::needless_pass_by_value)]
pub fn store_error_to_sns(err: StoreError) -> ServiceError {
    match &err {
        StoreError::NotFound { resource_type, .. } => {
            not_found(format!("{} does not exist", capitalize(resource_type)))
        }
        StoreError::Conflict { .. } => invalid_parameter(
            "Invalid parameter: Attributes Reason: Topic already exists with different attributes",
        ),
        StoreError::VersionConflict { .. } | StoreError::InvalidTransition { .. } => {
            ServiceError::from(err.clone())
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars
        .next()
        .map(|first| first.to_uppercase().chain(chars).collect())
        .unwrap_or_default()
}

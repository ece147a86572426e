//! ECS service for MockStack.
//!
//! Speaks the JSON-RPC protocol family under the
//! `AmazonEC2ContainerServiceV20141113` target prefix. Deleted clusters and
//! deregistered task definitions are kept as `INACTIVE`.

pub mod error;
pub mod handler;
pub mod model;
pub mod operations;
pub mod provider;
pub mod state;

use std::sync::Arc;

use mockstack_gateway::{ErrorConvention, ServiceDescriptor};

pub use handler::EcsHandler;
pub use operations::EcsOperation;
pub use provider::MockStackEcs;

/// Registry name of the service.
pub const SERVICE_NAME: &str = "ecs";

/// `X-Amz-Target` prefix of the service.
pub const TARGET_PREFIX: &str = "AmazonEC2ContainerServiceV20141113";

/// Build the gateway descriptor for an ECS provider.
#[must_use]
pub fn descriptor(provider: Arc<MockStackEcs>) -> ServiceDescriptor {
    ServiceDescriptor::json_rpc(
        SERVICE_NAME,
        TARGET_PREFIX,
        EcsOperation::ALL.iter().map(EcsOperation::as_str),
        Arc::new(EcsHandler::new(provider)),
    )
    .with_error_convention(ErrorConvention::uniform_bad_request())
}

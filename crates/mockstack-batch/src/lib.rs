//! Batch service for MockStack.
//!
//! Speaks the REST-JSON protocol family under the `/v1` path prefix. Compute
//! environments and job queues live in per-partition stores; every caller
//! error is a 400 `ClientException`.

pub mod error;
pub mod handler;
pub mod model;
pub mod operations;
pub mod provider;
pub mod state;

use std::sync::Arc;

use mockstack_gateway::{ErrorConvention, RouteTable, ServiceDescriptor};

pub use handler::BatchHandler;
pub use operations::BatchOperation;
pub use provider::MockStackBatch;

/// Registry name of the service.
pub const SERVICE_NAME: &str = "batch";

/// Path prefix of the service.
pub const URL_PREFIX: &str = "/v1";

/// Route table covering every [`BatchOperation`].
#[must_use]
pub fn routes() -> RouteTable {
    BatchOperation::ALL
        .iter()
        .fold(RouteTable::new(), |table, op| {
            let (method, path) = op.route();
            table.route(method, path, op.as_str())
        })
}

/// Build the gateway descriptor for a Batch provider.
#[must_use]
pub fn descriptor(provider: Arc<MockStackBatch>) -> ServiceDescriptor {
    ServiceDescriptor::rest_json(
        SERVICE_NAME,
        URL_PREFIX,
        routes(),
        Arc::new(BatchHandler::new(provider)),
    )
    .with_error_convention(ErrorConvention::uniform_bad_request())
}

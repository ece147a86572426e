//! ECS handler bridging the gateway to the provider.

use std::sync::Arc;

use bytes::Bytes;

use mockstack_gateway::response::serialize_response;
use mockstack_gateway::{
    GatewayBody, HandlerFuture, ProtocolKind, RequestContext, ServiceError, ServiceHandler,
};

use crate::operations::EcsOperation;
use crate::provider::MockStackEcs;

/// Handler that bridges the gateway to the ECS provider.
#[derive(Debug)]
pub struct EcsHandler {
    provider: Arc<MockStackEcs>,
}

impl EcsHandler {
    /// Create a new handler wrapping a provider.
    #[must_use]
    pub fn new(provider: Arc<MockStackEcs>) -> Self {
        Self { provider }
    }
}

impl ServiceHandler for EcsHandler {
    fn handle(&self, ctx: RequestContext, body: Bytes) -> HandlerFuture {
        let provider = Arc::clone(&self.provider);
        Box::pin(async move { dispatch(provider.as_ref(), &ctx, &body) })
    }
}

/// Dispatch an ECS operation to the appropriate provider method.
fn dispatch(
    provider: &MockStackEcs,
    ctx: &RequestContext,
    body: &[u8],
) -> Result<http::Response<GatewayBody>, ServiceError> {
    let op = EcsOperation::from_name(ctx.operation)
        .ok_or_else(|| ServiceError::unknown_operation(ctx.operation))?;

    match op {
        EcsOperation::CreateCluster => {
            let output = provider.handle_create_cluster(ctx, deserialize(body)?)?;
            serialize_response(ProtocolKind::JsonRpc, &output)
        }
        EcsOperation::DescribeClusters => {
            let output = provider.handle_describe_clusters(ctx, &deserialize(body)?)?;
            serialize_response(ProtocolKind::JsonRpc, &output)
        }
        EcsOperation::ListClusters => {
            let output = provider.handle_list_clusters(ctx, &deserialize(body)?)?;
            serialize_response(ProtocolKind::JsonRpc, &output)
        }
        EcsOperation::DeleteCluster => {
            let output = provider.handle_delete_cluster(ctx, &deserialize(body)?)?;
            serialize_response(ProtocolKind::JsonRpc, &output)
        }
        EcsOperation::UpdateClusterSettings => {
            let output = provider.handle_update_cluster_settings(ctx, deserialize(body)?)?;
            serialize_response(ProtocolKind::JsonRpc, &output)
        }
        EcsOperation::RegisterTaskDefinition => {
            let output = provider.handle_register_task_definition(ctx, deserialize(body)?)?;
            serialize_response(ProtocolKind::JsonRpc, &output)
        }
        EcsOperation::DescribeTaskDefinition => {
            let output = provider.handle_describe_task_definition(ctx, &deserialize(body)?)?;
            serialize_response(ProtocolKind::JsonRpc, &output)
        }
        EcsOperation::DeregisterTaskDefinition => {
            let output = provider.handle_deregister_task_definition(ctx, &deserialize(body)?)?;
            serialize_response(ProtocolKind::JsonRpc, &output)
        }
        EcsOperation::ListTaskDefinitions => {
            let output = provider.handle_list_task_definitions(ctx, &deserialize(body)?)?;
            serialize_response(ProtocolKind::JsonRpc, &output)
        }
    }
}

/// Deserialize a JSON request body into the input type. An empty body is `{}`.
fn deserialize<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, ServiceError> {
    let body = if body.is_empty() { b"{}".as_slice() } else { body };
    serde_json::from_slice(body).map_err(|e| {
        ServiceError::serialization(format!("Failed to deserialize request body: {e}"))
    })
}

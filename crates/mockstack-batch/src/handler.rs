//! Batch handler bridging the gateway to the provider.

use std::sync::Arc;

use bytes::Bytes;

use mockstack_gateway::response::{empty_json_response, serialize_response};
use mockstack_gateway::{
    GatewayBody, HandlerFuture, ProtocolKind, RequestContext, ServiceError, ServiceHandler,
};

use crate::error::client;
use crate::operations::BatchOperation;
use crate::provider::MockStackBatch;

/// Handler that bridges the gateway to the Batch provider.
#[derive(Debug)]
pub struct BatchHandler {
    provider: Arc<MockStackBatch>,
}

impl BatchHandler {
    /// Create a new handler wrapping a provider.
    #[must_use]
    pub fn new(provider: Arc<MockStackBatch>) -> Self {
        Self { provider }
    }
}

impl ServiceHandler for BatchHandler {
    fn handle(&self, ctx: RequestContext, body: Bytes) -> HandlerFuture {
        let provider = Arc::clone(&self.provider);
        Box::pin(async move { dispatch(provider.as_ref(), &ctx, &body) })
    }
}

/// Dispatch a Batch operation to the appropriate provider method.
fn dispatch(
    provider: &MockStackBatch,
    ctx: &RequestContext,
    body: &[u8],
) -> Result<http::Response<GatewayBody>, ServiceError> {
    let op = BatchOperation::from_name(ctx.operation)
        .ok_or_else(|| ServiceError::unknown_operation(ctx.operation))?;

    match op {
        BatchOperation::CreateComputeEnvironment => {
            let output = provider.handle_create_compute_environment(ctx, deserialize(body)?)?;
            serialize_response(ProtocolKind::RestJson, &output)
        }
        BatchOperation::DescribeComputeEnvironments => {
            let output = provider.handle_describe_compute_environments(ctx, &deserialize(body)?)?;
            serialize_response(ProtocolKind::RestJson, &output)
        }
        BatchOperation::UpdateComputeEnvironment => {
            let output = provider.handle_update_compute_environment(ctx, deserialize(body)?)?;
            serialize_response(ProtocolKind::RestJson, &output)
        }
        BatchOperation::DeleteComputeEnvironment => {
            provider.handle_delete_compute_environment(ctx, &deserialize(body)?)?;
            Ok(empty_json_response(ProtocolKind::RestJson))
        }
        BatchOperation::CreateJobQueue => {
            let output = provider.handle_create_job_queue(ctx, deserialize(body)?)?;
            serialize_response(ProtocolKind::RestJson, &output)
        }
        BatchOperation::DescribeJobQueues => {
            let output = provider.handle_describe_job_queues(ctx, &deserialize(body)?)?;
            serialize_response(ProtocolKind::RestJson, &output)
        }
        BatchOperation::UpdateJobQueue => {
            let output = provider.handle_update_job_queue(ctx, deserialize(body)?)?;
            serialize_response(ProtocolKind::RestJson, &output)
        }
        BatchOperation::DeleteJobQueue => {
            provider.handle_delete_job_queue(ctx, &deserialize(body)?)?;
            Ok(empty_json_response(ProtocolKind::RestJson))
        }
        BatchOperation::TagResource => {
            provider.handle_tag_resource(ctx, resource_arn(ctx)?, deserialize(body)?)?;
            Ok(empty_json_response(ProtocolKind::RestJson))
        }
        BatchOperation::ListTagsForResource => {
            let output = provider.handle_list_tags_for_resource(ctx, resource_arn(ctx)?)?;
            serialize_response(ProtocolKind::RestJson, &output)
        }
        BatchOperation::UntagResource => {
            let keys: Vec<String> = ctx.query_values("tagKeys").map(str::to_owned).collect();
            provider.handle_untag_resource(ctx, resource_arn(ctx)?, &keys)?;
            Ok(empty_json_response(ProtocolKind::RestJson))
        }
    }
}

fn resource_arn(ctx: &RequestContext) -> Result<&str, ServiceError> {
    ctx.path_param("resourceArn")
        .ok_or_else(|| client("resourceArn is required"))
}

/// Deserialize a JSON request body into the input type. An empty body is `{}`.
fn deserialize<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, ServiceError> {
    let body = if body.is_empty() { b"{}".as_slice() } else { body };
    serde_json::from_slice(body).map_err(|e| client(format!("Invalid request body: {e}")))
}

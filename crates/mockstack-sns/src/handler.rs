//! SNS handler bridging the gateway to the provider.

use std::sync::Arc;

use bytes::Bytes;

use mockstack_gateway::response::{empty_json_response, serialize_response};
use mockstack_gateway::{
    GatewayBody, HandlerFuture, ProtocolKind, RequestContext, ServiceError, ServiceHandler,
};

use crate::operations::SnsOperation;
use crate::provider::MockStackSns;

/// Handler that bridges the gateway to the SNS provider.
#[derive(Debug)]
pub struct SnsHandler {
    provider: Arc<MockStackSns>,
}

impl SnsHandler {
    /// Create a new handler wrapping a provider.
    #[must_use]
    pub fn new(provider: Arc<MockStackSns>) -> Self {
        Self { provider }
    }
}

impl ServiceHandler for SnsHandler {
    fn handle(&self, ctx: RequestContext, body: Bytes) -> HandlerFuture {
        let provider = Arc::clone(&self.provider);
        Box::pin(async move { dispatch(provider.as_ref(), &ctx, &body) })
    }
}

/// Dispatch an SNS operation to the appropriate provider method.
fn dispatch(
    provider: &MockStackSns,
    ctx: &RequestContext,
    body: &[u8],
) -> Result<http::Response<GatewayBody>, ServiceError> {
    let op = SnsOperation::from_name(ctx.operation)
        .ok_or_else(|| ServiceError::unknown_operation(ctx.operation))?;

    match op {
        SnsOperation::CreateTopic => {
            let input = deserialize(body)?;
            let output = provider.handle_create_topic(ctx, input)?;
            serialize_response(ProtocolKind::JsonRpc, &output)
        }
        SnsOperation::DeleteTopic => {
            let input = deserialize(body)?;
            provider.handle_delete_topic(ctx, &input)?;
            Ok(empty_json_response(ProtocolKind::JsonRpc))
        }
        SnsOperation::GetTopicAttributes => {
            let input = deserialize(body)?;
            let output = provider.handle_get_topic_attributes(ctx, &input)?;
            serialize_response(ProtocolKind::JsonRpc, &output)
        }
        SnsOperation::SetTopicAttributes => {
            let input = deserialize(body)?;
            provider.handle_set_topic_attributes(ctx, input)?;
            Ok(empty_json_response(ProtocolKind::JsonRpc))
        }
        SnsOperation::ListTopics => {
            let input = deserialize(body)?;
            let output = provider.handle_list_topics(ctx, &input)?;
            serialize_response(ProtocolKind::JsonRpc, &output)
        }
        SnsOperation::Subscribe => {
            let input = deserialize(body)?;
            let output = provider.handle_subscribe(ctx, input)?;
            serialize_response(ProtocolKind::JsonRpc, &output)
        }
        SnsOperation::Unsubscribe => {
            let input = deserialize(body)?;
            provider.handle_unsubscribe(ctx, &input)?;
            Ok(empty_json_response(ProtocolKind::JsonRpc))
        }
        SnsOperation::ListSubscriptionsByTopic => {
            let input = deserialize(body)?;
            let output = provider.handle_list_subscriptions_by_topic(ctx, &input)?;
            serialize_response(ProtocolKind::JsonRpc, &output)
        }
        SnsOperation::Publish => {
            let input = deserialize(body)?;
            let output = provider.handle_publish(ctx, &input)?;
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

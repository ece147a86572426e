//! SNS service for MockStack.
//!
//! Speaks the JSON-RPC protocol family under the `AmazonSNS` target prefix.
//! Topics use idempotent creation; subscriptions get server-generated keys.

pub mod error;
pub mod handler;
pub mod model;
pub mod operations;
pub mod provider;
pub mod state;

use std::sync::Arc;

use mockstack_gateway::{ErrorConvention, ServiceDescriptor};

pub use handler::SnsHandler;
pub use operations::SnsOperation;
pub use provider::MockStackSns;

/// Registry name of the service.
pub const SERVICE_NAME: &str = "sns";

/// `X-Amz-Target` prefix of the service.
pub const TARGET_PREFIX: &str = "AmazonSNS";

/// Build the gateway descriptor for an SNS provider.
///
/// SNS reports missing topics with 404 and every other caller error with 400.
#[must_use]
pub fn descriptor(provider: Arc<MockStackSns>) -> ServiceDescriptor {
    ServiceDescriptor::json_rpc(
        SERVICE_NAME,
        TARGET_PREFIX,
        SnsOperation::ALL.iter().map(SnsOperation::as_str),
        Arc::new(SnsHandler::new(provider)),
    )
    .with_error_convention(
        ErrorConvention::uniform_bad_request().with_not_found(http::StatusCode::NOT_FOUND),
    )
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use http_body_util::BodyExt;
    use mockstack_core::{AccountId, AwsRegion};
    use mockstack_gateway::{Dispatcher, ServiceRegistry};

    use super::*;

    fn dispatcher() -> Dispatcher {
        let mut registry = ServiceRegistry::new();
        registry
            .register(descriptor(Arc::new(MockStackSns::new())))
            .unwrap();
        Dispatcher::new(Arc::new(registry), AccountId::default(), AwsRegion::default())
    }

    async fn call(
        d: &Dispatcher,
        operation: &str,
        body: serde_json::Value,
    ) -> (http::StatusCode, serde_json::Value) {
        let req = http::Request::builder()
            .method(http::Method::POST)
            .uri("/")
            .header("x-amz-target", format!("{TARGET_PREFIX}.{operation}"))
            .header("content-type", "application/x-amz-json-1.1")
            .body(Bytes::from(serde_json::to_vec(&body).unwrap()))
            .unwrap();
        let resp = d.dispatch(req).await;
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_should_create_topic_idempotently_over_the_wire() {
        let d = dispatcher();
        let (status, first) = call(&d, "CreateTopic", serde_json::json!({"Name": "t1"})).await;
        assert_eq!(status, http::StatusCode::OK);
        let (_, second) = call(&d, "CreateTopic", serde_json::json!({"Name": "t1"})).await;
        assert_eq!(first["TopicArn"], "arn:aws:sns:us-east-1:000000000000:t1");
        assert_eq!(first["TopicArn"], second["TopicArn"]);
    }

    #[tokio::test]
    async fn test_should_report_missing_topic_as_404() {
        let d = dispatcher();
        let (status, body) = call(
            &d,
            "GetTopicAttributes",
            serde_json::json!({"TopicArn": "arn:aws:sns:us-east-1:000000000000:nope"}),
        )
        .await;
        assert_eq!(status, http::StatusCode::NOT_FOUND);
        assert_eq!(body["__type"], "NotFoundException");
    }

    #[tokio::test]
    async fn test_should_reject_malformed_body_with_serialization_exception() {
        let d = dispatcher();
        let (status, body) = call(&d, "CreateTopic", serde_json::json!({"Name": 42})).await;
        assert_eq!(status, http::StatusCode::BAD_REQUEST);
        assert_eq!(body["__type"], "SerializationException");
    }

    #[tokio::test]
    async fn test_should_delete_missing_topic_with_empty_body() {
        let d = dispatcher();
        let (status, body) = call(
            &d,
            "DeleteTopic",
            serde_json::json!({"TopicArn": "arn:aws:sns:us-east-1:000000000000:nope"}),
        )
        .await;
        assert_eq!(status, http::StatusCode::OK);
        assert_eq!(body, serde_json::json!({}));
    }
}

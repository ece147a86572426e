//! Integration tests for MockStack.
//!
//! Most tests run the full registry and dispatcher in-process. Tests driven by
//! the AWS SDKs need a running server at `localhost:4566` and are marked
//! `#[ignore]`. Run them with:
//!
//! ```text
//! cargo test -p mockstack-integration -- --ignored
//! ```

use std::sync::{Arc, Once};

use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use bytes::Bytes;
use http_body_util::BodyExt;
use mockstack_core::{AccountId, AwsRegion};
use mockstack_gateway::{Dispatcher, ServiceRegistry};

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

// ---------------------------------------------------------------------------
// In-process gateway
// ---------------------------------------------------------------------------

/// A dispatcher hosting Batch, SNS, and ECS with fresh state.
#[must_use]
pub fn dispatcher() -> Dispatcher {
    init_tracing();

    let mut registry = ServiceRegistry::new();
    registry
        .register(mockstack_batch::descriptor(Arc::new(
            mockstack_batch::MockStackBatch::new(),
        )))
        .unwrap_or_else(|e| panic!("failed to register batch: {e}"));
    registry
        .register(mockstack_sns::descriptor(Arc::new(
            mockstack_sns::MockStackSns::new(),
        )))
        .unwrap_or_else(|e| panic!("failed to register sns: {e}"));
    registry
        .register(mockstack_ecs::descriptor(Arc::new(
            mockstack_ecs::MockStackEcs::new(),
        )))
        .unwrap_or_else(|e| panic!("failed to register ecs: {e}"));

    Dispatcher::new(Arc::new(registry), AccountId::default(), AwsRegion::default())
}

/// A buffered gateway response.
#[derive(Debug)]
pub struct Reply {
    /// HTTP status.
    pub status: http::StatusCode,
    /// Response headers.
    pub headers: http::HeaderMap,
    /// Raw body.
    pub raw: Bytes,
    /// Body parsed as JSON, `Null` when empty.
    pub body: serde_json::Value,
}

async fn send(d: &Dispatcher, req: http::Request<Bytes>) -> Reply {
    let resp = d.dispatch(req).await;
    let status = resp.status();
    let headers = resp.headers().clone();
    let raw = resp
        .into_body()
        .collect()
        .await
        .unwrap_or_else(|e| panic!("failed to read body: {e}"))
        .to_bytes();
    let body = if raw.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&raw).unwrap_or_else(|e| panic!("body is not JSON: {e}"))
    };
    Reply {
        status,
        headers,
        raw,
        body,
    }
}

/// SigV4 `Authorization` header whose credential scope names `region`.
#[must_use]
pub fn authorization_for(region: &str, service: &str) -> String {
    format!(
        "AWS4-HMAC-SHA256 Credential=test/20250101/{region}/{service}/aws4_request, \
         SignedHeaders=host;x-amz-date, Signature=0000"
    )
}

/// Send a JSON-RPC call with `X-Amz-Target: <target>`.
pub async fn json_rpc(d: &Dispatcher, target: &str, body: serde_json::Value) -> Reply {
    json_rpc_with(d, target, None, body).await
}

/// Send a JSON-RPC call with an optional `Authorization` header.
pub async fn json_rpc_with(
    d: &Dispatcher,
    target: &str,
    authorization: Option<&str>,
    body: serde_json::Value,
) -> Reply {
    let mut builder = http::Request::builder()
        .method(http::Method::POST)
        .uri("/")
        .header("x-amz-target", target)
        .header("content-type", "application/x-amz-json-1.1");
    if let Some(auth) = authorization {
        builder = builder.header("authorization", auth);
    }
    let req = builder
        .body(Bytes::from(body.to_string()))
        .unwrap_or_else(|e| panic!("invalid request: {e}"));
    send(d, req).await
}

/// Send a REST call.
pub async fn rest(
    d: &Dispatcher,
    method: http::Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> Reply {
    let body = body.map_or_else(Bytes::new, |b| Bytes::from(b.to_string()));
    let req = http::Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body)
        .unwrap_or_else(|e| panic!("invalid request: {e}"));
    send(d, req).await
}

/// Generate a unique resource name for a test.
#[must_use]
pub fn unique_name(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().to_string()[..8].to_owned();
    format!("test-{prefix}-{id}")
}

// ---------------------------------------------------------------------------
// SDK clients for a running server
// ---------------------------------------------------------------------------

/// Endpoint URL for the server.
fn endpoint_url() -> String {
    std::env::var("MOCKSTACK_ENDPOINT_URL").unwrap_or_else(|_| "http://localhost:4566".to_owned())
}

fn credentials() -> Credentials {
    Credentials::new("test", "test", None, None, "integration-test")
}

/// Create an ECS client pointing at the local server.
#[must_use]
pub fn ecs_client() -> aws_sdk_ecs::Client {
    init_tracing();

    let config = aws_sdk_ecs::config::Builder::new()
        .behavior_version(BehaviorVersion::latest())
        .region(aws_sdk_ecs::config::Region::new("us-east-1"))
        .credentials_provider(credentials())
        .endpoint_url(endpoint_url())
        .build();

    aws_sdk_ecs::Client::from_conf(config)
}

/// Create a Batch client pointing at the local server.
#[must_use]
pub fn batch_client() -> aws_sdk_batch::Client {
    init_tracing();

    let config = aws_sdk_batch::config::Builder::new()
        .behavior_version(BehaviorVersion::latest())
        .region(aws_sdk_batch::config::Region::new("us-east-1"))
        .credentials_provider(credentials())
        .endpoint_url(endpoint_url())
        .build();

    aws_sdk_batch::Client::from_conf(config)
}

mod test_batch;
mod test_ecs;
mod test_gateway;
mod test_sns;

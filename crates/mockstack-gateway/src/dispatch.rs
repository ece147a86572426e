//! Protocol dispatch.
//!
//! Every request is resolved to a `(service, operation)` pair in one of two
//! ways:
//!
//! 1. With an `X-Amz-Target` header, the part before the first `.` selects a
//!    JSON-RPC service by target prefix and the rest selects the operation.
//! 2. Without one, the longest registered URL prefix covering the path selects
//!    a REST service, whose route table selects the operation.
//!
//! Anything else is answered with a protocol-neutral 404. A target header
//! without a `.` is rejected with `InvalidTarget` before any handler runs.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;

use mockstack_core::{AccountId, AwsRegion, ErrorKind};

use crate::body::GatewayBody;
use crate::context::{RequestContext, parse_query, region_from_headers};
use crate::descriptor::{ErrorConvention, ProtocolKind, Routing, ServiceDescriptor};
use crate::error::ServiceError;
use crate::registry::ServiceRegistry;
use crate::response::{REQUEST_ID_HEADER, error_to_response, health_response, not_found_response};

/// Header naming the JSON-RPC operation.
pub const TARGET_HEADER: &str = "x-amz-target";

/// Paths answered with the health report.
const HEALTH_PATHS: [&str; 3] = ["/_localstack/health", "/_health", "/health"];

/// A request resolved to a service operation.
#[derive(Debug, Clone)]
pub struct ResolvedRoute {
    /// The owning service.
    pub service: Arc<ServiceDescriptor>,
    /// Operation name.
    pub operation: &'static str,
    /// Decoded `{param}` values, empty for JSON-RPC.
    pub path_params: HashMap<String, String>,
}

/// Why a request did not resolve.
#[derive(Debug, Clone)]
pub enum Unresolved {
    /// `X-Amz-Target` without a `.` separator.
    InvalidTarget(String),
    /// Known target prefix, unknown operation.
    UnknownOperation {
        /// Service owning the prefix.
        service: Arc<ServiceDescriptor>,
        /// Full header value.
        target: String,
    },
    /// No service claims the request.
    NoRoute,
}

/// Single entry point from HTTP into the registered services.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<ServiceRegistry>,
    account: AccountId,
    default_region: AwsRegion,
}

impl Dispatcher {
    /// Create a dispatcher over a fully populated registry.
    #[must_use]
    pub fn new(
        registry: Arc<ServiceRegistry>,
        account: AccountId,
        default_region: AwsRegion,
    ) -> Self {
        Self {
            registry,
            account,
            default_region,
        }
    }

    /// The registry requests are resolved against.
    #[must_use]
    pub fn registry(&self) -> &Arc<ServiceRegistry> {
        &self.registry
    }

    /// Resolve a request to a service operation without invoking anything.
    ///
    /// # Errors
    /// Returns [`Unresolved`] when no operation matches.
    pub fn resolve(
        &self,
        method: &http::Method,
        path: &str,
        headers: &http::HeaderMap,
    ) -> Result<ResolvedRoute, Unresolved> {
        if let Some(target) = headers.get(TARGET_HEADER) {
            let target = target.to_str().unwrap_or_default();
            return self.resolve_target(target);
        }
        self.resolve_path(method, path)
    }

    fn resolve_target(&self, target: &str) -> Result<ResolvedRoute, Unresolved> {
        let Some((prefix, operation)) = target.split_once('.') else {
            return Err(Unresolved::InvalidTarget(target.to_owned()));
        };
        let service = self
            .registry
            .lookup_by_target_prefix(prefix)
            .ok_or(Unresolved::NoRoute)?;
        let Routing::JsonRpc { operations, .. } = service.routing() else {
            return Err(Unresolved::NoRoute);
        };
        match operations.get(operation) {
            Some(operation) => Ok(ResolvedRoute {
                service: Arc::clone(service),
                operation: *operation,
                path_params: HashMap::new(),
            }),
            None => Err(Unresolved::UnknownOperation {
                service: Arc::clone(service),
                target: target.to_owned(),
            }),
        }
    }

    fn resolve_path(&self, method: &http::Method, path: &str) -> Result<ResolvedRoute, Unresolved> {
        let service = self
            .registry
            .longest_prefix_match(path)
            .ok_or(Unresolved::NoRoute)?;
        let Routing::RestJson { routes, .. } = service.routing() else {
            return Err(Unresolved::NoRoute);
        };
        let matched = routes.resolve(method, path).ok_or(Unresolved::NoRoute)?;
        Ok(ResolvedRoute {
            service: Arc::clone(service),
            operation: matched.operation,
            path_params: matched.params,
        })
    }

    /// Handle one buffered request end to end.
    ///
    /// Never fails: resolution and handler errors become error responses.
    pub async fn dispatch(&self, req: http::Request<Bytes>) -> http::Response<GatewayBody> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let response = self.process(req, &request_id).await;
        add_common_headers(response, &request_id)
    }

    async fn process(
        &self,
        req: http::Request<Bytes>,
        request_id: &str,
    ) -> http::Response<GatewayBody> {
        let (parts, body) = req.into_parts();
        let path = parts.uri.path();

        if parts.method == http::Method::GET && HEALTH_PATHS.contains(&path) {
            return health_response(self.registry.names());
        }

        let route = match self.resolve(&parts.method, path, &parts.headers) {
            Ok(route) => route,
            Err(Unresolved::InvalidTarget(target)) => {
                tracing::warn!(%target, request_id, "malformed X-Amz-Target header");
                return error_to_response(
                    &ServiceError::invalid_target(&target),
                    ProtocolKind::JsonRpc,
                    ErrorConvention::for_protocol(ProtocolKind::JsonRpc),
                    request_id,
                );
            }
            Err(Unresolved::UnknownOperation { service, target }) => {
                tracing::warn!(service = service.name(), %target, request_id, "unknown operation");
                return error_to_response(
                    &ServiceError::unknown_operation(&target),
                    service.protocol(),
                    service.error_convention(),
                    request_id,
                );
            }
            Err(Unresolved::NoRoute) => {
                tracing::warn!(method = %parts.method, path, request_id, "no service claims request");
                return not_found_response(request_id);
            }
        };

        let service = route.service;
        let ctx = RequestContext {
            request_id: request_id.to_owned(),
            service: service.name(),
            operation: route.operation,
            protocol: service.protocol(),
            method: parts.method.clone(),
            path: path.to_owned(),
            path_params: route.path_params,
            query: parse_query(parts.uri.query()),
            region: region_from_headers(&parts.headers, &self.default_region),
            account: self.account.clone(),
            headers: parts.headers,
        };

        tracing::debug!(
            service = service.name(),
            operation = route.operation,
            region = %ctx.region,
            request_id,
            "dispatching request"
        );

        match service.handler().handle(ctx, body).await {
            Ok(response) => response,
            Err(err) => {
                if err.kind == ErrorKind::Internal {
                    tracing::error!(
                        service = service.name(),
                        operation = route.operation,
                        request_id,
                        error = %err,
                        "operation failed"
                    );
                } else {
                    tracing::debug!(
                        service = service.name(),
                        operation = route.operation,
                        request_id,
                        error = %err,
                        "operation rejected"
                    );
                }
                error_to_response(&err, service.protocol(), service.error_convention(), request_id)
            }
        }
    }
}

/// Add headers every response carries.
fn add_common_headers(
    mut response: http::Response<GatewayBody>,
    request_id: &str,
) -> http::Response<GatewayBody> {
    let headers = response.headers_mut();

    if let Ok(hv) = http::HeaderValue::from_str(request_id) {
        headers.entry(REQUEST_ID_HEADER).or_insert(hv);
    }

    headers.insert("server", http::HeaderValue::from_static("mockstack"));

    // CORS headers.
    headers.insert(
        "access-control-allow-origin",
        http::HeaderValue::from_static("*"),
    );

    response
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use http::Method;
    use http_body_util::BodyExt;

    use super::*;
    use crate::descriptor::{HandlerFuture, ServiceHandler};
    use crate::response::{empty_json_response, json_response};
    use crate::router::RouteTable;

    /// Echoes the resolved operation and counts invocations.
    #[derive(Default)]
    struct Echo {
        calls: AtomicUsize,
    }

    impl ServiceHandler for Echo {
        fn handle(&self, ctx: RequestContext, body: Bytes) -> HandlerFuture {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                match ctx.operation {
                    "Fail" => Err(ServiceError::not_found("NotFoundException", "gone")),
                    "Empty" => Ok(empty_json_response(ctx.protocol)),
                    _ => {
                        let json = serde_json::to_vec(&serde_json::json!({
                            "operation": ctx.operation,
                            "region": ctx.region.as_str(),
                            "params": ctx.path_params,
                            "body": String::from_utf8_lossy(&body),
                        }))
                        .unwrap();
                        Ok(json_response(ctx.protocol, json))
                    }
                }
            })
        }
    }

    fn dispatcher(rpc: Arc<Echo>, rest: Arc<Echo>) -> Dispatcher {
        let mut registry = ServiceRegistry::new();
        registry
            .register(ServiceDescriptor::json_rpc(
                "sns",
                "AmazonSNS",
                ["CreateTopic", "Fail"],
                rpc,
            ))
            .unwrap();
        registry
            .register(ServiceDescriptor::rest_json(
                "batch",
                "/v1",
                RouteTable::new()
                    .route(Method::POST, "/v1/createcomputeenvironment", "CreateComputeEnvironment")
                    .route(Method::POST, "/v1/deletecomputeenvironment", "Empty")
                    .route(Method::GET, "/v1/tags/{resourceArn}", "ListTagsForResource")
                    .route(Method::POST, "/v1/fail", "Fail"),
                rest,
            ))
            .unwrap();
        Dispatcher::new(Arc::new(registry), AccountId::default(), AwsRegion::default())
    }

    fn rpc_request(target: &str, body: &'static str) -> http::Request<Bytes> {
        http::Request::builder()
            .method(Method::POST)
            .uri("/")
            .header(TARGET_HEADER, target)
            .body(Bytes::from_static(body.as_bytes()))
            .unwrap()
    }

    fn rest_request(method: Method, uri: &str) -> http::Request<Bytes> {
        http::Request::builder()
            .method(method)
            .uri(uri)
            .body(Bytes::new())
            .unwrap()
    }

    async fn body_json(resp: http::Response<GatewayBody>) -> serde_json::Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_should_dispatch_json_rpc_by_target() {
        let rpc = Arc::new(Echo::default());
        let d = dispatcher(Arc::clone(&rpc), Arc::new(Echo::default()));

        let resp = d
            .dispatch(rpc_request("AmazonSNS.CreateTopic", r#"{"Name":"t1"}"#))
            .await;
        assert_eq!(resp.status(), http::StatusCode::OK);
        assert_eq!(
            resp.headers().get("content-type").unwrap(),
            "application/x-amz-json-1.1"
        );
        assert!(resp.headers().get(REQUEST_ID_HEADER).is_some());
        assert_eq!(resp.headers().get("server").unwrap(), "mockstack");

        let body = body_json(resp).await;
        assert_eq!(body["operation"], "CreateTopic");
        assert_eq!(body["body"], r#"{"Name":"t1"}"#);
        assert_eq!(rpc.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_should_reject_target_without_dot_before_any_handler() {
        let rpc = Arc::new(Echo::default());
        let rest = Arc::new(Echo::default());
        let d = dispatcher(Arc::clone(&rpc), Arc::clone(&rest));

        let resp = d.dispatch(rpc_request("NoDotHere", "{}")).await;
        assert_eq!(resp.status(), http::StatusCode::BAD_REQUEST);
        assert!(resp.headers().get(REQUEST_ID_HEADER).is_some());
        assert_eq!(body_json(resp).await["__type"], "InvalidTarget");
        assert_eq!(rpc.calls.load(Ordering::SeqCst), 0);
        assert_eq!(rest.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_should_reject_unknown_operation_under_known_prefix() {
        let rpc = Arc::new(Echo::default());
        let d = dispatcher(Arc::clone(&rpc), Arc::new(Echo::default()));

        let resp = d.dispatch(rpc_request("AmazonSNS.Nope", "{}")).await;
        assert_eq!(resp.status(), http::StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["__type"], "UnknownOperationException");
        assert_eq!(rpc.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_should_return_neutral_404_for_unclaimed_requests() {
        let d = dispatcher(Arc::new(Echo::default()), Arc::new(Echo::default()));

        let unknown_prefix = d.dispatch(rpc_request("AmazonSQS.SendMessage", "{}")).await;
        assert_eq!(unknown_prefix.status(), http::StatusCode::NOT_FOUND);
        assert_eq!(
            unknown_prefix.headers().get("content-type").unwrap(),
            "application/json"
        );

        let unknown_path = d.dispatch(rest_request(Method::GET, "/v2/anything")).await;
        assert_eq!(unknown_path.status(), http::StatusCode::NOT_FOUND);

        let unrouted = d.dispatch(rest_request(Method::GET, "/v1/createcomputeenvironment")).await;
        assert_eq!(unrouted.status(), http::StatusCode::NOT_FOUND);
        assert!(unrouted.headers().get(REQUEST_ID_HEADER).is_some());
    }

    #[tokio::test]
    async fn test_should_dispatch_rest_by_path_with_params() {
        let rest = Arc::new(Echo::default());
        let d = dispatcher(Arc::new(Echo::default()), Arc::clone(&rest));

        let resp = d
            .dispatch(rest_request(
                Method::GET,
                "/v1/tags/arn%3Aaws%3Abatch%3Aus-east-1%3A000000000000%3Ajob-queue%2Fq1?x=1",
            ))
            .await;
        assert_eq!(resp.status(), http::StatusCode::OK);
        assert_eq!(resp.headers().get("content-type").unwrap(), "application/json");
        let body = body_json(resp).await;
        assert_eq!(body["operation"], "ListTagsForResource");
        assert_eq!(
            body["params"]["resourceArn"],
            "arn:aws:batch:us-east-1:000000000000:job-queue/q1"
        );
        assert_eq!(rest.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_should_translate_handler_errors_per_service_convention() {
        let d = dispatcher(Arc::new(Echo::default()), Arc::new(Echo::default()));

        let rpc = d.dispatch(rpc_request("AmazonSNS.Fail", "{}")).await;
        assert_eq!(rpc.status(), http::StatusCode::BAD_REQUEST);
        assert!(rpc.headers().get("x-amzn-errortype").is_none());

        let rest = d.dispatch(rest_request(Method::POST, "/v1/fail")).await;
        assert_eq!(rest.status(), http::StatusCode::NOT_FOUND);
        assert_eq!(rest.headers().get("x-amzn-errortype").unwrap(), "NotFoundException");
        assert!(rest.headers().get(REQUEST_ID_HEADER).is_some());
        assert_eq!(body_json(rest).await["message"], "gone");
    }

    #[tokio::test]
    async fn test_should_use_region_from_credential_scope() {
        let d = dispatcher(Arc::new(Echo::default()), Arc::new(Echo::default()));
        let req = http::Request::builder()
            .method(Method::POST)
            .uri("/v1/createcomputeenvironment")
            .header(
                "authorization",
                "AWS4-HMAC-SHA256 Credential=AKID/20240101/ap-south-1/batch/aws4_request, SignedHeaders=host, Signature=0",
            )
            .body(Bytes::new())
            .unwrap();
        let body = body_json(d.dispatch(req).await).await;
        assert_eq!(body["region"], "ap-south-1");
    }

    #[tokio::test]
    async fn test_should_answer_health_check_without_dispatch() {
        let d = dispatcher(Arc::new(Echo::default()), Arc::new(Echo::default()));
        for path in HEALTH_PATHS {
            let resp = d.dispatch(rest_request(Method::GET, path)).await;
            assert_eq!(resp.status(), http::StatusCode::OK);
            let body = body_json(resp).await;
            assert_eq!(body["services"]["sns"], "running");
            assert_eq!(body["services"]["batch"], "running");
        }
    }

    #[test]
    fn test_should_resolve_deterministically() {
        let d = dispatcher(Arc::new(Echo::default()), Arc::new(Echo::default()));
        let mut headers = http::HeaderMap::new();
        headers.insert(TARGET_HEADER, http::HeaderValue::from_static("AmazonSNS.CreateTopic"));

        for _ in 0..16 {
            let route = d.resolve(&Method::POST, "/", &headers).unwrap();
            assert_eq!(route.service.name(), "sns");
            assert_eq!(route.operation, "CreateTopic");

            let route = d
                .resolve(&Method::POST, "/v1/createcomputeenvironment", &http::HeaderMap::new())
                .unwrap();
            assert_eq!(route.service.name(), "batch");
            assert_eq!(route.operation, "CreateComputeEnvironment");
        }
    }

    #[tokio::test]
    async fn test_should_give_each_response_a_fresh_request_id() {
        let d = dispatcher(Arc::new(Echo::default()), Arc::new(Echo::default()));
        let a = d.dispatch(rest_request(Method::POST, "/v1/deletecomputeenvironment")).await;
        let b = d.dispatch(rest_request(Method::POST, "/v1/deletecomputeenvironment")).await;
        assert_ne!(
            a.headers().get(REQUEST_ID_HEADER),
            b.headers().get(REQUEST_ID_HEADER)
        );
        assert_eq!(body_json(a).await, serde_json::json!({}));
    }
}

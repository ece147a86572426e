//! Gateway HTTP service implementing the hyper `Service` trait.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;

use http_body_util::BodyExt;
use hyper::body::Incoming;

use crate::body::GatewayBody;
use crate::dispatch::Dispatcher;
use crate::descriptor::{ErrorConvention, ProtocolKind};
use crate::error::ServiceError;
use crate::response::error_to_response;

/// Hyper `Service` that buffers each request body and hands the request to a
/// [`Dispatcher`].
#[derive(Debug, Clone)]
pub struct GatewayService {
    dispatcher: Dispatcher,
}

impl GatewayService {
    /// Wrap a dispatcher.
    #[must_use]
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }
}

impl hyper::service::Service<http::Request<Incoming>> for GatewayService {
    type Response = http::Response<GatewayBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<Incoming>) -> Self::Future {
        let dispatcher = self.dispatcher.clone();

        Box::pin(async move {
            let (parts, incoming) = req.into_parts();
            let body = match incoming.collect().await {
                Ok(collected) => collected.to_bytes(),
                Err(e) => {
                    tracing::warn!(error = %e, "failed to read request body");
                    let err = ServiceError::internal(format!("Failed to read request body: {e}"));
                    let request_id = uuid::Uuid::new_v4().to_string();
                    return Ok(error_to_response(
                        &err,
                        ProtocolKind::RestJson,
                        ErrorConvention::for_protocol(ProtocolKind::RestJson),
                        &request_id,
                    ));
                }
            };
            Ok(dispatcher
                .dispatch(http::Request::from_parts(parts, body))
                .await)
        })
    }
}

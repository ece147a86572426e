//! Service descriptors: how a service module plugs into the gateway.
//!
//! A descriptor names the service, carries an explicit protocol tag with the
//! data that protocol routes on (a target prefix and operation set for the
//! JSON-RPC family, a URL prefix and route table for the REST family), the
//! service's error-status convention, and its handler.

use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;

use mockstack_core::ErrorKind;

use crate::body::GatewayBody;
use crate::context::RequestContext;
use crate::error::ServiceError;
use crate::router::RouteTable;

/// Future returned by [`ServiceHandler::handle`].
pub type HandlerFuture =
    Pin<Box<dyn Future<Output = Result<http::Response<GatewayBody>, ServiceError>> + Send>>;

/// Boundary between the gateway and a service module.
///
/// The handler receives the resolved operation inside the request context and
/// the raw body bytes. It owns body decoding and response encoding.
pub trait ServiceHandler: Send + Sync + 'static {
    /// Handle one resolved request.
    fn handle(&self, ctx: RequestContext, body: Bytes) -> HandlerFuture;
}

/// Wire-protocol family of a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolKind {
    /// `POST /` with `X-Amz-Target: <prefix>.<operation>`.
    JsonRpc,
    /// Operation chosen by HTTP method and path.
    RestJson,
}

impl ProtocolKind {
    /// `Content-Type` of responses in this family.
    #[must_use]
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::JsonRpc => "application/x-amz-json-1.1",
            Self::RestJson => "application/json",
        }
    }
}

/// Protocol tag plus the data that protocol routes on.
#[derive(Debug)]
pub enum Routing {
    /// JSON-RPC family.
    JsonRpc {
        /// Left part of `X-Amz-Target`.
        target_prefix: String,
        /// Operations accepted after the `.`.
        operations: HashSet<&'static str>,
    },
    /// REST family.
    RestJson {
        /// Path prefix claimed by the service.
        url_prefix: String,
        /// `(method, path)` table.
        routes: RouteTable,
    },
}

/// HTTP statuses a service uses for each error kind.
///
/// Client and internal errors are always 400 and 500. The other kinds follow
/// the emulated service: some answer not-found with 404, others with a
/// uniform 400.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorConvention {
    /// Status for [`ErrorKind::NotFound`].
    pub not_found: http::StatusCode,
    /// Status for [`ErrorKind::Conflict`].
    pub conflict: http::StatusCode,
    /// Status for [`ErrorKind::VersionConflict`].
    pub version_conflict: http::StatusCode,
}

impl ErrorConvention {
    /// Every caller-side failure is a 400.
    #[must_use]
    pub const fn uniform_bad_request() -> Self {
        Self {
            not_found: http::StatusCode::BAD_REQUEST,
            conflict: http::StatusCode::BAD_REQUEST,
            version_conflict: http::StatusCode::BAD_REQUEST,
        }
    }

    /// 404 for missing resources, 409 for conflicts.
    #[must_use]
    pub const fn distinct_statuses() -> Self {
        Self {
            not_found: http::StatusCode::NOT_FOUND,
            conflict: http::StatusCode::CONFLICT,
            version_conflict: http::StatusCode::CONFLICT,
        }
    }

    /// Override the not-found status.
    #[must_use]
    pub const fn with_not_found(mut self, status: http::StatusCode) -> Self {
        self.not_found = status;
        self
    }

    /// Default convention of a protocol family.
    #[must_use]
    pub const fn for_protocol(protocol: ProtocolKind) -> Self {
        match protocol {
            ProtocolKind::JsonRpc => Self::uniform_bad_request(),
            ProtocolKind::RestJson => Self::distinct_statuses(),
        }
    }

    /// Status for an error kind.
    #[must_use]
    pub fn status_for(&self, kind: ErrorKind) -> http::StatusCode {
        match kind {
            ErrorKind::Client => http::StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => self.not_found,
            ErrorKind::Conflict => self.conflict,
            ErrorKind::VersionConflict => self.version_conflict,
            ErrorKind::Internal => http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Everything the gateway knows about one registered service.
pub struct ServiceDescriptor {
    name: &'static str,
    routing: Routing,
    errors: ErrorConvention,
    handler: Arc<dyn ServiceHandler>,
}

impl ServiceDescriptor {
    /// Describe a JSON-RPC service.
    pub fn json_rpc(
        name: &'static str,
        target_prefix: impl Into<String>,
        operations: impl IntoIterator<Item = &'static str>,
        handler: Arc<dyn ServiceHandler>,
    ) -> Self {
        Self {
            name,
            routing: Routing::JsonRpc {
                target_prefix: target_prefix.into(),
                operations: operations.into_iter().collect(),
            },
            errors: ErrorConvention::for_protocol(ProtocolKind::JsonRpc),
            handler,
        }
    }

    /// Describe a REST service.
    pub fn rest_json(
        name: &'static str,
        url_prefix: impl Into<String>,
        routes: RouteTable,
        handler: Arc<dyn ServiceHandler>,
    ) -> Self {
        Self {
            name,
            routing: Routing::RestJson {
                url_prefix: crate::router::normalize_path(&url_prefix.into()).to_owned(),
                routes,
            },
            errors: ErrorConvention::for_protocol(ProtocolKind::RestJson),
            handler,
        }
    }

    /// Replace the protocol's default error convention.
    #[must_use]
    pub fn with_error_convention(mut self, errors: ErrorConvention) -> Self {
        self.errors = errors;
        self
    }

    /// Unique service name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Protocol family tag.
    #[must_use]
    pub fn protocol(&self) -> ProtocolKind {
        match self.routing {
            Routing::JsonRpc { .. } => ProtocolKind::JsonRpc,
            Routing::RestJson { .. } => ProtocolKind::RestJson,
        }
    }

    /// Routing data.
    #[must_use]
    pub fn routing(&self) -> &Routing {
        &self.routing
    }

    /// Target prefix, for JSON-RPC services.
    #[must_use]
    pub fn target_prefix(&self) -> Option<&str> {
        match &self.routing {
            Routing::JsonRpc { target_prefix, .. } => Some(target_prefix),
            Routing::RestJson { .. } => None,
        }
    }

    /// URL prefix, for REST services.
    #[must_use]
    pub fn url_prefix(&self) -> Option<&str> {
        match &self.routing {
            Routing::RestJson { url_prefix, .. } => Some(url_prefix),
            Routing::JsonRpc { .. } => None,
        }
    }

    /// Error-status convention.
    #[must_use]
    pub fn error_convention(&self) -> ErrorConvention {
        self.errors
    }

    /// The service's handler.
    #[must_use]
    pub fn handler(&self) -> &Arc<dyn ServiceHandler> {
        &self.handler
    }
}

impl fmt::Debug for ServiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDescriptor")
            .field("name", &self.name)
            .field("routing", &self.routing)
            .field("errors", &self.errors)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_pick_status_by_convention() {
        let json = ErrorConvention::for_protocol(ProtocolKind::JsonRpc);
        assert_eq!(json.status_for(ErrorKind::NotFound), http::StatusCode::BAD_REQUEST);
        assert_eq!(
            json.with_not_found(http::StatusCode::NOT_FOUND)
                .status_for(ErrorKind::NotFound),
            http::StatusCode::NOT_FOUND
        );

        let rest = ErrorConvention::for_protocol(ProtocolKind::RestJson);
        assert_eq!(rest.status_for(ErrorKind::NotFound), http::StatusCode::NOT_FOUND);
        assert_eq!(rest.status_for(ErrorKind::Conflict), http::StatusCode::CONFLICT);
        assert_eq!(
            rest.status_for(ErrorKind::Internal),
            http::StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(rest.status_for(ErrorKind::Client), http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_should_report_content_type_per_family() {
        assert_eq!(
            ProtocolKind::JsonRpc.content_type(),
            "application/x-amz-json-1.1"
        );
        assert_eq!(ProtocolKind::RestJson.content_type(), "application/json");
    }
}

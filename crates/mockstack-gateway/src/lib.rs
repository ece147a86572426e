//! HTTP gateway for MockStack.
//!
//! This crate multiplexes two AWS wire-protocol families onto a registry of
//! pluggable service modules:
//!
//! - **Descriptor**: how a service declares its name, protocol, routing data,
//!   error convention, and handler
//! - **Registry**: start-up table of descriptors with collision checks
//! - **Dispatcher**: resolves each request to `(service, operation)` by
//!   `X-Amz-Target` or by longest URL prefix and route table
//! - **Response helpers**: success responses and error translation
//! - **Service**: hyper `Service` implementation wrapping the dispatcher

pub mod body;
pub mod context;
pub mod descriptor;
pub mod dispatch;
pub mod error;
pub mod registry;
pub mod response;
pub mod router;
pub mod service;

pub use body::GatewayBody;
pub use context::RequestContext;
pub use descriptor::{
    ErrorConvention, HandlerFuture, ProtocolKind, Routing, ServiceDescriptor, ServiceHandler,
};
pub use dispatch::{Dispatcher, ResolvedRoute, Unresolved};
pub use error::{ServiceError, ServiceResult};
pub use registry::{RegistryError, ServiceRegistry};
pub use router::{RouteMatch, RouteTable};
pub use service::GatewayService;

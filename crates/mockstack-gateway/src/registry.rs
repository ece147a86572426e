//! Registry of service descriptors.
//!
//! The registry is filled once at start-up and then shared read-only with the
//! dispatcher, so lookups need no synchronization. Registration rejects every
//! ambiguity the dispatcher would otherwise have to resolve at request time:
//! duplicate names, shared target prefixes, shared URL prefixes, duplicate
//! routes, and routes that a nested prefix would shadow.

use std::collections::HashMap;
use std::sync::Arc;

use crate::descriptor::{Routing, ServiceDescriptor};
use crate::router::normalize_path;

/// A descriptor the registry refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Another service already uses the name.
    #[error("service {0} is already registered")]
    DuplicateName(String),
    /// Another service already claims the target prefix.
    #[error("target prefix {prefix} of {service} is already claimed by {existing}")]
    DuplicateTargetPrefix {
        /// Rejected service.
        service: String,
        /// Contested prefix.
        prefix: String,
        /// Service holding the prefix.
        existing: String,
    },
    /// Another service already claims the URL prefix.
    #[error("URL prefix {prefix} of {service} is already claimed by {existing}")]
    DuplicateUrlPrefix {
        /// Rejected service.
        service: String,
        /// Contested prefix.
        prefix: String,
        /// Service holding the prefix.
        existing: String,
    },
    /// A target prefix that is empty or contains `.`.
    #[error("invalid target prefix {prefix:?} for {service}")]
    InvalidTargetPrefix {
        /// Rejected service.
        service: String,
        /// Offending prefix.
        prefix: String,
    },
    /// A URL prefix that does not start with `/`.
    #[error("invalid URL prefix {prefix:?} for {service}")]
    InvalidUrlPrefix {
        /// Rejected service.
        service: String,
        /// Offending prefix.
        prefix: String,
    },
    /// The same `(method, path)` appears twice in one route table.
    #[error("duplicate route {route} in {service}")]
    DuplicateRoute {
        /// Rejected service.
        service: String,
        /// `METHOD /path`.
        route: String,
    },
    /// A route path outside the service's URL prefix.
    #[error("route {path} of {service} is outside its prefix {prefix}")]
    RouteOutsidePrefix {
        /// Rejected service.
        service: String,
        /// Offending path.
        path: String,
        /// The service's prefix.
        prefix: String,
    },
    /// A route that a longer prefix of another service would capture.
    #[error("route {path} of {service} is shadowed by {shadowed_by}")]
    ShadowedRoute {
        /// Service owning the unreachable route.
        service: String,
        /// Unreachable path.
        path: String,
        /// Service whose prefix captures the path.
        shadowed_by: String,
    },
}

/// Registered services, indexed for dispatch.
#[derive(Debug, Default)]
pub struct ServiceRegistry {
    /// Registration order, used for health reporting.
    services: Vec<Arc<ServiceDescriptor>>,
    by_name: HashMap<&'static str, Arc<ServiceDescriptor>>,
    by_target: HashMap<String, Arc<ServiceDescriptor>>,
    by_prefix: HashMap<String, Arc<ServiceDescriptor>>,
}

impl ServiceRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a service.
    ///
    /// # Errors
    /// Returns a [`RegistryError`] and leaves the registry unchanged when the
    /// descriptor collides with a registered service or is malformed.
    pub fn register(&mut self, descriptor: ServiceDescriptor) -> Result<(), RegistryError> {
        let name = descriptor.name();
        if self.by_name.contains_key(name) {
            return Err(RegistryError::DuplicateName(name.to_owned()));
        }

        match descriptor.routing() {
            Routing::JsonRpc { target_prefix, .. } => {
                self.check_target_prefix(name, target_prefix)?;
            }
            Routing::RestJson { url_prefix, routes } => {
                self.check_url_prefix(name, url_prefix)?;
                if let Some(route) = routes.duplicates().first() {
                    return Err(RegistryError::DuplicateRoute {
                        service: name.to_owned(),
                        route: route.clone(),
                    });
                }
                if let Some(path) = routes.paths().find(|p| !is_under(p, url_prefix)) {
                    return Err(RegistryError::RouteOutsidePrefix {
                        service: name.to_owned(),
                        path: path.to_owned(),
                        prefix: url_prefix.clone(),
                    });
                }
            }
        }

        let descriptor = Arc::new(descriptor);
        match descriptor.routing() {
            Routing::JsonRpc { target_prefix, .. } => {
                self.by_target
                    .insert(target_prefix.clone(), Arc::clone(&descriptor));
            }
            Routing::RestJson { url_prefix, .. } => {
                self.by_prefix
                    .insert(url_prefix.clone(), Arc::clone(&descriptor));
                if let Err(err) = self.check_shadowing() {
                    self.by_prefix.remove(url_prefix);
                    return Err(err);
                }
            }
        }

        tracing::info!(
            service = name,
            protocol = ?descriptor.protocol(),
            target_prefix = descriptor.target_prefix(),
            url_prefix = descriptor.url_prefix(),
            "registered service"
        );
        self.by_name.insert(name, Arc::clone(&descriptor));
        self.services.push(descriptor);
        Ok(())
    }

    /// Look up a service by name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Arc<ServiceDescriptor>> {
        self.by_name.get(name)
    }

    /// Look up a JSON-RPC service by its `X-Amz-Target` prefix.
    #[must_use]
    pub fn lookup_by_target_prefix(&self, prefix: &str) -> Option<&Arc<ServiceDescriptor>> {
        self.by_target.get(prefix)
    }

    /// Look up a REST service by its exact URL prefix.
    #[must_use]
    pub fn lookup_by_url_prefix(&self, prefix: &str) -> Option<&Arc<ServiceDescriptor>> {
        self.by_prefix.get(normalize_path(prefix))
    }

    /// The REST service with the longest URL prefix covering `path`.
    ///
    /// Walks `path` upward one segment at a time, one hash lookup per step.
    #[must_use]
    pub fn longest_prefix_match(&self, path: &str) -> Option<&Arc<ServiceDescriptor>> {
        let mut candidate = normalize_path(path);
        loop {
            if let Some(descriptor) = self.by_prefix.get(candidate) {
                return Some(descriptor);
            }
            match candidate.rfind('/') {
                Some(0) if candidate.len() > 1 => candidate = "/",
                Some(idx) if idx > 0 => candidate = &candidate[..idx],
                _ => return None,
            }
        }
    }

    /// Registered services in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ServiceDescriptor>> {
        self.services.iter()
    }

    /// Registered service names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.services.iter().map(|s| s.name())
    }

    /// Number of registered services.
    #[must_use]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Whether no service is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    fn check_target_prefix(&self, name: &str, prefix: &str) -> Result<(), RegistryError> {
        if prefix.is_empty() || prefix.contains('.') {
            return Err(RegistryError::InvalidTargetPrefix {
                service: name.to_owned(),
                prefix: prefix.to_owned(),
            });
        }
        if let Some(existing) = self.by_target.get(prefix) {
            return Err(RegistryError::DuplicateTargetPrefix {
                service: name.to_owned(),
                prefix: prefix.to_owned(),
                existing: existing.name().to_owned(),
            });
        }
        Ok(())
    }

    fn check_url_prefix(&self, name: &str, prefix: &str) -> Result<(), RegistryError> {
        if !prefix.starts_with('/') {
            return Err(RegistryError::InvalidUrlPrefix {
                service: name.to_owned(),
                prefix: prefix.to_owned(),
            });
        }
        if let Some(existing) = self.by_prefix.get(prefix) {
            return Err(RegistryError::DuplicateUrlPrefix {
                service: name.to_owned(),
                prefix: prefix.to_owned(),
                existing: existing.name().to_owned(),
            });
        }
        Ok(())
    }

    /// Every REST route must resolve to its own service by longest prefix.
    ///
    /// A templated route also claims every path its parameters can take, so
    /// no other prefix may sit below the literal part of the template.
    fn check_shadowing(&self) -> Result<(), RegistryError> {
        for (own_prefix, descriptor) in &self.by_prefix {
            let Routing::RestJson { routes, .. } = descriptor.routing() else {
                continue;
            };
            for path in routes.paths() {
                let owner = self
                    .longest_prefix_match(path)
                    .filter(|owner| owner.name() != descriptor.name())
                    .or_else(|| {
                        let stem = template_stem(path)?;
                        self.by_prefix
                            .iter()
                            .find(|(prefix, _)| *prefix != own_prefix && is_under(prefix, stem))
                            .map(|(_, other)| other)
                    });
                if let Some(owner) = owner {
                    return Err(RegistryError::ShadowedRoute {
                        service: descriptor.name().to_owned(),
                        path: path.to_owned(),
                        shadowed_by: owner.name().to_owned(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Literal part of a templated path, up to its first `{param}` segment.
fn template_stem(path: &str) -> Option<&str> {
    let idx = path.find("/{")?;
    Some(if idx == 0 { "/" } else { &path[..idx] })
}

fn is_under(path: &str, prefix: &str) -> bool {
    prefix == "/"
        || path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bytes::Bytes;
    use http::Method;

    use super::*;
    use crate::context::RequestContext;
    use crate::descriptor::{HandlerFuture, ServiceHandler};
    use crate::error::ServiceError;
    use crate::router::RouteTable;

    struct Noop;

    impl ServiceHandler for Noop {
        fn handle(&self, _ctx: RequestContext, _body: Bytes) -> HandlerFuture {
            Box::pin(async { Err(ServiceError::internal("unused")) })
        }
    }

    fn rpc(name: &'static str, prefix: &str) -> ServiceDescriptor {
        ServiceDescriptor::json_rpc(name, prefix, ["CreateTopic"], Arc::new(Noop))
    }

    fn rest(name: &'static str, prefix: &str, routes: RouteTable) -> ServiceDescriptor {
        ServiceDescriptor::rest_json(name, prefix, routes, Arc::new(Noop))
    }

    #[test]
    fn test_should_register_and_look_up_services() {
        let mut registry = ServiceRegistry::new();
        registry.register(rpc("sns", "AmazonSNS")).unwrap();
        registry
            .register(rest(
                "batch",
                "/v1",
                RouteTable::new().route(Method::POST, "/v1/createjobqueue", "CreateJobQueue"),
            ))
            .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.lookup("sns").unwrap().name(), "sns");
        assert_eq!(
            registry.lookup_by_target_prefix("AmazonSNS").unwrap().name(),
            "sns"
        );
        assert_eq!(registry.lookup_by_url_prefix("/v1/").unwrap().name(), "batch");
        assert!(registry.lookup("ecs").is_none());
        assert_eq!(registry.names().collect::<Vec<_>>(), ["sns", "batch"]);
    }

    #[test]
    fn test_should_reject_duplicate_name() {
        let mut registry = ServiceRegistry::new();
        registry.register(rpc("sns", "AmazonSNS")).unwrap();
        assert_eq!(
            registry.register(rpc("sns", "Other")),
            Err(RegistryError::DuplicateName("sns".to_owned()))
        );
        assert!(registry.lookup_by_target_prefix("Other").is_none());
    }

    #[test]
    fn test_should_reject_shared_target_prefix() {
        let mut registry = ServiceRegistry::new();
        registry.register(rpc("sns", "AmazonSNS")).unwrap();
        let err = registry.register(rpc("sns2", "AmazonSNS")).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateTargetPrefix { .. }));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_should_reject_malformed_target_prefix() {
        let mut registry = ServiceRegistry::new();
        assert!(matches!(
            registry.register(rpc("a", "Has.Dot")),
            Err(RegistryError::InvalidTargetPrefix { .. })
        ));
        assert!(matches!(
            registry.register(rpc("b", "")),
            Err(RegistryError::InvalidTargetPrefix { .. })
        ));
    }

    #[test]
    fn test_should_reject_shared_url_prefix() {
        let mut registry = ServiceRegistry::new();
        registry.register(rest("a", "/v1", RouteTable::new())).unwrap();
        assert!(matches!(
            registry.register(rest("b", "/v1/", RouteTable::new())),
            Err(RegistryError::DuplicateUrlPrefix { .. })
        ));
        assert!(matches!(
            registry.register(rest("c", "v2", RouteTable::new())),
            Err(RegistryError::InvalidUrlPrefix { .. })
        ));
    }

    #[test]
    fn test_should_reject_bad_route_tables() {
        let mut registry = ServiceRegistry::new();
        let dup = RouteTable::new()
            .route(Method::POST, "/v1/a", "A")
            .route(Method::POST, "/v1/a", "B");
        assert!(matches!(
            registry.register(rest("a", "/v1", dup)),
            Err(RegistryError::DuplicateRoute { .. })
        ));

        let outside = RouteTable::new().route(Method::POST, "/v10/a", "A");
        assert!(matches!(
            registry.register(rest("a", "/v1", outside)),
            Err(RegistryError::RouteOutsidePrefix { .. })
        ));
    }

    #[test]
    fn test_should_reject_prefix_that_shadows_existing_routes() {
        let mut registry = ServiceRegistry::new();
        registry
            .register(rest(
                "outer",
                "/v1",
                RouteTable::new().route(Method::GET, "/v1/inner/list", "List"),
            ))
            .unwrap();
        let err = registry
            .register(rest("inner", "/v1/inner", RouteTable::new()))
            .unwrap_err();
        assert!(matches!(err, RegistryError::ShadowedRoute { .. }));
        assert!(registry.lookup_by_url_prefix("/v1/inner").is_none());

        registry
            .register(rest(
                "nested",
                "/v1/nested",
                RouteTable::new().route(Method::GET, "/v1/nested/x", "X"),
            ))
            .unwrap();
    }

    #[test]
    fn test_should_reject_prefix_inside_templated_route() {
        let mut registry = ServiceRegistry::new();
        registry
            .register(rest(
                "outer",
                "/v1",
                RouteTable::new().route(Method::GET, "/v1/tags/{resourceArn}", "ListTags"),
            ))
            .unwrap();

        let err = registry
            .register(rest("inner", "/v1/tags/special", RouteTable::new()))
            .unwrap_err();
        assert!(matches!(err, RegistryError::ShadowedRoute { .. }));
        assert!(registry.lookup_by_url_prefix("/v1/tags/special").is_none());
        assert_eq!(
            registry.longest_prefix_match("/v1/tags/special").map(|d| d.name()),
            Some("outer")
        );

        registry
            .register(rest("sibling", "/v1/jobs", RouteTable::new()))
            .unwrap();
    }

    #[test]
    fn test_should_reject_template_over_existing_nested_prefix() {
        let mut registry = ServiceRegistry::new();
        registry
            .register(rest("inner", "/v1/tags/special", RouteTable::new()))
            .unwrap();

        let err = registry
            .register(rest(
                "outer",
                "/v1",
                RouteTable::new().route(Method::GET, "/v1/tags/{resourceArn}", "ListTags"),
            ))
            .unwrap_err();
        assert!(matches!(err, RegistryError::ShadowedRoute { .. }));
        assert!(registry.lookup_by_url_prefix("/v1").is_none());
    }

    #[test]
    fn test_should_match_longest_prefix() {
        let mut registry = ServiceRegistry::new();
        registry.register(rest("outer", "/v1", RouteTable::new())).unwrap();
        registry
            .register(rest("inner", "/v1/jobs", RouteTable::new()))
            .unwrap();

        let name = |p: &str| registry.longest_prefix_match(p).map(|d| d.name());
        assert_eq!(name("/v1/jobs/submit"), Some("inner"));
        assert_eq!(name("/v1/jobs"), Some("inner"));
        assert_eq!(name("/v1/jobsx"), Some("outer"));
        assert_eq!(name("/v1"), Some("outer"));
        assert_eq!(name("/v2/anything"), None);
        assert_eq!(name("/"), None);
    }

    #[test]
    fn test_should_fall_back_to_root_prefix() {
        let mut registry = ServiceRegistry::new();
        registry.register(rest("root", "/", RouteTable::new())).unwrap();
        assert_eq!(
            registry.longest_prefix_match("/bucket/key").map(|d| d.name()),
            Some("root")
        );
        assert_eq!(registry.longest_prefix_match("/").map(|d| d.name()), Some("root"));
    }
}

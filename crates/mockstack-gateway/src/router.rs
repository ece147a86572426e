//! REST route tables.
//!
//! A [`RouteTable`] maps `(method, path)` to an operation name. Literal paths
//! are resolved with a single hash lookup; templated paths with `{param}`
//! segments are tried only after the literal lookup misses:
//!
//! ```text
//! POST /v1/createcomputeenvironment   -> CreateComputeEnvironment
//! GET  /v1/tags/{resourceArn}         -> ListTagsForResource
//! ```

use std::collections::{HashMap, HashSet};

use http::Method;
use percent_encoding::percent_decode_str;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

#[derive(Debug, Clone)]
struct Template {
    method: Method,
    path: String,
    segments: Vec<Segment>,
    operation: &'static str,
}

/// A matched route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    /// Operation name.
    pub operation: &'static str,
    /// Percent-decoded values of `{param}` segments.
    pub params: HashMap<String, String>,
}

/// `(method, path)` to operation table of a REST service.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    literal: HashMap<(Method, String), &'static str>,
    templates: Vec<Template>,
    duplicates: Vec<String>,
}

impl RouteTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a route. Paths are absolute and include the service's URL prefix.
    ///
    /// A repeated `(method, path)` pair is remembered and rejected when the
    /// owning service is registered.
    #[must_use]
    pub fn route(mut self, method: Method, path: &str, operation: &'static str) -> Self {
        let path = normalize_path(path).to_owned();
        let signature = format!("{method} {path}");

        if path.contains('{') {
            let segments = split_segments(&path)
                .map(|s| match s.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                    Some(name) => Segment::Param(name.to_owned()),
                    None => Segment::Literal(s.to_owned()),
                })
                .collect::<Vec<_>>();
            let shape = segment_shape(&segments);
            if self
                .templates
                .iter()
                .any(|t| t.method == method && segment_shape(&t.segments) == shape)
            {
                self.duplicates.push(signature);
            } else {
                self.templates.push(Template {
                    method,
                    path,
                    segments,
                    operation,
                });
            }
        } else if self
            .literal
            .insert((method, path), operation)
            .is_some()
        {
            self.duplicates.push(signature);
        }
        self
    }

    /// Resolve a request path to an operation.
    #[must_use]
    pub fn resolve(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        let path = normalize_path(path);

        if let Some(operation) = self.literal.get(&(method.clone(), path.to_owned())) {
            return Some(RouteMatch {
                operation: *operation,
                params: HashMap::new(),
            });
        }

        let request: Vec<&str> = split_segments(path).collect();
        self.templates
            .iter()
            .filter(|t| t.method == *method && t.segments.len() == request.len())
            .find_map(|t| match_template(t, &request))
    }

    /// Every route path, for prefix validation.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.literal
            .keys()
            .map(|(_, p)| p.as_str())
            .chain(self.templates.iter().map(|t| t.path.as_str()))
    }

    /// Routes added more than once, as `METHOD /path`.
    #[must_use]
    pub fn duplicates(&self) -> &[String] {
        &self.duplicates
    }

    /// Distinct operation names in the table.
    #[must_use]
    pub fn operations(&self) -> HashSet<&'static str> {
        self.literal
            .values()
            .copied()
            .chain(self.templates.iter().map(|t| t.operation))
            .collect()
    }

    /// Number of routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.literal.len() + self.templates.len()
    }

    /// Whether the table has no routes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Strip a trailing `/` from everything but the root path.
#[must_use]
pub fn normalize_path(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}

fn split_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Template shape with parameter names erased, for duplicate detection.
fn segment_shape(segments: &[Segment]) -> Vec<Option<&str>> {
    segments
        .iter()
        .map(|s| match s {
            Segment::Literal(l) => Some(l.as_str()),
            Segment::Param(_) => None,
        })
        .collect()
}

fn match_template(template: &Template, request: &[&str]) -> Option<RouteMatch> {
    let mut params = HashMap::new();
    for (segment, actual) in template.segments.iter().zip(request) {
        match segment {
            Segment::Literal(expected) if expected == actual => {}
            Segment::Literal(_) => return None,
            Segment::Param(name) => {
                let value = percent_decode_str(actual).decode_utf8_lossy().into_owned();
                params.insert(name.clone(), value);
            }
        }
    }
    Some(RouteMatch {
        operation: template.operation,
        params,
    })
}

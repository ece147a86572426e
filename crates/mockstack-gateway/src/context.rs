//! Per-request context handed to service handlers.

use std::collections::HashMap;

use mockstack_core::{AccountId, AwsRegion};

use crate::descriptor::ProtocolKind;

/// Everything the dispatcher resolved about one request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Synthesized request id, echoed as `x-amzn-RequestId`.
    pub request_id: String,
    /// Name of the resolved service.
    pub service: &'static str,
    /// Name of the resolved operation.
    pub operation: &'static str,
    /// Protocol family the request arrived through.
    pub protocol: ProtocolKind,
    /// HTTP method.
    pub method: http::Method,
    /// Request path, without the query string.
    pub path: String,
    /// Percent-decoded `{param}` values from the matched route.
    pub path_params: HashMap<String, String>,
    /// Decoded query string pairs, in request order.
    pub query: Vec<(String, String)>,
    /// Request headers.
    pub headers: http::HeaderMap,
    /// Account the request acts on.
    pub account: AccountId,
    /// Region the request targets.
    pub region: AwsRegion,
}

impl RequestContext {
    /// Value of a `{param}` path segment.
    #[must_use]
    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name).map(String::as_str)
    }

    /// First value of a query parameter.
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Every value of a repeated query parameter.
    pub fn query_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> {
        self.query
            .iter()
            .filter(move |(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// A header value, if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Decode a raw query string into pairs.
pub(crate) fn parse_query(query: Option<&str>) -> Vec<(String, String)> {
    query
        .map(|q| {
            form_urlencoded::parse(q.as_bytes())
                .into_owned()
                .collect()
        })
        .unwrap_or_default()
}

/// Region from the SigV4 credential scope, else the fallback.
pub(crate) fn region_from_headers(headers: &http::HeaderMap, fallback: &AwsRegion) -> AwsRegion {
    headers
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(AwsRegion::from_authorization)
        .unwrap_or_else(|| fallback.clone())
}

//! Per-request routing input.
//!
//! A [`RequestContext`] captures exactly what the routing decision depends
//! on: the raw `Host` header, the full request URL, and the path and query.
//! It is built once per request and never mutated.

use axum::http::{header, HeaderMap, Uri};
use serde::Serialize;

use crate::security::headers::X_FORWARDED_PROTO;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestContext {
    /// Raw `Host` header value, possibly with a port. Empty when absent.
    pub host: String,
    /// Full request URL, e.g. `http://acme.localhost:3000/gallery?page=2`.
    pub url: String,
    /// URL path component.
    pub path: String,
    /// Query string without the leading `?`.
    pub query: Option<String>,
}

impl RequestContext {
    /// Build a context from explicit values. The URL is assembled from the
    /// scheme, host and path/query.
    pub fn new(scheme: &str, host: &str, path_and_query: &str) -> Self {
        let (path, query) = split_path_and_query(path_and_query);
        Self {
            host: host.to_string(),
            url: format!("{}://{}{}", scheme, host, path_and_query),
            path,
            query,
        }
    }

    /// Build a context from an inbound request's URI and headers.
    ///
    /// Requests in absolute form carry the URL in the request line; for the
    /// usual origin form the URL is reconstructed from the scheme (taken from
    /// `X-Forwarded-Proto`, else `default_scheme`) and the `Host` header.
    /// Only `http` and `https` are accepted as schemes from the client.
    pub fn from_parts(uri: &Uri, headers: &HeaderMap, default_scheme: &str) -> Self {
        let host = headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .or_else(|| uri.authority().map(|a| a.as_str().to_string()))
            .unwrap_or_default();

        let path = uri.path().to_string();
        let query = uri.query().map(str::to_string);

        let is_absolute =
            uri.scheme_str().and_then(web_scheme).is_some() && uri.authority().is_some();
        let url = if is_absolute {
            uri.to_string()
        } else {
            let scheme = headers
                .get(&X_FORWARDED_PROTO)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(',').next())
                .and_then(web_scheme)
                .unwrap_or(default_scheme);
            let path_and_query = uri
                .path_and_query()
                .map(|pq| pq.as_str())
                .unwrap_or("/");
            format!("{}://{}{}", scheme, host, path_and_query)
        };

        Self {
            host,
            url,
            path,
            query,
        }
    }

    /// Path followed by `?query` when a query is present.
    pub fn path_and_query(&self) -> String {
        match &self.query {
            Some(q) => format!("{}?{}", self.path, q),
            None => self.path.clone(),
        }
    }
}

/// Normalize a client-supplied scheme, accepting only `http` and `https`.
fn web_scheme(scheme: &str) -> Option<&'static str> {
    let scheme = scheme.trim();
    if scheme.eq_ignore_ascii_case("https") {
        Some("https")
    } else if scheme.eq_ignore_ascii_case("http") {
        Some("http")
    } else {
        None
    }
}

fn split_path_and_query(path_and_query: &str) -> (String, Option<String>) {
    match path_and_query.split_once('?') {
        Some((path, query)) => (path.to_string(), Some(query.to_string())),
        None => (path_and_query.to_string(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_origin_form_uses_host_header() {
        let uri: Uri = "/gallery?page=2".parse().unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("acme.localhost:3000"));

        let ctx = RequestContext::from_parts(&uri, &headers, "http");

        assert_eq!(ctx.host, "acme.localhost:3000");
        assert_eq!(ctx.url, "http://acme.localhost:3000/gallery?page=2");
        assert_eq!(ctx.path, "/gallery");
        assert_eq!(ctx.query.as_deref(), Some("page=2"));
    }

    #[test]
    fn test_forwarded_proto_wins_over_default() {
        let uri: Uri = "/generate".parse().unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("acme.example.com"));
        headers.insert(X_FORWARDED_PROTO, HeaderValue::from_static("https, http"));

        let ctx = RequestContext::from_parts(&uri, &headers, "http");
        assert_eq!(ctx.url, "https://acme.example.com/generate");
    }

    #[test]
    fn test_absolute_form() {
        let uri: Uri = "http://acme.example.com/x?y=1".parse().unwrap();
        let ctx = RequestContext::from_parts(&uri, &HeaderMap::new(), "https");

        assert_eq!(ctx.host, "acme.example.com");
        assert_eq!(ctx.url, "http://acme.example.com/x?y=1");
    }

    #[test]
    fn test_missing_host_is_empty() {
        let uri: Uri = "/".parse().unwrap();
        let ctx = RequestContext::from_parts(&uri, &HeaderMap::new(), "http");

        assert_eq!(ctx.host, "");
        assert_eq!(ctx.url, "http:///");
    }

    #[test]
    fn test_new_splits_query() {
        let ctx = RequestContext::new("https", "example.com", "/pricing?plan=pro");

        assert_eq!(ctx.path, "/pricing");
        assert_eq!(ctx.path_and_query(), "/pricing?plan=pro");
        assert_eq!(ctx.url, "https://example.com/pricing?plan=pro");
    }

    #[test]
    fn test_unknown_forwarded_proto_falls_back_to_default() {
        let uri: Uri = "/generate".parse().unwrap();
        for proto in ["localhost", "http://127.0.0.1", "", "ftp"] {
            let mut headers = HeaderMap::new();
            headers.insert(header::HOST, HeaderValue::from_static("acme.example.com"));
            headers.insert(X_FORWARDED_PROTO, HeaderValue::from_str(proto).unwrap());

            let ctx = RequestContext::from_parts(&uri, &headers, "https");
            assert_eq!(ctx.url, "https://acme.example.com/generate", "{proto}");
        }
    }

    #[test]
    fn test_forwarded_proto_is_case_insensitive() {
        let uri: Uri = "/".parse().unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("example.com"));
        headers.insert(X_FORWARDED_PROTO, HeaderValue::from_static("HTTPS"));

        let ctx = RequestContext::from_parts(&uri, &headers, "http");
        assert_eq!(ctx.url, "https://example.com/");
    }
}

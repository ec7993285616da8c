//! Header manipulation for forwarded requests.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers before forwarding
//! - Add X-Forwarded-Host and X-Forwarded-Proto
//! - Replace any client-supplied tenant header with the resolved one
//!
//! # Design Decisions
//! - Existing X-Forwarded-* from upstream load balancers are preserved
//! - The tenant header is always overwritten or removed, never trusted

use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};

pub const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");
pub const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");
pub const X_ORIGINAL_URL: HeaderName = HeaderName::from_static("x-original-url");

static HOP_BY_HOP: [HeaderName; 6] = [
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::UPGRADE,
];

/// Remove hop-by-hop headers, including any listed in `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in listed.iter().chain(HOP_BY_HOP.iter()) {
        headers.remove(name);
    }
    headers.remove("keep-alive");
    headers.remove("proxy-connection");
}

/// Add forwarding headers unless an outer proxy already set them.
pub fn add_forwarded(headers: &mut HeaderMap, host: &str, scheme: &str) {
    if !headers.contains_key(&X_FORWARDED_HOST) {
        if let Ok(value) = HeaderValue::from_str(host) {
            headers.insert(X_FORWARDED_HOST, value);
        }
    }
    if !headers.contains_key(&X_FORWARDED_PROTO) {
        if let Ok(value) = HeaderValue::from_str(scheme) {
            headers.insert(X_FORWARDED_PROTO, value);
        }
    }
}

/// Set the tenant header to the resolved label, or drop it when the request
/// has no tenant.
pub fn set_tenant(headers: &mut HeaderMap, name: &HeaderName, subdomain: Option<&str>) {
    headers.remove(name);
    if let Some(value) = subdomain.and_then(|s| HeaderValue::from_str(s).ok()) {
        headers.insert(name.clone(), value);
    }
}

//! Error responses produced by the router itself.
//!
//! # Responsibilities
//! - Map router and upstream failures to HTTP status codes
//! - Render a structured JSON error body
//! - Turn an auth rejection into a sign-in redirect or a 401
//!
//! # Design Decisions
//! - Only browser navigations (Accept: text/html) are redirected to sign-in;
//!   API clients get a 401 they can act on
//! - The redirect carries the original client-visible URL, never the
//!   rewritten internal path

use axum::{
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;
use url::Url;

use crate::routing::RequestContext;
use crate::security::AuthRejection;

/// Failures surfaced to clients.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("Authentication required: {0}")]
    Unauthorized(#[from] AuthRejection),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Upstream request failed")]
    BadGateway,

    #[error("Internal router error: {0}")]
    Internal(String),
}

/// Structured error body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ProxyError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ProxyError::Unauthorized(_) => "UNAUTHORIZED",
            ProxyError::BadRequest(_) => "BAD_REQUEST",
            ProxyError::BadGateway => "BAD_GATEWAY",
            ProxyError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ProxyError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ProxyError::BadGateway => StatusCode::BAD_GATEWAY,
            ProxyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_body(&self, request_id: Option<&str>) -> ErrorResponse {
        ErrorResponse {
            error: self.error_code().to_string(),
            message: self.to_string(),
            request_id: request_id.map(str::to_string),
        }
    }

    /// Render with the request id echoed in the body.
    pub fn into_response_with_id(self, request_id: Option<&str>) -> Response {
        let mut response = (self.status_code(), Json(self.to_body(request_id))).into_response();
        if matches!(self, ProxyError::Unauthorized(_)) {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        self.into_response_with_id(None)
    }
}

/// Whether the client is a browser asking for a page.
pub fn accepts_html(headers: &HeaderMap) -> bool {
    headers
        .get_all(header::ACCEPT)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.contains("text/html"))
}

/// Sign-in URL with the original request URL as `redirect_url`.
pub fn sign_in_redirect_url(sign_in: &Url, ctx: &RequestContext) -> Url {
    let mut url = sign_in.clone();
    url.query_pairs_mut().append_pair("redirect_url", &ctx.url);
    url
}

/// Response for a request the auth gate rejected.
pub fn auth_failure_response(
    rejection: AuthRejection,
    ctx: &RequestContext,
    headers: &HeaderMap,
    sign_in: Option<&Url>,
    request_id: Option<&str>,
) -> Response {
    match sign_in {
        Some(sign_in) if accepts_html(headers) => {
            Redirect::temporary(sign_in_redirect_url(sign_in, ctx).as_str()).into_response()
        }
        _ => ProxyError::Unauthorized(rejection).into_response_with_id(request_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> RequestContext {
        RequestContext::new("https", "acme.example.com", "/generate?style=anime")
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ProxyError::Unauthorized(AuthRejection::MissingCredentials).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ProxyError::BadGateway.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(ProxyError::BadGateway.error_code(), "BAD_GATEWAY");
    }

    #[test]
    fn test_body_includes_request_id() {
        let body = ProxyError::BadGateway.to_body(Some("req-1"));
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["error"], "BAD_GATEWAY");
        assert_eq!(json["request_id"], "req-1");

        let json = serde_json::to_value(ProxyError::BadGateway.to_body(None)).unwrap();
        assert!(json.get("request_id").is_none());
    }

    #[test]
    fn test_browser_is_redirected_to_sign_in() {
        let sign_in = Url::parse("https://example.com/sign-in").unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("text/html,application/xhtml+xml"));

        let response = auth_failure_response(
            AuthRejection::MissingCredentials,
            &ctx(),
            &headers,
            Some(&sign_in),
            None,
        );

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        let location = response.headers().get(header::LOCATION).unwrap().to_str().unwrap();
        let location = Url::parse(location).unwrap();
        let redirect = location
            .query_pairs()
            .find(|(k, _)| k == "redirect_url")
            .map(|(_, v)| v.into_owned());
        assert_eq!(
            redirect.as_deref(),
            Some("https://acme.example.com/generate?style=anime")
        );
    }

    #[test]
    fn test_api_client_gets_401() {
        let sign_in = Url::parse("https://example.com/sign-in").unwrap();
        let response = auth_failure_response(
            AuthRejection::InvalidCredentials,
            &ctx(),
            &HeaderMap::new(),
            Some(&sign_in),
            Some("req-9"),
        );

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers().get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");
    }
}

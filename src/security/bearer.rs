//! Static token gate.
//!
//! Accepts a request when it presents one of the configured tokens, either
//! as `Authorization: Bearer <token>` or as the value of the session cookie.

use axum::http::{header, HeaderMap};
use subtle::ConstantTimeEq;

use crate::routing::context::RequestContext;
use crate::security::access_control::{AuthFuture, AuthGate, AuthRejection};

#[derive(Clone)]
pub struct BearerGate {
    tokens: Vec<String>,
    session_cookie: String,
}

// Tokens stay out of debug output.
impl std::fmt::Debug for BearerGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerGate")
            .field("tokens", &self.tokens.len())
            .field("session_cookie", &self.session_cookie)
            .finish()
    }
}

impl BearerGate {
    pub fn new(tokens: Vec<String>, session_cookie: String) -> Self {
        Self {
            tokens: tokens.into_iter().filter(|t| !t.is_empty()).collect(),
            session_cookie,
        }
    }

    fn check(&self, headers: &HeaderMap) -> Result<(), AuthRejection> {
        let presented = bearer_token(headers).or_else(|| cookie_value(headers, &self.session_cookie));

        let Some(token) = presented else {
            return Err(AuthRejection::MissingCredentials);
        };

        if self.tokens.iter().any(|t| constant_time_eq(t, token)) {
            Ok(())
        } else {
            Err(AuthRejection::InvalidCredentials)
        }
    }
}

impl AuthGate for BearerGate {
    fn protect<'a>(&'a self, ctx: &'a RequestContext, headers: &'a HeaderMap) -> AuthFuture<'a> {
        let result = self.check(headers);
        if let Err(ref rejection) = result {
            tracing::debug!(host = %ctx.host, path = %ctx.path, reason = rejection.reason(), "Bearer check failed");
        }
        Box::pin(async move { result })
    }
}

/// Token from an `Authorization: Bearer ...` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Value of a named cookie across all `Cookie` headers.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
        .filter(|v| !v.is_empty())
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn gate() -> BearerGate {
        BearerGate::new(vec!["secret-1".into(), "".into()], "__session".into())
    }

    fn ctx() -> RequestContext {
        RequestContext::new("https", "acme.example.com", "/generate")
    }

    #[tokio::test]
    async fn test_bearer_header_accepted() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer secret-1"));

        assert_eq!(gate().protect(&ctx(), &headers).await, Ok(()));
    }

    #[tokio::test]
    async fn test_session_cookie_accepted() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; __session=secret-1"),
        );

        assert_eq!(gate().protect(&ctx(), &headers).await, Ok(()));
    }

    #[tokio::test]
    async fn test_missing_credentials() {
        assert_eq!(
            gate().protect(&ctx(), &HeaderMap::new()).await,
            Err(AuthRejection::MissingCredentials)
        );
    }

    #[tokio::test]
    async fn test_wrong_token() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer secret-2"));

        assert_eq!(
            gate().protect(&ctx(), &headers).await,
            Err(AuthRejection::InvalidCredentials)
        );
    }

    #[test]
    fn test_empty_configured_token_never_matches() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("__session="));
        assert_eq!(gate().check(&headers), Err(AuthRejection::MissingCredentials));
    }

    #[test]
    fn test_cookie_value_parsing() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("a=1"));
        headers.append(header::COOKIE, HeaderValue::from_static("b=2; c=x=y"));

        assert_eq!(cookie_value(&headers, "b"), Some("2"));
        assert_eq!(cookie_value(&headers, "c"), Some("x=y"));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }
}

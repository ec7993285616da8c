//! Remote verification gate.
//!
//! Delegates the decision to an external auth provider: the request's
//! credentials (`Authorization` and `Cookie`) are sent to `verify_url` and a
//! 2xx answer authenticates the request. Transport failures reject the
//! request.

use std::time::Duration;

use axum::http::{header, HeaderMap, StatusCode};

use crate::routing::context::RequestContext;
use crate::security::access_control::{AuthFuture, AuthGate, AuthRejection};
use crate::security::headers::{X_FORWARDED_HOST, X_ORIGINAL_URL};

#[derive(Debug, Clone)]
pub struct RemoteGate {
    client: reqwest::Client,
    verify_url: String,
}

impl RemoteGate {
    pub fn new(verify_url: String, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;
        Ok(Self { client, verify_url })
    }

    async fn verify(&self, ctx: &RequestContext, headers: &HeaderMap) -> Result<(), AuthRejection> {
        let mut forwarded = HeaderMap::new();
        for name in [header::AUTHORIZATION, header::COOKIE] {
            for value in headers.get_all(&name) {
                forwarded.append(name.clone(), value.clone());
            }
        }
        if let Ok(value) = ctx.host.parse() {
            forwarded.insert(X_FORWARDED_HOST, value);
        }
        if let Ok(value) = ctx.url.parse() {
            forwarded.insert(X_ORIGINAL_URL, value);
        }

        let response = self
            .client
            .get(&self.verify_url)
            .headers(forwarded)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, url = %self.verify_url, "Auth provider request failed");
                AuthRejection::Unavailable(e.to_string())
            })?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Err(AuthRejection::Denied(status.as_u16()))
        } else {
            tracing::warn!(status = %status, url = %self.verify_url, "Unexpected auth provider status");
            Err(AuthRejection::Unavailable(format!("unexpected status {}", status)))
        }
    }
}

impl AuthGate for RemoteGate {
    fn protect<'a>(&'a self, ctx: &'a RequestContext, headers: &'a HeaderMap) -> AuthFuture<'a> {
        Box::pin(self.verify(ctx, headers))
    }
}

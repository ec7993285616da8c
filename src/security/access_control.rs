//! Auth gate contract.
//!
//! The router asks an [`AuthGate`] to protect a request whenever the request
//! targets a tenant or a non-public path. A gate either lets the request
//! continue or returns an [`AuthRejection`], which ends routing for that
//! request.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::http::HeaderMap;

use crate::config::{AuthConfig, AuthMode};
use crate::routing::context::RequestContext;
use crate::security::bearer::BearerGate;
use crate::security::remote::RemoteGate;

/// Boxed future returned by [`AuthGate::protect`].
pub type AuthFuture<'a> = Pin<Box<dyn Future<Output = Result<(), AuthRejection>> + Send + 'a>>;

/// External authentication collaborator.
pub trait AuthGate: Send + Sync + std::fmt::Debug {
    /// Succeeds when the request is authenticated.
    fn protect<'a>(&'a self, ctx: &'a RequestContext, headers: &'a HeaderMap) -> AuthFuture<'a>;
}

/// Why a request failed authentication.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthRejection {
    #[error("missing credentials")]
    MissingCredentials,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("auth provider denied the request with status {0}")]
    Denied(u16),

    #[error("auth provider unavailable: {0}")]
    Unavailable(String),
}

impl AuthRejection {
    /// Short label used in logs and metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            AuthRejection::MissingCredentials => "missing_credentials",
            AuthRejection::InvalidCredentials => "invalid_credentials",
            AuthRejection::Denied(_) => "denied",
            AuthRejection::Unavailable(_) => "unavailable",
        }
    }
}

/// Gate that accepts every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledGate;

impl AuthGate for DisabledGate {
    fn protect<'a>(&'a self, ctx: &'a RequestContext, _headers: &'a HeaderMap) -> AuthFuture<'a> {
        tracing::debug!(host = %ctx.host, path = %ctx.path, "Auth disabled, allowing request");
        Box::pin(async { Ok::<(), AuthRejection>(()) })
    }
}

/// Error building the configured gate.
#[derive(Debug, thiserror::Error)]
pub enum GateBuildError {
    #[error("auth.verify_url is required for remote mode")]
    MissingVerifyUrl,

    #[error("failed to build auth client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Build the gate selected by `auth.mode`.
pub fn build_gate(config: &AuthConfig) -> Result<Arc<dyn AuthGate>, GateBuildError> {
    let gate: Arc<dyn AuthGate> = match config.mode {
        AuthMode::Disabled => Arc::new(DisabledGate),
        AuthMode::Bearer => Arc::new(BearerGate::new(
            config.tokens.clone(),
            config.session_cookie.clone(),
        )),
        AuthMode::Remote => {
            let url = config
                .verify_url
                .clone()
                .ok_or(GateBuildError::MissingVerifyUrl)?;
            Arc::new(RemoteGate::new(
                url,
                std::time::Duration::from_secs(config.timeout_secs),
            )?)
        }
    };

    tracing::info!(mode = ?config.mode, "Auth gate configured");
    Ok(gate)
}

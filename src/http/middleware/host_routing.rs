//! Host routing middleware.
//!
//! Runs the routing pipeline for every inbound request: build the
//! [`RequestContext`], plan, authenticate when required, then either rewrite
//! the request URI to the tenant-scoped path or leave it untouched.

use axum::{
    extract::{Request, State},
    http::{
        uri::{InvalidUriParts, PathAndQuery},
        HeaderName, Uri,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::str::FromStr;
use std::sync::Arc;
use url::Url;

use crate::http::request::request_id;
use crate::http::response::{auth_failure_response, ProxyError};
use crate::observability::metrics;
use crate::routing::{HostRouter, RequestContext, RoutingDecision};
use crate::security::{headers::set_tenant, AuthGate};

/// Shared state for [`host_routing_middleware`].
#[derive(Clone)]
pub struct HostRoutingState {
    pub router: Arc<HostRouter>,
    pub gate: Arc<dyn AuthGate>,
    pub default_scheme: Arc<str>,
    pub tenant_header: HeaderName,
    pub sign_in_url: Option<Arc<Url>>,
}

/// Tenant information attached to routed requests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TenantContext {
    pub subdomain: Option<String>,
    /// Path and query as the client sent them, before any rewrite.
    pub original_path: String,
}

pub async fn host_routing_middleware(
    State(state): State<HostRoutingState>,
    mut request: Request,
    next: Next,
) -> Response {
    let ctx = RequestContext::from_parts(request.uri(), request.headers(), &state.default_scheme);
    let req_id = request_id(request.headers()).map(str::to_string);
    let headers = request.headers().clone();

    let plan = match state
        .router
        .route(&ctx, &headers, state.gate.as_ref())
        .await
    {
        Ok(plan) => plan,
        Err(rejection) => {
            tracing::info!(
                request_id = req_id.as_deref().unwrap_or("-"),
                host = %ctx.host,
                path = %ctx.path,
                reason = rejection.reason(),
                "Request rejected by auth gate"
            );
            metrics::record_auth_rejection(rejection.reason());
            return auth_failure_response(
                rejection,
                &ctx,
                &headers,
                state.sign_in_url.as_deref(),
                req_id.as_deref(),
            );
        }
    };

    metrics::record_decision(plan.decision.as_str());

    if let RoutingDecision::Rewrite { target } = &plan.decision {
        match rewrite_uri(request.uri(), target) {
            Ok(uri) => {
                tracing::debug!(
                    request_id = req_id.as_deref().unwrap_or("-"),
                    from = %ctx.path_and_query(),
                    to = %target,
                    "Rewriting to tenant path"
                );
                *request.uri_mut() = uri;
            }
            Err(e) => {
                tracing::warn!(target_path = %target, error = %e, "Rewrite target is not a valid URI");
                return ProxyError::BadRequest("unroutable request path".to_string())
                    .into_response_with_id(req_id.as_deref());
            }
        }
    }

    set_tenant(
        request.headers_mut(),
        &state.tenant_header,
        plan.subdomain.as_deref(),
    );
    request.extensions_mut().insert(TenantContext {
        subdomain: plan.subdomain.clone(),
        original_path: ctx.path_and_query(),
    });
    request.extensions_mut().insert(plan);

    next.run(request).await
}

#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    #[error(transparent)]
    Path(#[from] axum::http::uri::InvalidUri),
    #[error(transparent)]
    Parts(#[from] InvalidUriParts),
}

/// Replace the path and query of `uri`, keeping scheme and authority.
pub fn rewrite_uri(uri: &Uri, target: &str) -> Result<Uri, RewriteError> {
    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(PathAndQuery::from_str(target)?);
    Ok(Uri::from_parts(parts)?)
}

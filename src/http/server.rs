//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with a catch-all proxy handler
//! - Wire up middleware (request ID, tracing, timeout, body limit, host routing)
//! - Forward routed requests to the upstream application
//! - Serve until the shutdown signal fires
//!
//! # Middleware Order (outer to inner)
//! ```text
//! set request id → trace → propagate request id → timeout → body limit
//!     → host routing → proxy handler
//! ```

use axum::{
    body::Body,
    extract::{Request, State},
    http::{
        header,
        uri::{Authority, PathAndQuery, Scheme},
        HeaderName, HeaderValue, Uri, Version,
    },
    middleware,
    response::Response,
    routing::any,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};
use url::Url;

use crate::config::RouterConfig;
use crate::http::middleware::{host_routing_middleware, HostRoutingState};
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::http::response::ProxyError;
use crate::observability::metrics;
use crate::routing::{HostRouter, RouterBuildError};
use crate::security::{
    build_gate,
    headers::{add_forwarded, strip_hop_by_hop},
    AuthGate, GateBuildError,
};

/// Failure assembling the server from configuration.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Router(#[from] RouterBuildError),

    #[error(transparent)]
    Gate(#[from] GateBuildError),

    #[error("invalid upstream address '{0}'")]
    InvalidUpstream(String),

    #[error("invalid tenant header name: {0}")]
    TenantHeader(#[from] axum::http::header::InvalidHeaderName),

    #[error("invalid sign-in URL: {0}")]
    SignInUrl(#[from] url::ParseError),
}

/// Application state injected into the proxy handler.
#[derive(Clone)]
pub struct AppState {
    pub client: Client<HttpConnector, Body>,
    pub upstream: Authority,
    pub default_scheme: Arc<str>,
}

/// HTTP server for the host router.
pub struct HttpServer {
    router: Router,
    config: RouterConfig,
}

impl HttpServer {
    /// Create a server using the auth gate selected by `auth.mode`.
    pub fn new(config: RouterConfig) -> Result<Self, ServerError> {
        let gate = build_gate(&config.auth)?;
        Self::with_gate(config, gate)
    }

    /// Create a server with an explicit auth gate.
    pub fn with_gate(config: RouterConfig, gate: Arc<dyn AuthGate>) -> Result<Self, ServerError> {
        let host_router = Arc::new(HostRouter::from_config(&config.tenancy, &config.paths)?);
        let upstream = Authority::from_str(&config.upstream.address)
            .map_err(|_| ServerError::InvalidUpstream(config.upstream.address.clone()))?;
        let tenant_header = HeaderName::from_str(&config.upstream.tenant_header)?;
        let sign_in_url = config
            .auth
            .sign_in_url
            .as_deref()
            .map(Url::parse)
            .transpose()?
            .map(Arc::new);
        let default_scheme: Arc<str> = Arc::from(config.listener.default_scheme.as_str());

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.timeouts.request_secs)));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        let routing = HostRoutingState {
            router: host_router,
            gate,
            default_scheme: default_scheme.clone(),
            tenant_header,
            sign_in_url,
        };
        let state = AppState {
            client,
            upstream,
            default_scheme,
        };

        let router = Self::build_router(&config, routing, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RouterConfig, routing: HostRoutingState, state: AppState) -> Router {
        Router::new()
            .route("/", any(proxy_handler))
            .route("/{*path}", any(proxy_handler))
            .with_state(state)
            .layer(middleware::from_fn_with_state(routing, host_routing_middleware))
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = request_id(request.headers()).unwrap_or("-"),
                )
            }))
            .layer(set_request_id_layer())
    }

    /// The assembled router, for embedding or in-process testing.
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Run the server on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            root_domain = %self.config.tenancy.root_domain,
            upstream = %self.config.upstream.address,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }
}

/// Forward the (possibly rewritten) request to the upstream application.
async fn proxy_handler(State(state): State<AppState>, request: Request) -> Response {
    let start = Instant::now();
    let req_id = request_id(request.headers()).map(str::to_string);
    let (mut parts, body) = request.into_parts();

    let original_host = parts
        .headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| parts.uri.authority().map(|a| a.to_string()));

    strip_hop_by_hop(&mut parts.headers);
    if let Some(host) = &original_host {
        // HTTP/2 requests carry the host in the URI only.
        if !parts.headers.contains_key(header::HOST) {
            if let Ok(value) = HeaderValue::from_str(host) {
                parts.headers.insert(header::HOST, value);
            }
        }
        add_forwarded(&mut parts.headers, host, &state.default_scheme);
    }

    let path_and_query = parts
        .uri
        .path_and_query()
        .cloned()
        .unwrap_or_else(|| PathAndQuery::from_static("/"));
    parts.uri = match Uri::builder()
        .scheme(Scheme::HTTP)
        .authority(state.upstream.clone())
        .path_and_query(path_and_query)
        .build()
    {
        Ok(uri) => uri,
        Err(e) => {
            return ProxyError::Internal(e.to_string()).into_response_with_id(req_id.as_deref());
        }
    };
    parts.version = Version::HTTP_11;

    tracing::debug!(
        request_id = req_id.as_deref().unwrap_or("-"),
        method = %parts.method,
        uri = %parts.uri,
        "Forwarding to upstream"
    );

    match state.client.request(Request::from_parts(parts, body)).await {
        Ok(response) => {
            metrics::record_upstream(response.status().as_u16());
            metrics::record_request_duration(start);

            let (mut parts, body) = response.into_parts();
            strip_hop_by_hop(&mut parts.headers);
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(
                request_id = req_id.as_deref().unwrap_or("-"),
                upstream = %state.upstream,
                error = %e,
                "Upstream error"
            );
            metrics::record_upstream(502);
            metrics::record_request_duration(start);
            ProxyError::BadGateway.into_response_with_id(req_id.as_deref())
        }
    }
}

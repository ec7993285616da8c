//! Host-based tenant routing in front of a multi-tenant web application.
//!
//! Every request is classified by host and path: requests on a tenant
//! subdomain are authenticated and rewritten to `/s/<tenant><path>`, all
//! others pass through unchanged.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod security;

pub use config::schema::RouterConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{HostRouter, RequestContext, RoutePlan, RoutingDecision};

//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID)
//!     → middleware/host_routing.rs (plan, auth, rewrite)
//!     → server.rs proxy handler (forward to upstream)
//!     → response.rs (error bodies, sign-in redirects)
//!     → Send to client
//! ```

pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use middleware::{HostRoutingState, TenantContext};
pub use request::X_REQUEST_ID;
pub use response::{ErrorResponse, ProxyError};
pub use server::{HttpServer, ServerError};

//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Routed request that must authenticate:
//!     → access_control.rs (AuthGate contract, gate selection)
//!     → bearer.rs | remote.rs (concrete gates)
//!     → success: continue routing / failure: reject request
//!
//! Forwarded request:
//!     → headers.rs (strip hop-by-hop, add X-Forwarded-*, tenant header)
//! ```
//!
//! # Design Decisions
//! - Fail closed: an unreachable auth provider rejects the request
//! - No trust in client input: the tenant header is always rewritten

pub mod access_control;
pub mod bearer;
pub mod headers;
pub mod remote;

pub use access_control::{build_gate, AuthFuture, AuthGate, AuthRejection, DisabledGate, GateBuildError};
pub use bearer::BearerGate;
pub use remote::RemoteGate;

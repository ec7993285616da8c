//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (host header, url, path)
//!     → context.rs (RequestContext, built once per request)
//!     → router.rs (classify → resolve → rewrite-or-pass)
//!         → matcher.rs (public / internal-asset / bypass patterns)
//!         → subdomain.rs (tenant label from host and url)
//!     → Return: RoutePlan (subdomain, auth requirement, decision)
//!
//! Router Compilation (at startup):
//!     TenancyConfig + PathsConfig
//!     → Compile pattern sets
//!     → Freeze as immutable HostRouter
//! ```
//!
//! # Design Decisions
//! - Router compiled at startup, immutable at runtime
//! - Deterministic: same input always yields the same plan
//! - Subdomain rules are first-match-wins, in a fixed order

pub mod context;
pub mod matcher;
pub mod router;
pub mod subdomain;

pub use context::RequestContext;
pub use matcher::{Matcher, PathPattern, PatternSet};
pub use router::{HostRouter, RoutePlan, RouterBuildError, RoutingDecision};
pub use subdomain::{strip_port, RootDomain, SubdomainResolver};

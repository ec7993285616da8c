//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Middleware and proxy handler produce:
//!     → logging.rs (structured log events, request id in the span)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```

pub mod logging;
pub mod metrics;

pub use self::logging::init_logging;
pub use self::metrics::init_metrics;

//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → CLI overrides (root domain, bind, upstream)
//!     → validation.rs (semantic checks)
//!     → RouterConfig (validated, immutable)
//!     → compiled into HostRouter and AuthGate at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the root domain never changes for the
//!   lifetime of the process
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, read_config, ConfigError};
pub use schema::{
    AuthConfig, AuthMode, ListenerConfig, LogFormat, ObservabilityConfig, PathsConfig,
    RouterConfig, SecurityConfig, TenancyConfig, TimeoutConfig, UpstreamConfig,
};
pub use validation::{validate_config, ValidationError};

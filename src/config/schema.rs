//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the host router.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Tenant resolution settings (root domain, preview platforms).
    pub tenancy: TenancyConfig,

    /// Path pattern sets used for classification.
    pub paths: PathsConfig,

    /// The application the router dispatches to.
    pub upstream: UpstreamConfig,

    /// Auth gate selection.
    pub auth: AuthConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request hardening.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Scheme assumed when no `X-Forwarded-Proto` header is present.
    pub default_scheme: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            default_scheme: "http".to_string(),
        }
    }
}

/// Tenant resolution configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TenancyConfig {
    /// Root domain, optionally with a port (e.g., "example.com", "localhost:3000").
    pub root_domain: String,

    /// Hostname suffixes of preview platforms that embed the tenant label
    /// before a `---` separator.
    pub preview_suffixes: Vec<String>,

    /// Path prefix tenant-scoped requests are rewritten under.
    pub rewrite_prefix: String,
}

impl Default for TenancyConfig {
    fn default() -> Self {
        Self {
            root_domain: "localhost:3000".to_string(),
            preview_suffixes: vec![".vercel.app".to_string()],
            rewrite_prefix: "/s".to_string(),
        }
    }
}

/// Path pattern sets. Each entry is a regular expression matched against the
/// whole path, e.g. `/sign-in(.*)`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Paths that do not require authentication by themselves.
    pub public: Vec<String>,

    /// Framework-internal, API and static-file paths that are never rewritten.
    pub internal_assets: Vec<String>,

    /// Paths the router skips entirely (no auth, no rewrite).
    pub bypass: Vec<String>,

    /// Paths that are routed even when they also match `bypass`.
    pub bypass_exceptions: Vec<String>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            public: vec![
                "/sign-in(.*)".to_string(),
                "/sign-up(.*)".to_string(),
                "/(.*)".to_string(),
            ],
            internal_assets: vec![
                "/_next(.*)".to_string(),
                "/api(.*)".to_string(),
                "(.*)/[^/]*\\.[^/]*".to_string(),
            ],
            bypass: Vec::new(),
            bypass_exceptions: vec!["/(api|trpc)(.*)".to_string()],
        }
    }
}

/// Upstream application configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Upstream address (e.g., "127.0.0.1:3000").
    pub address: String,

    /// Header carrying the resolved tenant label to the upstream.
    pub tenant_header: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:3000".to_string(),
            tenant_header: "x-tenant-subdomain".to_string(),
        }
    }
}

/// Which auth gate protects requests that require authentication.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// Every protect call succeeds.
    #[default]
    Disabled,
    /// Static bearer tokens or session cookie values.
    Bearer,
    /// Delegate to an external verification endpoint.
    Remote,
}

/// Auth gate configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    pub mode: AuthMode,

    /// Accepted tokens for `bearer` mode.
    pub tokens: Vec<String>,

    /// Cookie inspected for a session token.
    pub session_cookie: String,

    /// Verification endpoint for `remote` mode.
    pub verify_url: Option<String>,

    /// Verification timeout in seconds.
    pub timeout_secs: u64,

    /// Where browsers are redirected when authentication fails.
    pub sign_in_url: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            mode: AuthMode::Disabled,
            tokens: Vec::new(),
            session_cookie: "__session".to_string(),
            verify_url: None,
            timeout_secs: 5,
            sign_in_url: None,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive.
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

//! Host routing decision.
//!
//! # Responsibilities
//! - Classify whether a request must be authenticated
//! - Resolve the tenant subdomain
//! - Decide between passing the request through and rewriting its path
//!   under the tenant prefix
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Planning is a pure function of the request context; the only
//!   asynchronous step is the auth gate, invoked by [`HostRouter::route`]
//! - Rewrites are internal: the client-visible URL never changes

use serde::Serialize;

use crate::config::{PathsConfig, TenancyConfig};
use crate::routing::context::RequestContext;
use crate::routing::matcher::{Matcher, PatternSet};
use crate::routing::subdomain::{RootDomain, SubdomainResolver};
use crate::security::access_control::{AuthGate, AuthRejection};

/// Error building a router from configuration.
#[derive(Debug, thiserror::Error)]
pub enum RouterBuildError {
    #[error("invalid {field} pattern: {source}")]
    Pattern {
        field: &'static str,
        #[source]
        source: regex::Error,
    },
}

/// Where the request is dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoutingDecision {
    /// Dispatch to the original path unchanged.
    PassThrough,
    /// Dispatch internally to a tenant-scoped path (query included).
    Rewrite { target: String },
}

impl RoutingDecision {
    /// Short label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            RoutingDecision::PassThrough => "pass_through",
            RoutingDecision::Rewrite { .. } => "rewrite",
        }
    }
}

/// Everything the router concluded about one request before auth runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutePlan {
    pub subdomain: Option<String>,
    pub is_public_path: bool,
    pub is_internal_asset: bool,
    /// Request matched the bypass set; the router leaves it alone.
    pub bypassed: bool,
    pub must_authenticate: bool,
    pub decision: RoutingDecision,
}

/// The compiled, immutable host router.
#[derive(Debug, Clone)]
pub struct HostRouter {
    resolver: SubdomainResolver,
    rewrite_prefix: String,
    public: PatternSet,
    internal_assets: PatternSet,
    bypass: PatternSet,
    bypass_exceptions: PatternSet,
}

impl HostRouter {
    /// Compile a router from the tenancy and path sections of the config.
    pub fn from_config(
        tenancy: &TenancyConfig,
        paths: &PathsConfig,
    ) -> Result<Self, RouterBuildError> {
        let compile = |field: &'static str, patterns: &[String]| {
            PatternSet::compile(patterns).map_err(|source| RouterBuildError::Pattern { field, source })
        };

        Ok(Self {
            resolver: SubdomainResolver::new(
                RootDomain::new(tenancy.root_domain.as_str()),
                &tenancy.preview_suffixes,
            ),
            rewrite_prefix: tenancy.rewrite_prefix.trim_end_matches('/').to_string(),
            public: compile("paths.public", &paths.public)?,
            internal_assets: compile("paths.internal_assets", &paths.internal_assets)?,
            bypass: compile("paths.bypass", &paths.bypass)?,
            bypass_exceptions: compile("paths.bypass_exceptions", &paths.bypass_exceptions)?,
        })
    }

    pub fn root_domain(&self) -> &RootDomain {
        self.resolver.root_domain()
    }

    /// Resolve the tenant label for a request.
    pub fn extract_subdomain(&self, ctx: &RequestContext) -> Option<String> {
        self.resolver.extract(&ctx.host, &ctx.url)
    }

    /// Whether the path requires no authentication by itself.
    pub fn is_public_path(&self, path: &str) -> bool {
        self.public.matches(path)
    }

    /// Whether the path is framework-internal, API or static-file traffic.
    pub fn is_internal_asset(&self, path: &str) -> bool {
        self.internal_assets.matches(path)
    }

    /// Whether the router skips this path entirely.
    pub fn is_bypassed(&self, path: &str) -> bool {
        self.bypass.matches(path) && !self.bypass_exceptions.matches(path)
    }

    /// Tenant-scoped target for a path, e.g. `/s/acme/gallery?page=2`.
    pub fn rewrite_target(&self, subdomain: &str, ctx: &RequestContext) -> String {
        format!("{}/{}{}", self.rewrite_prefix, subdomain, ctx.path_and_query())
    }

    /// Classify a request without invoking any collaborator.
    pub fn plan(&self, ctx: &RequestContext) -> RoutePlan {
        if self.is_bypassed(&ctx.path) {
            return RoutePlan {
                subdomain: None,
                is_public_path: self.is_public_path(&ctx.path),
                is_internal_asset: self.is_internal_asset(&ctx.path),
                bypassed: true,
                must_authenticate: false,
                decision: RoutingDecision::PassThrough,
            };
        }

        let is_public_path = self.is_public_path(&ctx.path);
        let subdomain = self.extract_subdomain(ctx);
        let must_authenticate = !is_public_path || subdomain.is_some();
        let is_internal_asset = self.is_internal_asset(&ctx.path);

        let decision = match &subdomain {
            Some(label) if !is_internal_asset => RoutingDecision::Rewrite {
                target: self.rewrite_target(label, ctx),
            },
            _ => RoutingDecision::PassThrough,
        };

        RoutePlan {
            subdomain,
            is_public_path,
            is_internal_asset,
            bypassed: false,
            must_authenticate,
            decision,
        }
    }

    /// Run the full pipeline for one request: plan, authenticate when
    /// required, then return the plan. An auth failure ends the pipeline
    /// before any rewrite is applied.
    pub async fn route(
        &self,
        ctx: &RequestContext,
        headers: &axum::http::HeaderMap,
        gate: &dyn AuthGate,
    ) -> Result<RoutePlan, AuthRejection> {
        let plan = self.plan(ctx);
        if plan.must_authenticate {
            gate.protect(ctx, headers).await?;
        }
        Ok(plan)
    }
}

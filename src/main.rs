//! Host router
//!
//! Sits in front of a multi-tenant web application and maps tenant
//! subdomains onto tenant-scoped paths.
//!
//! ```text
//!     Client Request                ┌────────────────────────────────────────┐
//!     ─────────────────────────────▶│ request id → trace → timeout → limit    │
//!     Host: acme.example.com        │        │                               │
//!     GET /generate                 │        ▼                               │
//!                                   │ host routing: classify → resolve       │
//!                                   │   → auth gate → rewrite-or-pass        │
//!                                   │        │                               │
//!                                   │        ▼                               │
//!                                   │ proxy handler ────────────────────────┼──▶ Upstream
//!                                   └────────────────────────────────────────┘    GET /s/acme/generate
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use host_router::config::{read_config, validate_config, ConfigError, RouterConfig};
use host_router::lifecycle::{spawn_signal_listener, Shutdown};
use host_router::observability::{init_logging, init_metrics};
use host_router::HttpServer;

#[derive(Parser, Debug)]
#[command(name = "host-router", version, about = "Subdomain tenant router")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, env = "HOST_ROUTER_CONFIG")]
    config: Option<PathBuf>,

    /// Override `tenancy.root_domain`.
    #[arg(long, env = "HOST_ROUTER_ROOT_DOMAIN")]
    root_domain: Option<String>,

    /// Override `listener.bind_address`.
    #[arg(long, env = "HOST_ROUTER_BIND")]
    bind: Option<String>,

    /// Override `upstream.address`.
    #[arg(long, env = "HOST_ROUTER_UPSTREAM")]
    upstream: Option<String>,
}

impl Args {
    fn load(&self) -> Result<RouterConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => RouterConfig::default(),
        };

        if let Some(root_domain) = &self.root_domain {
            config.tenancy.root_domain = root_domain.clone();
        }
        if let Some(bind) = &self.bind {
            config.listener.bind_address = bind.clone();
        }
        if let Some(upstream) = &self.upstream {
            config.upstream.address = upstream.clone();
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = args.load()?;

    init_logging(&config.observability)?;
    tracing::info!("host-router v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        root_domain = %config.tenancy.root_domain,
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.address,
        auth_mode = ?config.auth.mode,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Validation guarantees the address parses.
        let addr = config.observability.metrics_address.parse()?;
        init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    spawn_signal_listener(shutdown.clone());

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;

use host_router::config::{load_config, RouterConfig};
use host_router::routing::{HostRouter, RequestContext};

#[derive(Parser)]
#[command(name = "router-cli")]
#[command(about = "Inspect host-router configuration and routing decisions", long_about = None)]
struct Cli {
    /// Configuration file. Defaults are used when omitted.
    #[arg(short, long, env = "HOST_ROUTER_CONFIG")]
    config: Option<PathBuf>,

    /// Override `tenancy.root_domain`.
    #[arg(long, env = "HOST_ROUTER_ROOT_DOMAIN")]
    root_domain: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show how a request would be routed
    Explain {
        /// Host header value, e.g. acme.example.com
        #[arg(long)]
        host: String,
        /// Full request URL. Built from the host and path when omitted.
        #[arg(long)]
        url: Option<String>,
        /// Path and query
        #[arg(long, default_value = "/")]
        path: String,
    },
    /// Validate the configuration and print a summary
    Check,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RouterConfig::default(),
    };
    if let Some(root_domain) = cli.root_domain {
        config.tenancy.root_domain = root_domain;
    }

    match cli.command {
        Commands::Explain { host, url, path } => {
            let router = HostRouter::from_config(&config.tenancy, &config.paths)?;
            let mut ctx = RequestContext::new(&config.listener.default_scheme, &host, &path);
            if let Some(url) = url {
                ctx.url = url;
            }

            let plan = router.plan(&ctx);
            let root = router.root_domain();
            let output = json!({
                "request": ctx,
                "plan": plan,
                "root_domain": {
                    "host": root.host(),
                    "is_local": root.is_local(),
                    "app_origin": root.app_origin(),
                    "tenant_origin": plan.subdomain.as_deref().map(|s| root.tenant_origin(s)),
                },
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::Check => {
            host_router::config::validate_config(&config)
                .map_err(host_router::config::ConfigError::Validation)?;
            let summary = json!({
                "root_domain": config.tenancy.root_domain,
                "rewrite_prefix": config.tenancy.rewrite_prefix,
                "upstream": config.upstream.address,
                "auth_mode": config.auth.mode,
                "auth_tokens": config.auth.tokens.len(),
                "public_patterns": config.paths.public.len(),
                "bypass_patterns": config.paths.bypass.len(),
            });
            println!("configuration OK");
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}

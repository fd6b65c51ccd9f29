//! Reddit proxy (v1)
//!
//! Proxies "top posts of all time" listings from Reddit, caching public
//! responses and forwarding user tokens in authenticated mode.
//!
//! # Architecture Overview
//!
//! ```text
//!   Client ──▶ http::server ──▶ http::proxy ──▶ proxy::handler
//!                  │                                 │
//!                  ├─ http::auth ◀──▶ auth::oauth     ├─ auth (CredentialProvider)
//!                  │        └──────▶ auth::store      ├─ cache (CacheStore)
//!                  └─ http::health                    └─ upstream (Transport) ──▶ Reddit
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use reddit_proxy::config::{load_config, loader::apply_env_overrides, validation::validate_config, ConfigError};
use reddit_proxy::lifecycle::{build_state, signals, Shutdown, StartupError};
use reddit_proxy::observability::{logging, metrics};
use reddit_proxy::{HttpServer, ProxyConfig};

#[derive(Parser)]
#[command(name = "reddit-proxy")]
#[command(about = "Caching Reddit API proxy with OAuth support", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long, env = "REDDIT_PROXY_CONFIG")]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,
}

fn load(args: &Args) -> Result<ProxyConfig, StartupError> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => {
            let mut config = ProxyConfig::default();
            apply_env_overrides(&mut config);
            config
        }
    };
    if let Some(bind) = &args.bind {
        config.listener.bind_address = bind.clone();
    }
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load(&args)?;

    logging::init_logging(&config.observability.log_level);

    tracing::info!("reddit-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        cache_backend = ?config.cache.backend,
        cache_ttl_secs = config.cache.ttl_secs,
        auth_enabled = config.auth.enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let state = build_state(&config).await?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(&shutdown);

    let server = HttpServer::new(config, state);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

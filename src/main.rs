//! ext-authz-router
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────────┐
//!                         │                 EXT-AUTHZ ROUTER                 │
//!                         │                                                  │
//!   Envoy ext_authz       │  ┌──────────┐    ┌──────────────┐   ┌─────────┐  │
//!   ──────────────────────┼─▶│  check   │───▶│   decision   │──▶│  store  │  │
//!   ◀─ 200/302/401/403 ───┼──│ adapter  │◀───│    engine    │   │ (swap)  │  │
//!                         │  └──────────┘    └──────────────┘   └────▲────┘  │
//!                         │                                          │       │
//!   Browser / API         │  ┌──────────┐                            │       │
//!   ──────────────────────┼─▶│ selector │── list / validate ─────────┤       │
//!                         │  │  + admin │── reload ──────────────────┘       │
//!                         │  └──────────┘                                    │
//!                         │                                                  │
//!                         │  config · observability · lifecycle (signals)    │
//!                         └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use ext_authz_router::config::load_service_config;
use ext_authz_router::lifecycle::startup;
use ext_authz_router::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "ext-authz-router")]
#[command(about = "Namespace-based external authorization service", long_about = None)]
struct Args {
    /// Service settings file (TOML). Defaults plus environment when omitted.
    #[arg(short, long, env = "AUTHZ_ROUTER_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_service_config(args.config.as_deref())?;

    init_logging(&config.observability);

    tracing::info!("ext-authz-router v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        selector_address = %config.listener.bind_address,
        authz_address = %config.authz.bind_address,
        public_url = %config.selector.public_url,
        namespaces = %config.namespaces.path,
        "Configuration loaded"
    );

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

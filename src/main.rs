//! Routing gateway (v1)
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────────┐
//!                     │                   ROUTING GATEWAY                     │
//!                     │                                                       │
//!  Batch request      │  ┌─────────┐   ┌───────────┐   ┌────────────────┐   │
//!  ───────────────────┼─▶│  http   │──▶│   batch   │──▶│    routing     │   │
//!                     │  │ server  │   │ envelope  │   │ (shape lookup) │   │
//!                     │  └─────────┘   └───────────┘   └───────┬────────┘   │
//!                     │                                        ▼            │
//!                     │                                ┌────────────────┐   │
//!                     │                                │    payload     │   │
//!                     │                                │   builders     │   │
//!                     │                                └───────┬────────┘   │
//!                     │                                        ▼            │
//!  Batch response     │  ┌─────────┐   ┌───────────┐   ┌────────────────┐   │
//!  ◀──────────────────┼──│  batch  │◀──│ geometry  │◀──│  downstream    │◀──┼── Routing engine
//!                     │  │assemble │   │ (polyline)│   │   clients      │◀──┼── VRP solver
//!                     │  └─────────┘   └───────────┘   └────────────────┘   │
//!                     │                                                       │
//!                     │  config · health · observability · lifecycle         │
//!                     └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use routing_gateway::config;
use routing_gateway::lifecycle;
use routing_gateway::observability::logging;

#[derive(Parser)]
#[command(name = "routing-gateway")]
#[command(about = "Batch gateway for routing and fleet-optimization engines", long_about = None)]
struct Args {
    /// TOML configuration file (falls back to $GATEWAY_CONFIG, then defaults)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let path = args
        .config
        .or_else(|| std::env::var_os("GATEWAY_CONFIG").map(PathBuf::from));

    let config = config::load(path.as_deref())?;
    logging::init_logging(&config.observability)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address(),
        routing_engine = %config.routing_engine.base_url(),
        vrp_engine = %config.vrp_engine.url(),
        max_concurrency = config.batch.max_concurrency,
        "Configuration loaded"
    );

    lifecycle::run(config).await?;
    Ok(())
}

//! FakeMinder gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────┐
//!                     │                  GATEWAY                      │
//!   Client Request    │  ┌────────┐   ┌────────────┐   ┌──────────┐  │
//!   ──────────────────┼─▶│  http  │──▶│  gateway   │──▶│ routing  │  │
//!                     │  │ server │   │ dispatcher │   │classifier│  │
//!                     │  └───┬────┘   └─────┬──────┘   └──────────┘  │
//!                     │      │              │                        │
//!                     │      │              ▼                        │
//!                     │      │        ┌───────────┐                  │
//!                     │      │        │  session  │                  │
//!                     │      │        │ store +   │                  │
//!                     │      │        │ lockout   │                  │
//!                     │      │        └───────────┘                  │
//!   Client Response   │      ▼                                       │
//!   ◀─────────────────┼── redirect / direct answer / forward ────────┼──▶ Target
//!                     └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use fakeminder::config::load_config;
use fakeminder::lifecycle::signals::shutdown_on_signal;
use fakeminder::observability::{logging, metrics};
use fakeminder::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "fakeminder")]
#[command(about = "Cookie-based SSO gateway test double", long_about = None)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "fakeminder.toml")]
    config: PathBuf,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match load_config(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("fakeminder: {}: {}", args.config.display(), e);
            std::process::exit(2);
        }
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability.log_level);
    tracing::info!("fakeminder v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        target = %config.target_site.host,
        protected_paths = config.target_site.protected_paths.len(),
        users = config.users.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(config)?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(shutdown_on_signal(shutdown.clone()));

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

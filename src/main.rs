//! MVC dispatcher binary.
//!
//! # Architecture Overview
//!
//! ```text
//!     startup (once)                               per request
//!     ──────────────                               ───────────
//!     config ─▶ scan namespace                     client
//!                 │                                  │
//!                 ▼                                  ▼
//!           component registry                 http server (axum)
//!                 │                                  │
//!                 ▼                                  ▼
//!           route table (frozen) ──────────────▶ dispatcher ─▶ handler
//! ```

mod controllers;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tokio::net::TcpListener;

use mvc_dispatcher::config::{load_config, validation::validate_config, FrameworkConfig};
use mvc_dispatcher::lifecycle::{bootstrap, signals, Shutdown};
use mvc_dispatcher::observability::{logging, metrics};
use mvc_dispatcher::HttpServer;

#[derive(Parser, Debug)]
#[command(name = "mvc-dispatcher", version, about = "Annotation-style controller dispatcher")]
struct Cli {
    /// Configuration file (`.toml` or `.properties`).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

fn load(cli: &Cli) -> Result<FrameworkConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => FrameworkConfig {
            scan_package: controllers::NAMESPACE.to_string(),
            ..Default::default()
        },
    };
    if let Some(bind) = &cli.bind {
        config.listener.bind_address = bind.clone();
    }
    validate_config(&config).map_err(mvc_dispatcher::config::ConfigError::Validation)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("mvc-dispatcher: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init_logging(&config.observability) {
        eprintln!("mvc-dispatcher: failed to initialize logging: {e}");
    }

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Fatal error");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: FrameworkConfig) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        scan_package = %config.scan_package,
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        "mvc-dispatcher starting"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let catalog = controllers::catalog();
    let app = bootstrap(&config, &catalog)?;
    tracing::info!(
        components = app.registry().len(),
        faults = app.registry().faults().len(),
        routes = app.dispatcher().table().len(),
        "Startup complete"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        signals::trigger_on_signal(&trigger).await;
    });

    HttpServer::new(config, app.dispatcher()).run(listener, receiver).await?;
    Ok(())
}

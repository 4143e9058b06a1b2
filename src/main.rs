//! error-pages server binary.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────┐
//!                     │                   ERROR PAGES                    │
//!                     │                                                  │
//!  Proxy subrequest   │  ┌─────────┐    ┌──────────┐    ┌────────────┐   │
//!  ───────────────────┼─▶│  http   │───▶│ pipeline │───▶│   codes    │   │
//!  (/503, X-Code)     │  │ server  │    │          │    │   table    │   │
//!                     │  └─────────┘    └────┬─────┘    └────────────┘   │
//!                     │                      │                           │
//!                     │                      ▼                           │
//!                     │               ┌─────────────┐                    │
//!                     │               │  template   │                    │
//!  Rendered page      │               │ picker/cache│                    │
//!  ◀──────────────────┼───────────────│  renderer   │                    │
//!                     │               └─────────────┘                    │
//!                     │                                                  │
//!                     │  config · observability · lifecycle · builder    │
//!                     └──────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::str::FromStr;

use clap::Parser;
use tokio::net::TcpListener;

use error_pages::builder::build_pages;
use error_pages::cli::{BuildArgs, Cli, Command, ServeArgs};
use error_pages::config::{load_config, validate_config, AppConfig, ConfigError};
use error_pages::observability::logging::{init_logging, LogFormat};
use error_pages::observability::metrics;
use error_pages::{HttpServer, Pipeline, Shutdown};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };

    let command = cli.command.unwrap_or_else(|| Command::Serve(ServeArgs::default()));
    if let Command::Serve(args) = &command {
        args.apply(&mut config);
    }

    // once, after flags and env overrides are in place
    validate_config(&config).map_err(ConfigError::Validation)?;

    match command {
        Command::Serve(_) => {
            init_observability(&config);
            serve(config).await?;
        }
        Command::Build(args) => {
            init_observability(&config);
            build(config, &args)?;
        }
    }

    Ok(())
}

fn init_observability(config: &AppConfig) {
    let observability = &config.observability;
    let format = LogFormat::from_str(&observability.log_format).unwrap_or_default();
    init_logging(&observability.log_level, format);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "error-pages starting");

    if observability.metrics_enabled {
        match observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }
}

async fn serve(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        bind_address = %config.listener.bind_address,
        template = %config.rendering.template_name,
        rotation_mode = %config.rendering.rotation_mode,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    // templates are read before the listener binds
    let server = HttpServer::new(config.clone())?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let signals = shutdown.listen_for_signals();

    server.run(listener, shutdown.subscribe()).await?;
    signals.abort();

    tracing::info!("Shutdown complete");
    Ok(())
}

fn build(config: AppConfig, args: &BuildArgs) -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = Pipeline::from_config(&config)?;
    let report = build_pages(&pipeline, &args.out_dir, !args.no_index)?;

    tracing::info!(pages = report.page_count(), out_dir = %args.out_dir.display(), "Done");
    Ok(())
}

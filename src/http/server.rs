//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, timeout)
//! - Serve health and version routes next to the error pages
//! - Run the cache sweeper for the lifetime of the listener
//! - Stop gracefully on the shutdown broadcast

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{HeaderMap, Uri},
    response::IntoResponse,
    routing::{any, get},
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::{AppConfig, ConfigError};
use crate::http::response::ErrorPage;
use crate::pipeline::Pipeline;
use crate::template::CacheSweeper;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

/// HTTP server for error pages.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
    pipeline: Arc<Pipeline>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// Template files are read here, before any listener is bound.
    pub fn new(config: AppConfig) -> Result<Self, ConfigError> {
        let pipeline = Arc::new(Pipeline::from_config(&config)?);
        Ok(Self::with_pipeline(config, pipeline))
    }

    /// Create a server around an already built pipeline.
    pub fn with_pipeline(config: AppConfig, pipeline: Arc<Pipeline>) -> Self {
        let state = AppState {
            pipeline: pipeline.clone(),
        };

        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            pipeline,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        Router::new()
            .route("/healthz", get(health_handler))
            .route("/health/live", get(health_handler))
            .route("/version", get(version_handler))
            .route("/", any(error_page_handler))
            .route("/{*path}", any(error_page_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
    }

    /// The router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn pipeline(&self) -> Arc<Pipeline> {
        self.pipeline.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        let sweeper = self.pipeline.cache().map(|cache| {
            let sweeper = CacheSweeper::new(cache);
            tokio::spawn(sweeper.run(shutdown.resubscribe()))
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        if let Some(handle) = sweeper {
            // the sweeper saw the same broadcast, this only waits for it to exit
            let _ = handle.await;
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Renders the error page for any request that is not a health or version check.
async fn error_page_handler(State(state): State<AppState>, uri: Uri, headers: HeaderMap) -> ErrorPage {
    state.pipeline.resolve(uri.path(), &headers)
}

async fn health_handler() -> &'static str {
    "OK"
}

#[derive(Serialize)]
struct VersionInfo {
    name: &'static str,
    version: &'static str,
}

async fn version_handler() -> impl IntoResponse {
    Json(VersionInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}

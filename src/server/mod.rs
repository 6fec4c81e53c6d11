//! HTTP surface: router, shared state and the serve loop.

pub mod artifact;
pub mod auth;
pub mod error;
pub mod upload;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::redaction::RedactionService;

pub use error::{ApiError, ErrorBody};
pub use upload::{HEADER_REDACTED_PAGES, HEADER_REDACTION_PARTIAL};

/// Room left above the file limit for multipart framing and the text fields.
pub const MULTIPART_SLACK: u64 = 1024 * 1024;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    service: RedactionService,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let service = RedactionService::from_config(&config.redaction);
        Self::with_service(config, service)
    }

    pub fn with_service(config: Config, service: RedactionService) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, service }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn service(&self) -> &RedactionService {
        &self.inner.service
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn router(state: AppState) -> Router {
    let body_limit = state
        .config()
        .limits
        .max_upload_bytes
        .saturating_add(MULTIPART_SLACK);
    let body_limit = usize::try_from(body_limit).unwrap_or(usize::MAX);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([
            header::CONTENT_DISPOSITION,
            HeaderName::from_static(HEADER_REDACTED_PAGES),
            HeaderName::from_static(HEADER_REDACTION_PARTIAL),
        ]);

    Router::new()
        .route("/health", get(health_check))
        .route("/process-pdf", post(upload::process_pdf))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Binds and serves until Ctrl+C or SIGTERM.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(&config.storage.scratch_dir)
        .await
        .with_context(|| {
            format!(
                "failed to create scratch directory {}",
                config.storage.scratch_dir.display()
            )
        })?;

    let app_host = config.server.host.clone();
    let port = config.server.port;
    let app = router(AppState::new(config));

    let host = app_host.as_str();
    let listener = tokio::net::TcpListener::bind((host, port))
        .await
        .with_context(|| format!("failed to bind {}:{}", host, port))?;
    let addr: SocketAddr = listener.local_addr().context("listener has no address")?;
    tracing::info!("blackout listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}

//! pcap-insight Upload Server
//!
//! Accepts packet captures over HTTP and answers with the analysis report.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                   PCAP-INSIGHT SERVER                    │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌──────────────┐   ┌─────────────────┐  │
//! │  │  Upload   │──▶│ Blocking pool│──▶│ Analysis report │  │
//! │  │  (Axum)   │   │  (pipeline)  │   │     (JSON)      │  │
//! │  └───────────┘   └──────┬───────┘   └─────────────────┘  │
//! │                         ▼                                │
//! │                ┌─────────────────┐                       │
//! │                │ Anomaly detector│ (loaded once)         │
//! │                └─────────────────┘                       │
//! └──────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use pcap_insight::AnomalyDetector;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    // Initialize logging; core `log` records are bridged into tracing
    let fmt_layer = tracing_subscriber::fmt::layer();
    let registry = tracing_subscriber::registry().with(
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "pcap_insight=info,pcap_insight_server=debug,tower_http=debug".into()),
    );
    if config.is_production() {
        registry.with(fmt_layer.json()).init();
    } else {
        registry.with(fmt_layer).init();
    }

    tracing::info!("pcap-insight server starting...");
    tracing::info!("Model artifact: {}", config.analyzer.model_path.display());

    config
        .analyzer
        .validate()
        .context("Invalid analyzer configuration")?;

    let state = AppState::load(config.clone());

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: config::Config,
    pub detector: Option<Arc<AnomalyDetector>>,
    /// Why the detector is missing, reported on every analysis request
    pub model_error: Option<String>,
}

impl AppState {
    /// Load the anomaly model once; a failure keeps the server up
    pub fn load(config: config::Config) -> Self {
        match AnomalyDetector::load(&config.analyzer) {
            Ok(detector) => {
                let info = detector.info();
                tracing::info!(
                    "Model '{}' loaded ({} backend, threshold {:.6}, {:?})",
                    info.name,
                    info.backend,
                    info.threshold,
                    info.threshold_source
                );
                Self::with_detector(config, detector)
            }
            Err(e) => {
                tracing::error!("Failed to load anomaly model: {}", e);
                Self {
                    config,
                    detector: None,
                    model_error: Some(e.to_string()),
                }
            }
        }
    }

    pub fn with_detector(config: config::Config, detector: AnomalyDetector) -> Self {
        Self {
            config,
            detector: Some(Arc::new(detector)),
            model_error: None,
        }
    }
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(handlers::health::check))
        .route("/upload", post(handlers::analysis::upload))
        .route("/api/v1/analysis", post(handlers::analysis::upload))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

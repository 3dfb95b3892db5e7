//! Health check handler

use axum::{extract::State, Json};
use pcap_insight::model::ModelInfo;
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct ModelStatus {
    loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    info: Option<ModelInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: i64,
    model: ModelStatus,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let model = ModelStatus {
        loaded: state.detector.is_some(),
        info: state.detector.as_ref().map(|d| d.info().clone()),
        error: state.model_error.clone(),
    };

    Json(HealthResponse {
        status: if model.loaded { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
        model,
    })
}

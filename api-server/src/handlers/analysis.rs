//! Capture upload handler
//!
//! The upload is held in memory only and analyzed on the blocking pool.

use axum::{
    extract::{Multipart, State},
    Json,
};
use pcap_insight::{analyze, AnalysisReport};
use serde::Serialize;
use uuid::Uuid;

use crate::{AppError, AppResult, AppState};

/// Multipart field carrying the capture
const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub message: &'static str,
    pub analysis_id: Uuid,
    pub data: AnalysisReport,
}

/// POST /upload, POST /api/v1/analysis
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<AnalysisResponse>> {
    let bytes = read_capture_field(&mut multipart).await?;

    let detector = state.detector.clone().ok_or_else(|| {
        AppError::ModelUnavailable(
            state
                .model_error
                .clone()
                .unwrap_or_else(|| "model not loaded".to_string()),
        )
    })?;

    let analysis_id = Uuid::new_v4();
    tracing::info!("Analysis {} started: {} bytes", analysis_id, bytes.len());

    let analyzer = state.config.analyzer.clone();
    let report = tokio::task::spawn_blocking(move || analyze(&bytes, &analyzer, &detector))
        .await?
        .map_err(|e| {
            tracing::warn!("Analysis {} failed: {}", analysis_id, e);
            AppError::from(e)
        })?;

    tracing::info!(
        "Analysis {} done: {} packets, {} anomalies",
        analysis_id,
        report.summary.total_packets,
        report.summary.anomalies
    );

    Ok(Json(AnalysisResponse {
        message: "Analysis complete",
        analysis_id,
        data: report,
    }))
}

async fn read_capture_field(multipart: &mut Multipart) -> AppResult<Vec<u8>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(FILE_FIELD) {
            let bytes = field.bytes().await?;
            if bytes.is_empty() {
                return Err(AppError::ValidationError("No file selected".to_string()));
            }
            return Ok(bytes.to_vec());
        }
    }

    Err(AppError::ValidationError("No file part".to_string()))
}

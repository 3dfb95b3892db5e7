//! Error handling

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use pcap_insight::{AnalysisError, ErrorKind};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    // Request errors
    #[error("{0}")]
    ValidationError(String),

    // Caller's capture could not be analyzed
    #[error("{0}")]
    InvalidCapture(String),

    // Service configuration (model) errors
    #[error("{0}")]
    ModelUnavailable(String),

    #[error("{0}")]
    ConfigurationError(String),

    // Generic errors
    #[error("{0}")]
    InternalError(String),
}

impl AppError {
    fn kind(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) | AppError::InvalidCapture(_) => "input",
            AppError::ModelUnavailable(_) | AppError::ConfigurationError(_) => "configuration",
            AppError::InternalError(_) => "internal",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let (status, error_message) = match &self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::InvalidCapture(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::ModelUnavailable(msg) => {
                tracing::error!("Model unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, format!("Anomaly model unavailable: {}", msg))
            }
            AppError::ConfigurationError(msg) => {
                tracing::error!("Configuration error: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, msg.clone())
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
            "kind": kind,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        match err.kind() {
            ErrorKind::Input => AppError::InvalidCapture(err.to_string()),
            ErrorKind::Configuration => AppError::ConfigurationError(err.to_string()),
            ErrorKind::Internal => AppError::InternalError(err.to_string()),
        }
    }
}

impl From<axum::extract::multipart::MultipartError> for AppError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        AppError::ValidationError(format!("Invalid multipart upload: {}", err))
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::InternalError(format!("analysis task failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcap_insight::{CaptureError, ModelError};

    #[test]
    fn test_capture_errors_are_bad_requests() {
        let err = AppError::from(AnalysisError::from(CaptureError::Empty));
        assert!(matches!(err, AppError::InvalidCapture(_)));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_model_errors_are_service_errors() {
        let err = AppError::from(AnalysisError::from(ModelError::MissingThreshold));
        assert!(matches!(err, AppError::ConfigurationError(_)));
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let err = AppError::from(AnalysisError::Worker("clustering"));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

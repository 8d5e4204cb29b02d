//! Error handling for the AgriTriFusion server
//!
//! Provides consistent JSON error responses

use axum::{
    extract::{multipart::MultipartError, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::{PredictionError, YieldError};
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Missing field: {0}")]
    MissingField(String),

    // Prediction errors
    #[error(transparent)]
    Prediction(#[from] PredictionError),

    #[error("Stage classifier is not configured")]
    ClassifierUnavailable,

    // External service errors
    #[error("Stage classifier error: {0}")]
    StageClassifierError(String),

    #[error("Nutrient model error: {0}")]
    NutrientModelError(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<YieldError> for AppError {
    fn from(err: YieldError) -> Self {
        match err {
            YieldError::InvalidInput { field, message } => AppError::Validation { field, message },
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::ValidationError(format!("Malformed multipart body: {}", err.body_text()))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field = errors
            .field_errors()
            .keys()
            .next()
            .map(|f| f.to_string())
            .unwrap_or_else(|| "input".to_string());
        AppError::Validation {
            field,
            message: errors.to_string(),
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorDetail {
    fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            field: None,
        }
    }

    fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

fn prediction_error_detail(err: &PredictionError) -> (StatusCode, ErrorDetail) {
    match err {
        PredictionError::InvalidImage(msg) => (
            StatusCode::BAD_REQUEST,
            ErrorDetail::new("INVALID_IMAGE", format!("Invalid image: {}", msg)).with_field("image"),
        ),
        PredictionError::UnsupportedCrop(crop) => (
            StatusCode::BAD_REQUEST,
            ErrorDetail::new("UNSUPPORTED_CROP", format!("Unsupported crop '{}'", crop))
                .with_field("crop"),
        ),
        PredictionError::UnsupportedStage(stage) => (
            StatusCode::BAD_REQUEST,
            ErrorDetail::new("UNSUPPORTED_STAGE", format!("Unsupported ripeness stage '{}'", stage))
                .with_field("stage"),
        ),
        PredictionError::UnsupportedSubStage(sub) => (
            StatusCode::BAD_REQUEST,
            ErrorDetail::new("UNSUPPORTED_SUB_STAGE", format!("Unsupported sub-stage '{}'", sub))
                .with_field("sub_stage"),
        ),
        PredictionError::Encoding { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorDetail::new("ENCODING_ERROR", err.to_string()),
        ),
        PredictionError::Ensemble(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorDetail::new("ENSEMBLE_ERROR", err.to_string()),
        ),
        PredictionError::DateOutOfRange(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorDetail::new("DATE_OUT_OF_RANGE", err.to_string()),
        ),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new("VALIDATION_ERROR", message.clone()).with_field(field.clone()),
            ),
            AppError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new("VALIDATION_ERROR", msg.clone()),
            ),
            AppError::MissingField(field) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new("MISSING_FIELD", format!("Field '{}' is required", field))
                    .with_field(field.clone()),
            ),
            AppError::Prediction(err) => prediction_error_detail(err),
            AppError::ClassifierUnavailable => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail::new(
                    "CLASSIFIER_UNAVAILABLE",
                    "No image classifier is configured; supply crop and stage explicitly",
                ),
            ),
            AppError::StageClassifierError(msg) => (
                StatusCode::BAD_GATEWAY,
                ErrorDetail::new("STAGE_CLASSIFIER_ERROR", format!("Stage classifier error: {}", msg)),
            ),
            AppError::NutrientModelError(msg) => (
                StatusCode::BAD_GATEWAY,
                ErrorDetail::new("NUTRIENT_MODEL_ERROR", format!("Nutrient model error: {}", msg)),
            ),
            AppError::Configuration(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("CONFIGURATION_ERROR", format!("Configuration error: {}", msg)),
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("INTERNAL_ERROR", msg.clone()),
            ),
        };

        // Log the error for debugging
        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::warn!("Request rejected: {}", self);
        }

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prediction_error_status_codes() {
        let cases = [
            (PredictionError::InvalidImage("empty".into()), StatusCode::BAD_REQUEST),
            (PredictionError::UnsupportedCrop("kiwi".into()), StatusCode::BAD_REQUEST),
            (
                PredictionError::Encoding {
                    kind: "crop",
                    label: "mango".into(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (PredictionError::Ensemble("empty".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            let response = AppError::from(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }

    #[test]
    fn test_yield_error_maps_to_field_validation() {
        let err: AppError = YieldError::InvalidInput {
            field: "soil_ph".into(),
            message: "out of range".into(),
        }
        .into();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "soil_ph"));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_classifier_unavailable_is_unprocessable() {
        let response = AppError::ClassifierUnavailable.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_worker_failure_is_internal() {
        let response = AppError::Internal("Worker task failed".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"]["code"], "INTERNAL_ERROR");
    }
}

//! Error handling

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::features::ResolveError;
use crate::model::InferenceError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    // Readiness
    #[error("Model or scaler not loaded on server. Check logs.")]
    ServiceNotReady,

    // Client errors
    #[error("{0}")]
    MalformedPayload(String),

    #[error(transparent)]
    NonNumericFeature(#[from] ResolveError),

    // Model errors
    #[error(transparent)]
    Inference(#[from] InferenceError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MalformedPayload(_) | AppError::NonNumericFeature(_) => StatusCode::BAD_REQUEST,
            AppError::ServiceNotReady | AppError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = self.to_string();

        match &self {
            AppError::Inference(_) => tracing::error!("Inference error: {}", detail),
            AppError::ServiceNotReady => tracing::warn!("Rejected request: service not ready"),
            _ => tracing::debug!("Rejected request: {}", detail),
        }

        let body = Json(json!({
            "detail": detail,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::resolver::InputValue;

    #[test]
    fn test_client_and_server_errors_split() {
        let non_numeric = AppError::from(ResolveError::NonNumericFeature {
            feature: "s3".to_string(),
            raw: InputValue::Text("n/a".to_string()),
        });
        assert_eq!(non_numeric.status(), StatusCode::BAD_REQUEST);
        assert_eq!(non_numeric.to_string(), "Feature 's3' has non-numeric value: n/a");

        assert_eq!(AppError::MalformedPayload("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::ServiceNotReady.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            AppError::from(InferenceError::PredictionFailed("boom".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}

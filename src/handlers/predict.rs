//! Prediction handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::Value;

use crate::service::{PredictionResponse, MALFORMED_PAYLOAD};
use crate::{AppError, AppResult, AppState};

/// POST /predict with `{"data": {<feature or alias>: <number>, ...}}`
pub async fn predict(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<PredictionResponse>> {
    if !state.service.is_ready() {
        return Err(AppError::ServiceNotReady);
    }

    let Json(body) = body.map_err(|rejection| {
        tracing::debug!("Rejected body: {}", rejection.body_text());
        AppError::MalformedPayload(MALFORMED_PAYLOAD.to_string())
    })?;

    state.service.predict(body).map(Json)
}

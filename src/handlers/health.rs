//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::service::{ArtifactFingerprints, ServiceState};
use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    features_count: usize,
    model_path: Option<String>,
    scaler_path: Option<String>,
    features_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model_kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fingerprints: Option<ArtifactFingerprints>,
    #[serde(skip_serializing_if = "Option::is_none")]
    loaded_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    timestamp: i64,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let service = state.service.as_ref();
    let paths = service.paths();

    let (model_kind, fingerprints, loaded_at, reason) = match service {
        ServiceState::Ready(ctx) => (
            Some(ctx.adapter.predictor_kind()),
            Some(ctx.fingerprints.clone()),
            Some(ctx.loaded_at.timestamp()),
            None,
        ),
        ServiceState::Unready { reason, .. } => (None, None, None, Some(reason.clone())),
    };

    Json(HealthResponse {
        status: if service.is_ready() { "ok" } else { "error" },
        version: env!("CARGO_PKG_VERSION"),
        features_count: service.features_count(),
        model_path: paths.map(|p| p.model.display().to_string()),
        scaler_path: paths.map(|p| p.scaler.display().to_string()),
        features_path: paths.map(|p| p.features.display().to_string()),
        model_kind,
        fingerprints,
        loaded_at,
        reason,
        timestamp: chrono::Utc::now().timestamp(),
    })
}

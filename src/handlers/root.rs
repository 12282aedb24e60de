//! Usage hint

use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct RootResponse {
    message: &'static str,
    note: &'static str,
    health: &'static str,
    info: &'static str,
}

pub async fn index() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Predictive Maintenance RUL API. Use /predict to POST sensor values.",
        note: "This API expects feature names (s1..s21 and op_setting1..3) or human-readable names.",
        health: "/health",
        info: "/info",
    })
}

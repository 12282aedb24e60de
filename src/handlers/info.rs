//! Feature discovery handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::service::ServiceContext;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct FeatureInfo {
    pub internal_name: String,
    pub readable_aliases: Vec<String>,
}

#[derive(Serialize)]
pub struct InfoResponse {
    model_loaded: bool,
    features: Vec<FeatureInfo>,
    note: &'static str,
}

/// One entry per schema slot, in schema order
pub fn describe(ctx: &ServiceContext) -> Vec<FeatureInfo> {
    ctx.schema
        .ordered()
        .iter()
        .map(|feature| FeatureInfo {
            internal_name: feature.clone(),
            readable_aliases: ctx.aliases.aliases_for(feature).to_vec(),
        })
        .collect()
}

pub async fn features(State(state): State<AppState>) -> Json<InfoResponse> {
    let ctx = state.service.context();

    Json(InfoResponse {
        model_loaded: ctx.is_some(),
        features: ctx.map(describe).unwrap_or_default(),
        note: "You can supply either internal_name or one of readable_aliases in /predict payload.",
    })
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::handlers::testing::{get, send};
    use crate::service::{tests::ready_state, ServiceState};

    #[tokio::test]
    async fn test_info_lists_schema_with_aliases() {
        let (status, body) = send(ready_state(), get("/info")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["model_loaded"], true);
        assert_eq!(
            body["features"],
            json!([
                {"internal_name": "op_setting1", "readable_aliases": ["Altitude_factor"]},
                {"internal_name": "s1", "readable_aliases": []},
            ])
        );
    }

    #[tokio::test]
    async fn test_info_unready_is_empty() {
        let (_, body) = send(ServiceState::unready("not loaded"), get("/info")).await;
        assert_eq!(body["model_loaded"], false);
        assert_eq!(body["features"], json!([]));
    }
}

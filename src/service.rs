//! Prediction Service - readiness state and per-request orchestration
//!
//! `ServiceState` is built once at startup and never changes afterwards:
//! handlers see either a fully loaded `Ready` context or `Unready`.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::features::{AliasRegistry, FeatureSchema, InputPayload, VectorResolver};
use crate::model::InferenceAdapter;

pub const MALFORMED_PAYLOAD: &str = "`data` must be an object/dict of feature:value pairs";

// ============================================================================
// STATE
// ============================================================================

/// Where the artifacts were found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub scaler: PathBuf,
    pub features: PathBuf,
}

/// SHA-256 of each loaded artifact
#[derive(Debug, Clone, Default, Serialize)]
pub struct ArtifactFingerprints {
    pub model_sha256: String,
    pub scaler_sha256: String,
    pub features_sha256: String,
}

/// Everything a request needs, read-only after startup
pub struct ServiceContext {
    pub schema: FeatureSchema,
    pub aliases: AliasRegistry,
    pub adapter: InferenceAdapter,
    pub paths: Option<ArtifactPaths>,
    pub fingerprints: ArtifactFingerprints,
    pub loaded_at: DateTime<Utc>,
}

impl ServiceContext {
    pub fn new(schema: FeatureSchema, aliases: AliasRegistry, adapter: InferenceAdapter) -> Self {
        Self {
            schema,
            aliases,
            adapter,
            paths: None,
            fingerprints: ArtifactFingerprints::default(),
            loaded_at: Utc::now(),
        }
    }
}

pub enum ServiceState {
    Ready(ServiceContext),
    Unready {
        reason: String,
        /// Set when artifacts were found but failed to load
        paths: Option<ArtifactPaths>,
    },
}

/// Body of a successful `/predict`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResponse {
    #[serde(rename = "Predicted_RUL")]
    pub predicted_rul: f64,
    pub missing_filled_with_zero: Vec<String>,
}

impl ServiceState {
    pub fn unready(reason: impl Into<String>) -> Self {
        ServiceState::Unready {
            reason: reason.into(),
            paths: None,
        }
    }

    pub fn context(&self) -> Option<&ServiceContext> {
        match self {
            ServiceState::Ready(ctx) => Some(ctx),
            ServiceState::Unready { .. } => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.context().is_some()
    }

    pub fn paths(&self) -> Option<&ArtifactPaths> {
        match self {
            ServiceState::Ready(ctx) => ctx.paths.as_ref(),
            ServiceState::Unready { paths, .. } => paths.as_ref(),
        }
    }

    pub fn features_count(&self) -> usize {
        self.context().map_or(0, |ctx| ctx.schema.len())
    }

    /// Resolve `body.data`, run inference, shape the response
    pub fn predict(&self, body: Value) -> AppResult<PredictionResponse> {
        let ctx = self.context().ok_or(AppError::ServiceNotReady)?;

        let payload = extract_payload(body)?;
        let resolution = VectorResolver::new(&ctx.schema, &ctx.aliases).resolve(&payload)?;

        if !resolution.missing.is_empty() {
            tracing::warn!(
                "Filled {} missing feature(s) with zero: {:?}",
                resolution.missing.len(),
                resolution.missing
            );
        }

        let rul = ctx.adapter.infer(&resolution.vector)?;
        tracing::debug!("Predicted RUL {:.3} from {} supplied keys", rul, payload.len());

        Ok(PredictionResponse {
            predicted_rul: rul,
            missing_filled_with_zero: resolution.missing,
        })
    }
}

/// `{"data": {...}}` -> payload
fn extract_payload(body: Value) -> AppResult<InputPayload> {
    let data = match body {
        Value::Object(mut map) => map.remove("data"),
        _ => None,
    };

    data.and_then(InputPayload::from_json)
        .ok_or_else(|| AppError::MalformedPayload(MALFORMED_PAYLOAD.to_string()))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::inference::tests::{ShiftNormalizer, SumPredictor};
    use serde_json::json;

    /// Ready state over `["op_setting1", "s1"]`, identity scaler, row-sum model
    pub(crate) fn ready_state() -> ServiceState {
        let schema = FeatureSchema::new(["op_setting1", "s1"]).unwrap();
        let aliases = AliasRegistry::new([("Altitude_factor", "op_setting1")]);
        let adapter = InferenceAdapter::new(
            Box::new(ShiftNormalizer(0.0)),
            Box::new(SumPredictor { extra_rows: 0 }),
        );
        ServiceState::Ready(ServiceContext::new(schema, aliases, adapter))
    }

    #[test]
    fn test_predict_with_alias_reports_missing() {
        let state = ready_state();
        let response = state.predict(json!({"data": {"Altitude_factor": 3.0}})).unwrap();

        assert_eq!(response.predicted_rul, 3.0);
        assert_eq!(response.missing_filled_with_zero, vec!["s1".to_string()]);
    }

    #[test]
    fn test_unready_rejects_everything() {
        let state = ServiceState::unready("Model artifacts not found");
        for body in [json!({"data": {"s1": 1.0}}), json!("garbage")] {
            assert!(matches!(state.predict(body), Err(AppError::ServiceNotReady)));
        }
        assert_eq!(state.features_count(), 0);
    }

    #[test]
    fn test_malformed_payloads() {
        let state = ready_state();
        for body in [json!([1, 2]), json!({"values": {}}), json!({"data": [1.0, 2.0]}), json!({"data": "s1=1"})] {
            assert!(matches!(state.predict(body), Err(AppError::MalformedPayload(_))));
        }
    }

    #[test]
    fn test_non_numeric_is_client_error() {
        let state = ready_state();
        let err = state.predict(json!({"data": {"s1": "broken"}})).unwrap_err();
        assert!(matches!(err, AppError::NonNumericFeature(_)));
        assert!(err.to_string().contains("'s1'"));
    }

    #[test]
    fn test_repeated_requests_identical() {
        let state = ready_state();
        let body = json!({"data": {"op_setting1": 0.25, "s1": 641.82, "unrelated": "x"}});
        assert_eq!(state.predict(body.clone()).unwrap(), state.predict(body).unwrap());
    }
}

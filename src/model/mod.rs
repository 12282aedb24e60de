//! Model Module - RUL inference
//!
//! The adapter only sees the `Normalizer` / `Predictor` traits; concrete
//! backends (scalers, linear, XGBoost JSON, ONNX) live beside it.

pub mod inference;
pub mod scaler;
pub mod linear;
pub mod xgboost;
#[cfg(feature = "onnx")]
pub mod onnx;

use std::path::{Path, PathBuf};

use thiserror::Error;

pub use inference::{InferenceAdapter, InferenceError, Normalizer, Predictor};
pub use linear::LinearModel;
pub use scaler::Scaler;
pub use xgboost::XgbModel;

/// Failure to read or interpret a scaler/model artifact
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Invalid(String),

    #[error("ONNX runtime error: {0}")]
    Onnx(String),
}

pub(crate) fn read_artifact(path: &Path) -> Result<String, ArtifactError> {
    std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a model, picking the backend from the file
///
/// - `*.onnx` -> ONNX Runtime (requires the `onnx` feature)
/// - JSON with a `learner` root -> XGBoost
/// - other JSON -> linear model
pub fn load_predictor(path: &Path) -> Result<Box<dyn Predictor>, ArtifactError> {
    let is_onnx = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("onnx"));

    if is_onnx {
        return load_onnx(path);
    }

    let value: serde_json::Value = serde_json::from_str(&read_artifact(path)?)?;
    if XgbModel::is_document(&value) {
        let model = XgbModel::from_value(value)?;
        tracing::info!("XGBoost model loaded: {} trees", model.tree_count());
        Ok(Box::new(model))
    } else {
        Ok(Box::new(LinearModel::from_value(value)?))
    }
}

#[cfg(feature = "onnx")]
fn load_onnx(path: &Path) -> Result<Box<dyn Predictor>, ArtifactError> {
    Ok(Box::new(onnx::OnnxModel::load(path)?))
}

#[cfg(not(feature = "onnx"))]
fn load_onnx(path: &Path) -> Result<Box<dyn Predictor>, ArtifactError> {
    Err(ArtifactError::Onnx(format!(
        "{} is an ONNX model but this build has no `onnx` feature",
        path.display()
    )))
}

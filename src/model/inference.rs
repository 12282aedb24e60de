//! Inference Adapter - normalize, predict, pick the scalar
//!
//! Scaler and model are black boxes behind the `Normalizer` / `Predictor`
//! traits so backends can be swapped without touching request handling.

use std::time::Instant;

use ndarray::{Array1, Array2, ArrayView2};
use thiserror::Error;

/// Failure raised by an external collaborator
pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync>;

// ============================================================================
// COLLABORATOR TRAITS
// ============================================================================

/// Fitted normalization transform (one row per sample)
pub trait Normalizer: Send + Sync {
    /// Input width the transform was fit with, if known
    fn n_features(&self) -> Option<usize> {
        None
    }

    fn transform(&self, batch: ArrayView2<'_, f64>) -> Result<Array2<f64>, CollaboratorError>;
}

/// Fitted regression model, one output per row
pub trait Predictor: Send + Sync {
    /// Input width the model was trained with, if known
    fn n_features(&self) -> Option<usize> {
        None
    }

    /// Short backend name for logs and `/health`
    fn kind(&self) -> &'static str;

    fn predict(&self, batch: ArrayView2<'_, f64>) -> Result<Array1<f64>, CollaboratorError>;
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, Error, PartialEq)]
pub enum InferenceError {
    #[error("Scaler transform failed: {0}")]
    NormalizationFailed(String),

    #[error("Model prediction failed: {0}")]
    PredictionFailed(String),
}

// ============================================================================
// ADAPTER
// ============================================================================

pub struct InferenceAdapter {
    normalizer: Box<dyn Normalizer>,
    predictor: Box<dyn Predictor>,
}

impl InferenceAdapter {
    pub fn new(normalizer: Box<dyn Normalizer>, predictor: Box<dyn Predictor>) -> Self {
        Self { normalizer, predictor }
    }

    pub fn predictor_kind(&self) -> &'static str {
        self.predictor.kind()
    }

    /// Predict RUL for a single resolved vector
    pub fn infer(&self, vector: &[f64]) -> Result<f64, InferenceError> {
        let start_time = Instant::now();

        let row = ArrayView2::from_shape((1, vector.len()), vector)
            .map_err(|e| InferenceError::NormalizationFailed(e.to_string()))?;

        let scaled = self
            .normalizer
            .transform(row)
            .map_err(|e| InferenceError::NormalizationFailed(e.to_string()))?;

        let output = self
            .predictor
            .predict(scaled.view())
            .map_err(|e| InferenceError::PredictionFailed(e.to_string()))?;

        // Batch-shaped output for a one-row batch: take row 0
        let rul = output
            .first()
            .copied()
            .ok_or_else(|| InferenceError::PredictionFailed("model returned no output".to_string()))?;

        if !rul.is_finite() {
            return Err(InferenceError::PredictionFailed(format!("model returned non-finite value {}", rul)));
        }

        tracing::debug!(
            "Inference done in {}us ({})",
            start_time.elapsed().as_micros(),
            self.predictor.kind()
        );

        Ok(rul)
    }
}

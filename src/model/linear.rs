//! Linear regression model
//!
//! `{"coefficients": [...], "intercept": 0.0}`

use ndarray::{Array1, ArrayView2};
use serde::Deserialize;

use super::inference::{CollaboratorError, Predictor};
use super::ArtifactError;

#[derive(Debug, Clone, Deserialize)]
struct LinearParams {
    coefficients: Vec<f64>,
    #[serde(default)]
    intercept: f64,
}

#[derive(Debug, Clone)]
pub struct LinearModel {
    coefficients: Array1<f64>,
    intercept: f64,
}

impl LinearModel {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Result<Self, ArtifactError> {
        if coefficients.is_empty() {
            return Err(ArtifactError::Invalid("linear model has no coefficients".to_string()));
        }
        Ok(Self {
            coefficients: Array1::from(coefficients),
            intercept,
        })
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, ArtifactError> {
        let params: LinearParams = serde_json::from_value(value)?;
        Self::new(params.coefficients, params.intercept)
    }
}

impl Predictor for LinearModel {
    fn n_features(&self) -> Option<usize> {
        Some(self.coefficients.len())
    }

    fn kind(&self) -> &'static str {
        "linear"
    }

    fn predict(&self, batch: ArrayView2<'_, f64>) -> Result<Array1<f64>, CollaboratorError> {
        if batch.ncols() != self.coefficients.len() {
            return Err(format!(
                "feature shape mismatch, expected: {}, got {}",
                self.coefficients.len(),
                batch.ncols()
            )
            .into());
        }
        Ok(batch.dot(&self.coefficients) + self.intercept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use serde_json::json;

    #[test]
    fn test_predict_per_row() {
        let model = LinearModel::from_value(json!({"coefficients": [2.0, -1.0], "intercept": 100.0})).unwrap();
        let out = model.predict(array![[1.0, 1.0], [0.0, 10.0]].view()).unwrap();
        assert_eq!(out, array![101.0, 90.0]);
    }

    #[test]
    fn test_width_mismatch() {
        let model = LinearModel::new(vec![1.0; 4], 0.0).unwrap();
        assert!(model.predict(array![[1.0, 2.0]].view()).is_err());
    }
}

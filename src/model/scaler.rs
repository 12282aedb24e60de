//! Feature scalers fitted at training time
//!
//! Stored as JSON, tagged by `kind`:
//!
//! ```json
//! {"kind": "standard", "mean": [...], "scale": [...]}
//! {"kind": "min_max", "data_min": [...], "data_max": [...], "feature_range": [0, 1]}
//! ```

use std::path::Path;

use ndarray::{Array1, Array2, ArrayView2};
use serde::Deserialize;

use super::inference::{CollaboratorError, Normalizer};
use super::ArtifactError;

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum ScalerParams {
    Standard {
        mean: Vec<f64>,
        scale: Vec<f64>,
    },
    MinMax {
        data_min: Vec<f64>,
        data_max: Vec<f64>,
        #[serde(default = "default_feature_range")]
        feature_range: (f64, f64),
    },
}

fn default_feature_range() -> (f64, f64) {
    (0.0, 1.0)
}

/// Affine per-column transform: `x * scale + offset`
#[derive(Debug, Clone)]
pub struct Scaler {
    kind: &'static str,
    scale: Array1<f64>,
    offset: Array1<f64>,
}

impl Scaler {
    /// Zero-mean, unit-variance. A zero `scale` entry is treated as 1.
    pub fn standard(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self, ArtifactError> {
        if mean.len() != scale.len() {
            return Err(ArtifactError::Invalid(format!(
                "standard scaler has {} means but {} scales",
                mean.len(),
                scale.len()
            )));
        }

        let inv: Array1<f64> = scale.iter().map(|&s| 1.0 / non_zero(s)).collect();
        let offset: Array1<f64> = mean.iter().zip(inv.iter()).map(|(m, i)| -m * i).collect();

        Self::checked("standard", inv, offset)
    }

    /// Maps `[data_min, data_max]` onto `feature_range`. A zero range is treated as 1.
    pub fn min_max(data_min: Vec<f64>, data_max: Vec<f64>, feature_range: (f64, f64)) -> Result<Self, ArtifactError> {
        if data_min.len() != data_max.len() {
            return Err(ArtifactError::Invalid(format!(
                "min-max scaler has {} minimums but {} maximums",
                data_min.len(),
                data_max.len()
            )));
        }

        let (lo, hi) = feature_range;
        if lo >= hi {
            return Err(ArtifactError::Invalid(format!("invalid feature_range ({}, {})", lo, hi)));
        }

        let scale: Array1<f64> = data_min
            .iter()
            .zip(&data_max)
            .map(|(min, max)| (hi - lo) / non_zero(max - min))
            .collect();
        let offset: Array1<f64> = data_min.iter().zip(scale.iter()).map(|(min, s)| lo - min * s).collect();

        Self::checked("min_max", scale, offset)
    }

    pub fn from_json(text: &str) -> Result<Self, ArtifactError> {
        match serde_json::from_str(text)? {
            ScalerParams::Standard { mean, scale } => Self::standard(mean, scale),
            ScalerParams::MinMax { data_min, data_max, feature_range } => {
                Self::min_max(data_min, data_max, feature_range)
            }
        }
    }

    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        Self::from_json(&super::read_artifact(path)?)
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    fn checked(kind: &'static str, scale: Array1<f64>, offset: Array1<f64>) -> Result<Self, ArtifactError> {
        if scale.is_empty() {
            return Err(ArtifactError::Invalid(format!("{} scaler has no columns", kind)));
        }
        if scale.iter().chain(offset.iter()).any(|v| !v.is_finite()) {
            return Err(ArtifactError::Invalid(format!("{} scaler has non-finite parameters", kind)));
        }
        Ok(Self { kind, scale, offset })
    }
}

fn non_zero(v: f64) -> f64 {
    if v == 0.0 {
        1.0
    } else {
        v
    }
}

impl Normalizer for Scaler {
    fn n_features(&self) -> Option<usize> {
        Some(self.scale.len())
    }

    fn transform(&self, batch: ArrayView2<'_, f64>) -> Result<Array2<f64>, CollaboratorError> {
        if batch.ncols() != self.scale.len() {
            return Err(format!(
                "X has {} features, but scaler is expecting {} features as input",
                batch.ncols(),
                self.scale.len()
            )
            .into());
        }
        Ok(&batch * &self.scale + &self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_standard_transform() {
        let scaler = Scaler::from_json(r#"{"kind": "standard", "mean": [10.0, 0.0], "scale": [2.0, 0.0]}"#).unwrap();
        let out = scaler.transform(array![[14.0, 3.0]].view()).unwrap();
        assert_eq!(out, array![[2.0, 3.0]]);
    }

    #[test]
    fn test_min_max_transform() {
        let scaler = Scaler::from_json(r#"{"kind": "min_max", "data_min": [0.0, 5.0], "data_max": [10.0, 5.0]}"#).unwrap();
        let out = scaler.transform(array![[5.0, 7.0]].view()).unwrap();
        assert_eq!(out, array![[0.5, 2.0]]);
    }

    #[test]
    fn test_min_max_custom_range() {
        let scaler = Scaler::min_max(vec![0.0], vec![4.0], (-1.0, 1.0)).unwrap();
        let out = scaler.transform(array![[1.0]].view()).unwrap();
        assert_eq!(out, array![[-0.5]]);
    }

    #[test]
    fn test_width_mismatch_fails() {
        let scaler = Scaler::standard(vec![0.0; 3], vec![1.0; 3]).unwrap();
        let err = scaler.transform(array![[1.0, 2.0]].view()).unwrap_err();
        assert!(err.to_string().contains("expecting 3"));
    }

    #[test]
    fn test_malformed_params_rejected() {
        assert!(Scaler::standard(vec![0.0; 2], vec![1.0]).is_err());
        assert!(Scaler::standard(vec![], vec![]).is_err());
        assert!(Scaler::from_json(r#"{"kind": "robust", "center": [0.0]}"#).is_err());
    }
}

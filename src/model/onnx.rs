//! ONNX Runtime backend
//!
//! For models exported with onnxmltools / skl2onnx: one f32 input of shape
//! `[batch, n_features]`, first output holds one value per row.

use std::path::Path;

use ndarray::{Array1, Array2, ArrayView2};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;

use super::inference::{CollaboratorError, Predictor};
use super::ArtifactError;

pub struct OnnxModel {
    session: Mutex<Session>,
    output_name: String,
}

impl OnnxModel {
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        tracing::info!("Loading ONNX model from: {}", path.display());

        let session = Session::builder()
            .map_err(|e| ArtifactError::Onnx(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ArtifactError::Onnx(format!("Failed to set optimization: {}", e)))?
            .commit_from_file(path)
            .map_err(|e| ArtifactError::Onnx(format!("Failed to load model: {}", e)))?;

        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| ArtifactError::Onnx("No output defined".to_string()))?;

        Ok(Self {
            session: Mutex::new(session),
            output_name,
        })
    }
}

impl Predictor for OnnxModel {
    fn kind(&self) -> &'static str {
        "onnx"
    }

    fn predict(&self, batch: ArrayView2<'_, f64>) -> Result<Array1<f64>, CollaboratorError> {
        let rows = batch.nrows();
        let input: Array2<f32> = batch.mapv(|v| v as f32);
        let input_tensor = Value::from_array(input)?;

        let mut session = self.session.lock();
        let outputs = session.run(ort::inputs![input_tensor])?;
        let output = outputs
            .get(&self.output_name)
            .ok_or("No output")?;

        let (_, data) = output.try_extract_tensor::<f32>()?;
        if data.len() < rows {
            return Err(format!("expected {} outputs, got {}", rows, data.len()).into());
        }

        // `[rows]` or `[rows, 1]` both flatten to one value per row
        let per_row = data.len() / rows;
        Ok((0..rows).map(|r| f64::from(data[r * per_row])).collect())
    }
}

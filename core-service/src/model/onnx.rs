//! ONNX autoencoder - ONNX Runtime Integration
//!
//! The session is created once at load. ONNX Runtime needs exclusive access
//! to run, so concurrent requests serialize on the session lock.

use std::path::Path;

use ndarray::{Array2, ArrayView2};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;

use super::Reconstructor;
use crate::error::ModelError;

/// Autoencoder exported to ONNX with a `[batch, features]` input
pub struct OnnxAutoencoder {
    session: Mutex<Session>,
    output_name: String,
    input_dim: usize,
}

impl std::fmt::Debug for OnnxAutoencoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxAutoencoder")
            .field("output_name", &self.output_name)
            .field("input_dim", &self.input_dim)
            .finish()
    }
}

impl OnnxAutoencoder {
    /// Load ONNX model from file
    pub fn load(model_path: &Path, input_dim: usize) -> Result<Self, ModelError> {
        log::info!("Loading ONNX model from: {}", model_path.display());

        if !model_path.exists() {
            return Err(ModelError::NotFound(model_path.to_path_buf()));
        }

        let session = Session::builder()
            .map_err(|e| ModelError::Inference(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ModelError::Inference(format!("Failed to set optimization: {}", e)))?
            .commit_from_file(model_path)
            .map_err(|e| ModelError::Inference(format!("Failed to load model: {}", e)))?;

        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| ModelError::Inference("No output defined".to_string()))?;

        log::info!("ONNX model loaded successfully (output: {})", output_name);

        Ok(Self {
            session: Mutex::new(session),
            output_name,
            input_dim,
        })
    }
}

impl Reconstructor for OnnxAutoencoder {
    fn backend(&self) -> &'static str {
        "onnx"
    }

    fn input_dim(&self) -> usize {
        self.input_dim
    }

    fn reconstruct(&self, input: ArrayView2<f32>) -> Result<Array2<f32>, ModelError> {
        let (rows, cols) = input.dim();
        if cols != self.input_dim {
            return Err(ModelError::DimensionMismatch {
                expected: self.input_dim,
                actual: cols,
            });
        }

        let input_tensor = Value::from_array(input.to_owned())
            .map_err(|e| ModelError::Inference(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| ModelError::Inference(format!("Inference failed: {}", e)))?;

        let output = outputs
            .get(&self.output_name)
            .ok_or_else(|| ModelError::Inference("No output".to_string()))?;

        let (_, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| ModelError::Inference(format!("Extract error: {}", e)))?;

        if data.len() != rows * cols {
            return Err(ModelError::Inference(format!(
                "output has {} values, expected {}",
                data.len(),
                rows * cols
            )));
        }

        Array2::from_shape_vec((rows, cols), data.to_vec())
            .map_err(|e| ModelError::Inference(format!("Array error: {}", e)))
    }
}

//! Model Module - Autoencoder Anomaly Detection
//!
//! The detector wraps an opaque [`Reconstructor`] (dense MLP or ONNX) loaded
//! once per process. Scoring is reconstruction MSE against a threshold fixed
//! at load time.

pub mod artifact;
pub mod dense;
pub mod detector;
pub mod onnx;
pub mod threshold;

use ndarray::{Array2, ArrayView2};

use crate::error::ModelError;

// Re-export common types
pub use artifact::{BackendSpec, ModelManifest};
pub use dense::{Activation, DenseAutoencoder, DenseLayer};
pub use detector::{AnomalyDetector, AnomalyScore, ModelInfo, ThresholdSource};
pub use onnx::OnnxAutoencoder;
pub use threshold::calibrate_threshold;

/// Trait for reconstruction models (dense MLP, ONNX, ...)
///
/// Implementations are shared read-only across concurrent requests.
pub trait Reconstructor: Send + Sync {
    /// Backend name for logs and reports
    fn backend(&self) -> &'static str;

    /// Expected feature dimension
    fn input_dim(&self) -> usize;

    /// Reconstruct every row of `input`; output has the same shape
    fn reconstruct(&self, input: ArrayView2<f32>) -> Result<Array2<f32>, ModelError>;
}

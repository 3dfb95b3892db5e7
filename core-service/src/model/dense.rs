//! Dense MLP autoencoder evaluated with ndarray
//!
//! Weights are exported from the offline training job as JSON, one entry per
//! layer with `weights` shaped `[out][in]`.

use ndarray::{Array1, Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use super::Reconstructor;
use crate::error::ModelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    #[default]
    Identity,
    Relu,
    Sigmoid,
    Tanh,
}

impl Activation {
    fn apply(self, x: f32) -> f32 {
        match self {
            Activation::Identity => x,
            Activation::Relu => x.max(0.0),
            Activation::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Activation::Tanh => x.tanh(),
        }
    }
}

/// Serialized layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseLayer {
    pub weights: Vec<Vec<f32>>,
    pub bias: Vec<f32>,
    #[serde(default)]
    pub activation: Activation,
}

#[derive(Debug, Clone)]
struct Layer {
    /// out × in
    weights: Array2<f32>,
    bias: Array1<f32>,
    activation: Activation,
}

/// Feed-forward autoencoder
#[derive(Debug, Clone)]
pub struct DenseAutoencoder {
    layers: Vec<Layer>,
    input_dim: usize,
}

impl DenseAutoencoder {
    /// Validate shapes and build the network
    pub fn from_layers(spec: &[DenseLayer]) -> Result<Self, ModelError> {
        let first = spec
            .first()
            .ok_or_else(|| ModelError::Weights("autoencoder has no layers".into()))?;
        let input_dim = first.weights.first().map(Vec::len).unwrap_or(0);
        if input_dim == 0 {
            return Err(ModelError::Weights("first layer has no inputs".into()));
        }

        let mut layers = Vec::with_capacity(spec.len());
        let mut fan_in = input_dim;

        for (i, layer) in spec.iter().enumerate() {
            let out = layer.weights.len();
            if out == 0 || layer.bias.len() != out {
                return Err(ModelError::Weights(format!(
                    "layer {}: {} weight rows but {} biases",
                    i,
                    out,
                    layer.bias.len()
                )));
            }
            if let Some(row) = layer.weights.iter().find(|r| r.len() != fan_in) {
                return Err(ModelError::Weights(format!(
                    "layer {}: expected {} inputs, found a row of {}",
                    i,
                    fan_in,
                    row.len()
                )));
            }

            let flat: Vec<f32> = layer.weights.iter().flatten().copied().collect();
            if flat.iter().chain(&layer.bias).any(|v| !v.is_finite()) {
                return Err(ModelError::Weights(format!("layer {}: non-finite parameter", i)));
            }

            let weights = Array2::from_shape_vec((out, fan_in), flat)
                .map_err(|e| ModelError::Weights(format!("layer {}: {}", i, e)))?;

            layers.push(Layer {
                weights,
                bias: Array1::from_vec(layer.bias.clone()),
                activation: layer.activation,
            });
            fan_in = out;
        }

        if fan_in != input_dim {
            return Err(ModelError::Weights(format!(
                "output dimension {} differs from input dimension {}",
                fan_in, input_dim
            )));
        }

        Ok(Self { layers, input_dim })
    }
}

impl Reconstructor for DenseAutoencoder {
    fn backend(&self) -> &'static str {
        "dense"
    }

    fn input_dim(&self) -> usize {
        self.input_dim
    }

    fn reconstruct(&self, input: ArrayView2<f32>) -> Result<Array2<f32>, ModelError> {
        if input.ncols() != self.input_dim {
            return Err(ModelError::DimensionMismatch {
                expected: self.input_dim,
                actual: input.ncols(),
            });
        }

        let mut activations = input.to_owned();
        for layer in &self.layers {
            let mut z = activations.dot(&layer.weights.t());
            z += &layer.bias;
            let act = layer.activation;
            z.mapv_inplace(|v| act.apply(v));
            activations = z;
        }

        Ok(activations)
    }
}

//! Cluster Engine - K-means over the feature matrix
//!
//! Labels are opaque group ids in `[0, effective_k)`, one per packet in input
//! order. Results are reproducible for a fixed seed and input matrix.

pub mod kmeans;

use ndarray::Array2;
use serde::Serialize;

pub use kmeans::KMeans;

/// Per-packet cluster labels plus how the run went
#[derive(Debug, Clone, Serialize)]
pub struct ClusterAssignment {
    pub labels: Vec<usize>,
    pub requested_k: usize,
    pub effective_k: usize,
    /// Fewer packets than requested clusters; k was reduced
    pub degenerate: bool,
    pub iterations: usize,
    pub converged: bool,
    #[serde(skip)]
    pub centroids: Array2<f32>,
}

impl ClusterAssignment {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Number of packets assigned to each cluster
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.effective_k];
        for &label in &self.labels {
            sizes[label] += 1;
        }
        sizes
    }
}

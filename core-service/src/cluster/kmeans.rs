//! Lloyd's K-means with seeded k-means++ initialization
//!
//! - Assignment: nearest centroid by Euclidean distance, ties go to the
//!   lowest centroid index.
//! - Update: mean of assigned points; a centroid with no points keeps its
//!   previous position.
//! - Stops when no label changes or after `max_iter` rounds.

use ndarray::{Array2, ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::ClusterAssignment;
use crate::constants::{DEFAULT_CLUSTER_COUNT, DEFAULT_KMEANS_MAX_ITER, DEFAULT_KMEANS_SEED};

/// K-means settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KMeans {
    pub k: usize,
    pub seed: u64,
    pub max_iter: usize,
}

impl Default for KMeans {
    fn default() -> Self {
        Self {
            k: DEFAULT_CLUSTER_COUNT,
            seed: DEFAULT_KMEANS_SEED,
            max_iter: DEFAULT_KMEANS_MAX_ITER,
        }
    }
}

impl KMeans {
    pub fn new(k: usize, seed: u64, max_iter: usize) -> Self {
        Self {
            k: k.max(1),
            seed,
            max_iter: max_iter.max(1),
        }
    }

    /// Cluster the rows of `data`
    pub fn fit(&self, data: ArrayView2<f32>) -> ClusterAssignment {
        let n = data.nrows();

        if n < self.k {
            log::info!(
                "K-means: {} packets for k={}, reducing to one packet per cluster",
                n,
                self.k
            );
            return ClusterAssignment {
                labels: (0..n).collect(),
                requested_k: self.k,
                effective_k: n,
                degenerate: true,
                iterations: 0,
                converged: true,
                centroids: data.to_owned(),
            };
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut centroids = init_plus_plus(data, self.k, &mut rng);

        let mut labels = vec![usize::MAX; n];
        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.max_iter {
            iterations += 1;

            let mut changed = false;
            for (label, point) in labels.iter_mut().zip(data.rows()) {
                let nearest = nearest_centroid(point, &centroids);
                if *label != nearest {
                    *label = nearest;
                    changed = true;
                }
            }

            if !changed {
                converged = true;
                break;
            }

            update_centroids(data, &labels, &mut centroids);
        }

        log::debug!(
            "K-means: k={} n={} iterations={} converged={}",
            self.k,
            n,
            iterations,
            converged
        );

        ClusterAssignment {
            labels,
            requested_k: self.k,
            effective_k: self.k,
            degenerate: false,
            iterations,
            converged,
            centroids,
        }
    }
}

fn squared_distance(a: ArrayView1<f32>, b: ArrayView1<f32>) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Strict `<` keeps the lowest index on ties
fn nearest_centroid(point: ArrayView1<f32>, centroids: &Array2<f32>) -> usize {
    let mut best = 0;
    let mut best_dist = f32::INFINITY;
    for (c, centroid) in centroids.rows().into_iter().enumerate() {
        let dist = squared_distance(point, centroid);
        if dist < best_dist {
            best = c;
            best_dist = dist;
        }
    }
    best
}

/// k-means++: first centroid uniform, then proportional to squared distance
fn init_plus_plus(data: ArrayView2<f32>, k: usize, rng: &mut StdRng) -> Array2<f32> {
    let n = data.nrows();
    let mut centroids = Array2::<f32>::zeros((k, data.ncols()));

    let first = rng.gen_range(0..n);
    centroids.row_mut(0).assign(&data.row(first));

    let mut min_dist: Vec<f32> = data
        .rows()
        .into_iter()
        .map(|p| squared_distance(p, centroids.row(0)))
        .collect();

    for c in 1..k {
        let total: f64 = min_dist.iter().map(|&d| d as f64).sum();

        let chosen = if total > 0.0 {
            let mut target = rng.gen::<f64>() * total;
            let fallback = min_dist.iter().rposition(|&d| d > 0.0).unwrap_or(0);
            min_dist
                .iter()
                .position(|&d| {
                    target -= d as f64;
                    target < 0.0
                })
                .unwrap_or(fallback)
        } else {
            // every point sits on a centroid already
            rng.gen_range(0..n)
        };

        centroids.row_mut(c).assign(&data.row(chosen));

        for (dist, point) in min_dist.iter_mut().zip(data.rows()) {
            *dist = dist.min(squared_distance(point, centroids.row(c)));
        }
    }

    centroids
}

fn update_centroids(data: ArrayView2<f32>, labels: &[usize], centroids: &mut Array2<f32>) {
    let k = centroids.nrows();
    let mut sums = Array2::<f64>::zeros((k, data.ncols()));
    let mut counts = vec![0usize; k];

    for (&label, point) in labels.iter().zip(data.rows()) {
        counts[label] += 1;
        for (sum, &v) in sums.row_mut(label).iter_mut().zip(point.iter()) {
            *sum += v as f64;
        }
    }

    for (c, &count) in counts.iter().enumerate() {
        if count == 0 {
            continue;
        }
        for (cell, &sum) in centroids.row_mut(c).iter_mut().zip(sums.row(c).iter()) {
            *cell = (sum / count as f64) as f32;
        }
    }
}

//! Central Configuration Constants
//!
//! Single source of truth for all analyzer defaults.

/// Default number of K-means clusters
pub const DEFAULT_CLUSTER_COUNT: usize = 3;

/// Default seed for k-means++ initialization
pub const DEFAULT_KMEANS_SEED: u64 = 42;

/// Default K-means iteration cap
pub const DEFAULT_KMEANS_MAX_ITER: usize = 300;

/// Default model artifact location (relative to the working directory)
pub const DEFAULT_MODEL_PATH: &str = "models/autoencoder.json";

/// Percentile used when calibrating a threshold from training errors
pub const CALIBRATION_PERCENTILE: f32 = 95.0;

/// Library version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================
// Environment variable names
// ============================================

pub const ENV_CLUSTER_COUNT: &str = "PCAP_CLUSTER_COUNT";
pub const ENV_KMEANS_SEED: &str = "PCAP_KMEANS_SEED";
pub const ENV_KMEANS_MAX_ITER: &str = "PCAP_KMEANS_MAX_ITER";
pub const ENV_MODEL_PATH: &str = "PCAP_MODEL_PATH";
pub const ENV_ANOMALY_THRESHOLD: &str = "PCAP_ANOMALY_THRESHOLD";
pub const ENV_FEATURE_DIM: &str = "PCAP_FEATURE_DIM";
pub const ENV_PARALLEL: &str = "PCAP_PARALLEL";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Parse an environment variable, falling back to `default` when unset or invalid
pub fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

/// Parse an optional environment variable
pub fn env_opt<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.trim().parse().ok())
}

/// Read a boolean flag ("1", "true", "yes", "on" are truthy)
pub fn env_flag(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(v) => matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

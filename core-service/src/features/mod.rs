//! Features Module - Feature Extraction Engine
//!
//! Converts decoded headers into the fixed-layout, normalized matrix consumed
//! by both the cluster engine and the anomaly detector.

pub mod builder;
pub mod layout;
pub mod normalize;

#[cfg(test)]
mod tests;

// Re-export common types
pub use builder::{FeatureBuilder, FeatureMatrix, ProtocolCategory};
pub use layout::{layout_hash, LayoutInfo, FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION};
pub use normalize::NormalizationParams;

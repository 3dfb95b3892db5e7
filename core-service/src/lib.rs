//! pcap-insight core - frame parsing and anomaly analysis pipeline
//!
//! ```text
//! capture bytes ─▶ capture ─▶ decoder ─▶ features ─┬─▶ cluster ─┐
//!                                                  └─▶ model ───┴─▶ report
//! ```
//!
//! The crate is a pure function of (capture bytes, [`AnalyzerConfig`],
//! loaded [`AnomalyDetector`]) to [`AnalysisReport`]. The detector is
//! loaded once per process and shared by reference across requests.

pub mod capture;
pub mod cluster;
pub mod config;
pub mod constants;
pub mod decoder;
pub mod error;
pub mod features;
pub mod model;
pub mod pipeline;
pub mod report;

#[cfg(test)]
mod test_frames;

pub use capture::{read_capture, RawRecord};
pub use cluster::{ClusterAssignment, KMeans};
pub use config::AnalyzerConfig;
pub use decoder::{decode_all, decode_frame, DecodedHeader};
pub use error::{AnalysisError, CaptureError, ErrorKind, ModelError};
pub use features::{FeatureBuilder, FeatureMatrix, FEATURE_COUNT};
pub use model::{AnomalyDetector, AnomalyScore, Reconstructor};
pub use pipeline::{analyze, analyze_records};
pub use report::{AnalysisReport, Summary};

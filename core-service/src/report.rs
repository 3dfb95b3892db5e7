//! Report Aggregator
//!
//! Zips headers, cluster labels and anomaly scores by packet index and tallies
//! protocols in a single pass.

use serde::{Deserialize, Serialize};

use crate::cluster::ClusterAssignment;
use crate::decoder::DecodedHeader;
use crate::error::AnalysisError;
use crate::model::{AnomalyScore, ModelInfo};

/// Independent per-protocol tallies: TCP over IPv4 counts for both
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolCounts {
    #[serde(rename = "IPv4")]
    pub ipv4: usize,
    #[serde(rename = "IPv6")]
    pub ipv6: usize,
    #[serde(rename = "ARP")]
    pub arp: usize,
    #[serde(rename = "TCP")]
    pub tcp: usize,
    #[serde(rename = "UDP")]
    pub udp: usize,
}

/// How clustering went, including reduced k
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusteringSummary {
    pub requested_k: usize,
    pub effective_k: usize,
    pub degenerate: bool,
    pub iterations: usize,
    pub converged: bool,
}

impl From<&ClusterAssignment> for ClusteringSummary {
    fn from(a: &ClusterAssignment) -> Self {
        Self {
            requested_k: a.requested_k,
            effective_k: a.effective_k,
            degenerate: a.degenerate,
            iterations: a.iterations,
            converged: a.converged,
        }
    }
}

/// Detector identity behind the anomaly flags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorSummary {
    pub model: String,
    pub backend: String,
    pub threshold: f32,
}

impl From<&ModelInfo> for DetectorSummary {
    fn from(info: &ModelInfo) -> Self {
        Self {
            model: info.name.clone(),
            backend: info.backend.clone(),
            threshold: info.threshold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_packets: usize,
    pub protocol_counts: ProtocolCounts,
    /// Frames whose ethertype is none of IPv4/IPv6/ARP, or unreadable
    pub other_ethertype: usize,
    pub malformed_frames: usize,
    pub anomalies: usize,
    pub clustering: ClusteringSummary,
    pub detector: DetectorSummary,
}

/// Complete analysis payload, every sequence indexed by packet
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub ethernet_headers: Vec<DecodedHeader>,
    pub kmeans_labels: Vec<usize>,
    pub anomalies: Vec<bool>,
    pub reconstruction_errors: Vec<f32>,
    pub summary: Summary,
}

impl AnalysisReport {
    pub fn len(&self) -> usize {
        self.ethernet_headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ethernet_headers.is_empty()
    }
}

fn check_len(stage: &'static str, expected: usize, actual: usize) -> Result<(), AnalysisError> {
    if expected != actual {
        return Err(AnalysisError::LengthMismatch { stage, expected, actual });
    }
    Ok(())
}

/// Combine stage outputs into the report
pub fn aggregate(
    headers: Vec<DecodedHeader>,
    clusters: ClusterAssignment,
    scores: AnomalyScore,
    model: &ModelInfo,
) -> Result<AnalysisReport, AnalysisError> {
    let total = headers.len();
    check_len("cluster", total, clusters.len())?;
    check_len("anomaly flags", total, scores.flags.len())?;
    check_len("anomaly errors", total, scores.errors.len())?;

    let mut counts = ProtocolCounts::default();
    let mut other_ethertype = 0;
    let mut malformed_frames = 0;

    for header in &headers {
        if header.is_ipv4() {
            counts.ipv4 += 1;
        } else if header.is_ipv6() {
            counts.ipv6 += 1;
        } else if header.is_arp() {
            counts.arp += 1;
        } else {
            other_ethertype += 1;
        }

        if header.is_tcp() {
            counts.tcp += 1;
        } else if header.is_udp() {
            counts.udp += 1;
        }

        if header.malformed {
            malformed_frames += 1;
        }
    }

    let summary = Summary {
        total_packets: total,
        protocol_counts: counts,
        other_ethertype,
        malformed_frames,
        anomalies: scores.anomaly_count(),
        clustering: ClusteringSummary::from(&clusters),
        detector: DetectorSummary::from(model),
    };

    Ok(AnalysisReport {
        ethernet_headers: headers,
        kmeans_labels: clusters.labels,
        anomalies: scores.flags,
        reconstruction_errors: scores.errors,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::KMeans;
    use crate::decoder::decode_all;
    use crate::error::ErrorKind;
    use crate::features::{FeatureBuilder, NormalizationParams, FEATURE_COUNT};
    use crate::model::{AnomalyDetector, ThresholdSource};
    use crate::test_frames::*;

    fn detector() -> AnomalyDetector {
        AnomalyDetector::new(
            "projection",
            Box::new(projection_model(FEATURE_COUNT, FEATURE_COUNT)),
            0.01,
            ThresholdSource::Artifact,
            NormalizationParams::default(),
        )
        .unwrap()
    }

    fn stages() -> (Vec<DecodedHeader>, ClusterAssignment, AnomalyScore) {
        let headers = decode_all(&three_frame_records());
        let features = FeatureBuilder::default().build(&headers);
        let clusters = KMeans::new(2, 42, 300).fit(features.view());
        let scores = detector().score(features.view()).unwrap();
        (headers, clusters, scores)
    }

    #[test]
    fn test_aggregate_tallies() {
        let det = detector();
        let (headers, clusters, scores) = stages();
        let report = aggregate(headers, clusters, scores, det.info()).unwrap();

        assert_eq!(report.len(), 3);
        assert_eq!(report.summary.protocol_counts.ipv4, 2);
        assert_eq!(report.summary.protocol_counts.arp, 1);
        assert_eq!(report.summary.clustering.requested_k, 2);
        assert_eq!(report.summary.detector.model, "projection");
    }

    #[test]
    fn test_short_anomaly_score_is_internal_error() {
        let det = detector();
        let (headers, clusters, mut scores) = stages();
        scores.flags.pop();
        scores.errors.pop();

        let err = aggregate(headers, clusters, scores, det.info()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(matches!(
            err,
            AnalysisError::LengthMismatch { stage: "anomaly flags", expected: 3, actual: 2 }
        ));
    }

    #[test]
    fn test_short_cluster_labels_are_internal_error() {
        let det = detector();
        let (headers, mut clusters, scores) = stages();
        clusters.labels.pop();

        let err = aggregate(headers, clusters, scores, det.info()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(matches!(
            err,
            AnalysisError::LengthMismatch { stage: "cluster", expected: 3, actual: 2 }
        ));
    }
}

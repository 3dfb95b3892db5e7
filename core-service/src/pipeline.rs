//! Analysis pipeline
//!
//! capture → decode → features → {k-means, detector} → report. Each call owns
//! its buffers; the detector is the only shared state and is read-only.

use std::time::Instant;

use crate::capture::{read_capture, RawRecord};
use crate::cluster::{ClusterAssignment, KMeans};
use crate::config::AnalyzerConfig;
use crate::decoder::decode_all;
use crate::error::{AnalysisError, AnalysisResult};
use crate::features::{FeatureBuilder, FeatureMatrix};
use crate::model::{AnomalyDetector, AnomalyScore};
use crate::report::{aggregate, AnalysisReport};

/// Analyze a complete capture held in memory
pub fn analyze(
    bytes: &[u8],
    config: &AnalyzerConfig,
    detector: &AnomalyDetector,
) -> AnalysisResult<AnalysisReport> {
    let records = read_capture(bytes)?;
    analyze_records(&records, config, detector)
}

/// Analyze already-extracted capture records
pub fn analyze_records(
    records: &[RawRecord],
    config: &AnalyzerConfig,
    detector: &AnomalyDetector,
) -> AnalysisResult<AnalysisReport> {
    let start = Instant::now();

    config.validate()?;
    detector.check_dimension(config.feature_dim)?;

    let headers = decode_all(records);
    let features = FeatureBuilder::new(detector.normalization().clone()).build(&headers);
    let kmeans = KMeans::new(config.cluster_count, config.kmeans_seed, config.kmeans_max_iter);

    let (clusters, scores) = if config.parallel && features.nrows() > 1 {
        cluster_and_score_parallel(&features, kmeans, detector)?
    } else {
        (kmeans.fit(features.view()), detector.score(features.view())?)
    };

    let report = aggregate(headers, clusters, scores, detector.info())?;

    log::info!(
        "Analysis complete: {} packets, {} anomalies, k={} ({} ms)",
        report.summary.total_packets,
        report.summary.anomalies,
        report.summary.clustering.effective_k,
        start.elapsed().as_millis()
    );

    Ok(report)
}

/// Clustering on a scoped worker while the detector scores on this thread
fn cluster_and_score_parallel(
    features: &FeatureMatrix,
    kmeans: KMeans,
    detector: &AnomalyDetector,
) -> AnalysisResult<(ClusterAssignment, AnomalyScore)> {
    let view = features.view();

    std::thread::scope(|scope| {
        let clustering = scope.spawn(move || kmeans.fit(view));
        let scores = detector.score(view);
        let clusters = clustering
            .join()
            .map_err(|_| AnalysisError::Worker("clustering"))?;
        Ok((clusters, scores?))
    })
}

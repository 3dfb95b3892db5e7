//! Feature Builder - DecodedHeader → normalized feature rows

use ndarray::Array2;

use super::layout::{FEATURE_COUNT, PROTOCOL_OFFSET};
use super::normalize::NormalizationParams;
use crate::decoder::DecodedHeader;

/// N packets × FEATURE_COUNT, row order = packet order
pub type FeatureMatrix = Array2<f32>;

/// Fixed one-of-six protocol category, most specific layer wins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolCategory {
    Ipv4 = 0,
    Ipv6 = 1,
    Arp = 2,
    Tcp = 3,
    Udp = 4,
    Other = 5,
}

impl ProtocolCategory {
    pub fn of(header: &DecodedHeader) -> Self {
        if (header.is_ipv4() || header.is_ipv6()) && header.is_tcp() {
            ProtocolCategory::Tcp
        } else if (header.is_ipv4() || header.is_ipv6()) && header.is_udp() {
            ProtocolCategory::Udp
        } else if header.is_ipv4() {
            ProtocolCategory::Ipv4
        } else if header.is_ipv6() {
            ProtocolCategory::Ipv6
        } else if header.is_arp() {
            ProtocolCategory::Arp
        } else {
            ProtocolCategory::Other
        }
    }

    fn slot(self) -> usize {
        PROTOCOL_OFFSET + self as usize
    }
}

/// Builds the feature matrix shared by the cluster engine and the detector
#[derive(Debug, Clone, Default)]
pub struct FeatureBuilder {
    params: NormalizationParams,
}

impl FeatureBuilder {
    pub fn new(params: NormalizationParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &NormalizationParams {
        &self.params
    }

    /// Unscaled features for one packet
    pub fn raw_features(
        header: &DecodedHeader,
        first_ts: f64,
        prev_ts: f64,
    ) -> [f32; FEATURE_COUNT] {
        let mut values = [0.0f32; FEATURE_COUNT];

        values[0] = header.length as f32;
        values[1] = (header.timestamp - first_ts).max(0.0) as f32;
        values[2] = (header.timestamp - prev_ts).max(0.0) as f32;
        values[ProtocolCategory::of(header).slot()] = 1.0;
        values[9] = header.source_port.map(f32::from).unwrap_or(0.0);
        values[10] = header.dest_port.map(f32::from).unwrap_or(0.0);

        values
    }

    /// Normalized feature matrix, one row per header
    pub fn build(&self, headers: &[DecodedHeader]) -> FeatureMatrix {
        let mut matrix = Array2::<f32>::zeros((headers.len(), FEATURE_COUNT));
        let first_ts = headers.first().map(|h| h.timestamp).unwrap_or(0.0);
        let mut prev_ts = first_ts;

        for (mut row, header) in matrix.rows_mut().into_iter().zip(headers) {
            let mut values = Self::raw_features(header, first_ts, prev_ts);
            self.params.apply(&mut values);

            for (cell, value) in row.iter_mut().zip(values) {
                *cell = value;
            }
            prev_ts = header.timestamp;
        }

        matrix
    }
}

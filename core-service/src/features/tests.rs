//! Feature builder tests over decoded frames

use super::*;
use crate::capture::RawRecord;
use crate::decoder::{decode_all, decode_frame};
use crate::test_frames::*;

#[test]
fn test_matrix_shape_matches_layout() {
    let headers = decode_all(&three_frame_records());
    let matrix = FeatureBuilder::default().build(&headers);

    assert_eq!(matrix.nrows(), 3);
    assert_eq!(matrix.ncols(), FEATURE_COUNT);
}

#[test]
fn test_empty_capture_gives_empty_matrix() {
    let matrix = FeatureBuilder::default().build(&[]);
    assert_eq!(matrix.nrows(), 0);
    assert_eq!(matrix.ncols(), FEATURE_COUNT);
}

#[test]
fn test_protocol_one_hot() {
    let headers = decode_all(&three_frame_records());
    let matrix = FeatureBuilder::default().build(&headers);

    // ARP, TCP, UDP rows
    let expected = [(0, 5), (1, 6), (2, 7)];
    for (row, slot) in expected {
        let one_hot: Vec<f32> = (3..9).map(|c| matrix[[row, c]]).collect();
        assert_eq!(one_hot.iter().sum::<f32>(), 1.0);
        assert_eq!(matrix[[row, slot]], 1.0, "row {} slot {}", row, slot);
    }
}

#[test]
fn test_categories() {
    let other = decode_frame(&RawRecord::new(ethernet(0x88CC, &[0; 20]), 0.0));
    let runt = decode_frame(&RawRecord::new(vec![1, 2, 3], 0.0));
    let icmp = decode_frame(&RawRecord::new(
        ethernet(0x0800, &ipv4(1, [1, 1, 1, 1], [2, 2, 2, 2], &[])),
        0.0,
    ));

    assert_eq!(ProtocolCategory::of(&other), ProtocolCategory::Other);
    assert_eq!(ProtocolCategory::of(&runt), ProtocolCategory::Other);
    assert_eq!(ProtocolCategory::of(&icmp), ProtocolCategory::Ipv4);
}

#[test]
fn test_absent_ports_are_zero() {
    let headers = decode_all(&three_frame_records());
    let raw = FeatureBuilder::raw_features(&headers[0], headers[0].timestamp, headers[0].timestamp);

    assert_eq!(raw[9], 0.0);
    assert_eq!(raw[10], 0.0);
}

#[test]
fn test_time_features_are_relative() {
    let headers = decode_all(&three_frame_records());
    let raw = FeatureBuilder::raw_features(&headers[2], headers[0].timestamp, headers[1].timestamp);

    assert_eq!(raw[1], 1.0);
    assert_eq!(raw[2], 0.5);
    assert_eq!(raw[9], 53.0);
    assert_eq!(raw[10], 5353.0);
}

#[test]
fn test_build_is_deterministic() {
    let records = three_frame_records();
    let builder = FeatureBuilder::default();

    let a = builder.build(&decode_all(&records));
    let b = builder.build(&decode_all(&records));

    let bits_a: Vec<u32> = a.iter().map(|v| v.to_bits()).collect();
    let bits_b: Vec<u32> = b.iter().map(|v| v.to_bits()).collect();
    assert_eq!(bits_a, bits_b);
}

#[test]
fn test_all_values_normalized() {
    let headers = decode_all(&three_frame_records());
    let matrix = FeatureBuilder::default().build(&headers);
    assert!(matrix.iter().all(|v| (0.0..=1.0).contains(v)));
}

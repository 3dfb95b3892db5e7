//! Capture ingestion
//!
//! Turns libpcap container bytes into ordered [`RawRecord`]s. Only the
//! container is validated here; frame contents are the decoder's concern.

use pcap_parser::{parse_pcap_frame, parse_pcap_frame_be, parse_pcap_header, Linktype};
use serde::{Deserialize, Serialize};

use crate::error::CaptureError;

/// One captured frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Captured bytes
    pub data: Vec<u8>,
    /// Capture time in fractional seconds since epoch
    pub timestamp: f64,
    /// On-disk (captured) length
    pub length: u32,
    /// Length of the frame on the wire
    pub orig_len: u32,
}

impl RawRecord {
    /// Build a record whose captured and wire lengths both equal `data.len()`
    pub fn new(data: Vec<u8>, timestamp: f64) -> Self {
        let length = data.len() as u32;
        Self { data, timestamp, length, orig_len: length }
    }
}

/// Parse a whole capture held in memory
pub fn read_capture(bytes: &[u8]) -> Result<Vec<RawRecord>, CaptureError> {
    if bytes.is_empty() {
        return Err(CaptureError::Empty);
    }

    let (mut rest, header) = parse_pcap_header(bytes)
        .map_err(|e| CaptureError::Malformed(format!("global header: {:?}", e)))?;

    if header.network != Linktype::ETHERNET {
        return Err(CaptureError::UnsupportedLinkType(header.network.0));
    }

    let divisor = if header.is_nanosecond_precision() {
        1_000_000_000.0
    } else {
        1_000_000.0
    };
    let big_endian = header.is_bigendian();

    let mut records = Vec::new();
    while !rest.is_empty() {
        let parsed = if big_endian {
            parse_pcap_frame_be(rest)
        } else {
            parse_pcap_frame(rest)
        };
        let (next, block) = parsed.map_err(|e| {
            CaptureError::Malformed(format!(
                "record {} ({} trailing bytes): {:?}",
                records.len(),
                rest.len(),
                e
            ))
        })?;
        records.push(RawRecord {
            data: block.data.to_vec(),
            timestamp: block.ts_sec as f64 + block.ts_usec as f64 / divisor,
            length: block.data.len() as u32,
            orig_len: block.origlen,
        });
        rest = next;
    }

    log::debug!(
        "Read capture: {} records, snaplen {}",
        records.len(),
        header.snaplen
    );

    Ok(records)
}

// ============================================================================
// TEST HELPERS
// ============================================================================

/// Serialize records into a little-endian microsecond pcap
#[cfg(test)]
pub(crate) fn write_pcap(records: &[RawRecord]) -> Vec<u8> {
    write_pcap_as(records, false, false)
}

#[cfg(test)]
pub(crate) fn write_pcap_as(records: &[RawRecord], big_endian: bool, nanos: bool) -> Vec<u8> {
    let u32_bytes = |v: u32| if big_endian { v.to_be_bytes() } else { v.to_le_bytes() };
    let u16_bytes = |v: u16| if big_endian { v.to_be_bytes() } else { v.to_le_bytes() };
    let (magic, scale) = if nanos {
        (0xa1b2_3c4du32, 1_000_000_000.0)
    } else {
        (0xa1b2_c3d4u32, 1_000_000.0)
    };

    let mut out = Vec::new();
    out.extend_from_slice(&u32_bytes(magic));
    out.extend_from_slice(&u16_bytes(2));
    out.extend_from_slice(&u16_bytes(4));
    out.extend_from_slice(&u32_bytes(0));
    out.extend_from_slice(&u32_bytes(0));
    out.extend_from_slice(&u32_bytes(65535));
    out.extend_from_slice(&u32_bytes(1));

    for r in records {
        let secs = r.timestamp.trunc() as u32;
        let frac = ((r.timestamp - r.timestamp.trunc()) * scale).round() as u32;
        out.extend_from_slice(&u32_bytes(secs));
        out.extend_from_slice(&u32_bytes(frac));
        out.extend_from_slice(&u32_bytes(r.data.len() as u32));
        out.extend_from_slice(&u32_bytes(r.orig_len));
        out.extend_from_slice(&r.data);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_round_trip_preserves_order() {
        let records = vec![
            RawRecord::new(vec![0xAA; 60], 1_700_000_000.25),
            RawRecord::new(vec![0xBB; 42], 1_700_000_001.5),
        ];
        let parsed = read_capture(&write_pcap(&records)).unwrap();

        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].data, vec![0xAA; 60]);
        assert_eq!(parsed[1].length, 42);
        assert!((parsed[0].timestamp - 1_700_000_000.25).abs() < 1e-6);
        assert!((parsed[1].timestamp - 1_700_000_001.5).abs() < 1e-6);
    }

    #[test]
    fn test_empty_capture_has_no_records() {
        let parsed = read_capture(&write_pcap(&[])).unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_empty_bytes_rejected() {
        assert!(matches!(read_capture(&[]), Err(CaptureError::Empty)));
    }

    #[test]
    fn test_garbage_rejected() {
        let result = read_capture(b"definitely not a pcap file at all");
        assert!(matches!(result, Err(CaptureError::Malformed(_))));
    }

    fn sample_records() -> Vec<RawRecord> {
        vec![
            RawRecord::new(vec![0xAA; 60], 1_700_000_000.25),
            RawRecord::new(vec![0xBB; 42], 1_700_000_001.5),
            RawRecord::new(vec![0xCC; 54], 1_700_000_002.75),
        ]
    }

    #[test]
    fn test_big_endian_microseconds() {
        let parsed = read_capture(&write_pcap_as(&sample_records(), true, false)).unwrap();

        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[1].data, vec![0xBB; 42]);
        assert_eq!(parsed[2].orig_len, 54);
        assert!((parsed[2].timestamp - 1_700_000_002.75).abs() < 1e-6);
    }

    #[test]
    fn test_big_endian_nanoseconds() {
        let parsed = read_capture(&write_pcap_as(&sample_records(), true, true)).unwrap();

        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0].length, 60);
        assert!((parsed[0].timestamp - 1_700_000_000.25).abs() < 1e-6);
    }

    #[test]
    fn test_little_endian_nanoseconds() {
        let parsed = read_capture(&write_pcap_as(&sample_records(), false, true)).unwrap();

        assert_eq!(parsed.len(), 3);
        assert!((parsed[1].timestamp - 1_700_000_001.5).abs() < 1e-6);
    }

    #[test]
    fn test_truncated_final_record_rejected() {
        let mut bytes = write_pcap(&sample_records()[..2]);
        bytes.truncate(bytes.len() - 30);

        assert!(matches!(read_capture(&bytes), Err(CaptureError::Malformed(_))));
    }

    #[test]
    fn test_partial_record_header_rejected() {
        let mut bytes = write_pcap(&sample_records()[..1]);
        bytes.extend_from_slice(&[0x01, 0x02, 0x03]);

        assert!(matches!(read_capture(&bytes), Err(CaptureError::Malformed(_))));
    }

    #[test]
    fn test_non_ethernet_link_type_rejected() {
        let mut bytes = write_pcap(&[]);
        // LINKTYPE_RAW
        bytes[20..24].copy_from_slice(&101u32.to_le_bytes());
        assert!(matches!(
            read_capture(&bytes),
            Err(CaptureError::UnsupportedLinkType(101))
        ));
    }
}

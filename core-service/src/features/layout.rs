//! Packet feature schema
//!
//! Any edit to [`FEATURE_LAYOUT`] (new slot, reorder, removal) bumps
//! [`FEATURE_VERSION`]. Model artifacts carry the version and hash they were
//! trained against and are refused on mismatch.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Packet feature schema revision
pub const FEATURE_VERSION: u8 = 1;

/// Slot names, indexed by column of the feature matrix
pub const FEATURE_LAYOUT: &[&str] = &[
    // === Size / time (0-2) ===
    "packet_length",   // 0: On-disk frame length in bytes
    "relative_time",   // 1: Seconds since the first packet of the capture
    "inter_arrival",   // 2: Seconds since the previous packet

    // === Protocol category, one-of-six (3-8) ===
    "proto_ipv4",      // 3: IPv4 without TCP/UDP
    "proto_ipv6",      // 4: IPv6 without TCP/UDP
    "proto_arp",       // 5: ARP
    "proto_tcp",       // 6: TCP over IPv4/IPv6
    "proto_udp",       // 7: UDP over IPv4/IPv6
    "proto_other",     // 8: Any other or undecodable ethertype

    // === Transport (9-10) ===
    "source_port",     // 9: 0 when absent
    "dest_port",       // 10: 0 when absent
];

/// Columns per packet; equals `FEATURE_LAYOUT.len()`
pub const FEATURE_COUNT: usize = 11;

/// Index of the first protocol one-hot slot
pub const PROTOCOL_OFFSET: usize = 3;

/// CRC32 over the layout version and feature names
pub fn layout_hash() -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&[FEATURE_VERSION]);

    for name in FEATURE_LAYOUT {
        hasher.update(name.as_bytes());
        hasher.update(&[0]);
    }

    hasher.finalize()
}

/// Layout summary embedded in reports and artifacts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_count: FEATURE_COUNT,
        }
    }
}

/// Check that a model was trained on this layout
pub fn validate_layout(version: u8, hash: u32) -> Result<(), ModelError> {
    let current = layout_hash();
    if version != FEATURE_VERSION || hash != current {
        return Err(ModelError::LayoutMismatch {
            model_version: version,
            model_hash: hash,
            current_version: FEATURE_VERSION,
            current_hash: current,
        });
    }
    Ok(())
}

/// Column of a named slot
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_count_and_offsets() {
        assert_eq!(FEATURE_LAYOUT.len(), FEATURE_COUNT);
        assert_eq!(feature_index("proto_ipv4"), Some(PROTOCOL_OFFSET));
    }

    #[test]
    fn test_layout_hash_stable() {
        assert_eq!(layout_hash(), layout_hash());
        assert_ne!(layout_hash(), 0);
    }

    #[test]
    fn test_validate_layout() {
        assert!(validate_layout(FEATURE_VERSION, layout_hash()).is_ok());
        assert!(validate_layout(FEATURE_VERSION + 1, layout_hash()).is_err());
        assert!(validate_layout(FEATURE_VERSION, layout_hash().wrapping_add(1)).is_err());
    }
}

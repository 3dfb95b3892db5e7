//! Frame Decoder - Ethernet / IPv4 / IPv6 / ARP / TCP / UDP headers
//!
//! Each layer is one tagged decode step that either hands the next layer
//! and its offset on, or stops. A frame too short for the header it claims
//! stops early with the deeper fields left `None`; it never fails the batch.

mod layers;


use serde::ser::{Serialize, SerializeTuple, Serializer};

use crate::capture::RawRecord;
use layers::{Layer, Step};

pub use layers::{ip_protocol_name, ETHERTYPE_ARP, ETHERTYPE_IPV4, ETHERTYPE_IPV6};

/// One decoded frame
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DecodedHeader {
    pub length: u32,
    pub timestamp: f64,
    pub source_mac: Option<String>,
    pub dest_mac: Option<String>,
    pub ethertype: Option<u16>,
    pub source_ip: Option<String>,
    pub dest_ip: Option<String>,
    pub protocol: Option<String>,
    pub source_port: Option<u16>,
    pub dest_port: Option<u16>,
    /// Frame ended before a header it announced
    pub malformed: bool,
}

impl DecodedHeader {
    pub fn is_ipv4(&self) -> bool {
        self.ethertype == Some(ETHERTYPE_IPV4)
    }

    pub fn is_ipv6(&self) -> bool {
        self.ethertype == Some(ETHERTYPE_IPV6)
    }

    pub fn is_arp(&self) -> bool {
        self.ethertype == Some(ETHERTYPE_ARP)
    }

    pub fn is_tcp(&self) -> bool {
        self.protocol.as_deref() == Some("TCP")
    }

    pub fn is_udp(&self) -> bool {
        self.protocol.as_deref() == Some("UDP")
    }
}

/// Serialized as the 10-element tuple the report consumers index into
impl Serialize for DecodedHeader {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tup = serializer.serialize_tuple(10)?;
        tup.serialize_element(&self.length)?;
        tup.serialize_element(&self.timestamp)?;
        tup.serialize_element(&self.source_mac)?;
        tup.serialize_element(&self.dest_mac)?;
        tup.serialize_element(&self.ethertype)?;
        tup.serialize_element(&self.source_ip)?;
        tup.serialize_element(&self.dest_ip)?;
        tup.serialize_element(&self.protocol)?;
        tup.serialize_element(&self.source_port)?;
        tup.serialize_element(&self.dest_port)?;
        tup.end()
    }
}

/// Decode one captured frame
pub fn decode_frame(record: &RawRecord) -> DecodedHeader {
    let mut header = DecodedHeader {
        length: record.length,
        timestamp: record.timestamp,
        ..Default::default()
    };

    let data = record.data.as_slice();
    let mut step = Step::Continue(Layer::Ethernet, 0);
    while let Step::Continue(layer, offset) = step {
        step = layer.decode(data, offset, &mut header);
    }

    header
}

/// Decode a capture, preserving record order
pub fn decode_all(records: &[RawRecord]) -> Vec<DecodedHeader> {
    let headers: Vec<DecodedHeader> = records.iter().map(decode_frame).collect();

    let malformed = headers.iter().filter(|h| h.malformed).count();
    if malformed > 0 {
        log::debug!("Decoded {} frames, {} truncated", headers.len(), malformed);
    }

    headers
}

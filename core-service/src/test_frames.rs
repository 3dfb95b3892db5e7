//! Frame builders shared by unit tests

use crate::capture::RawRecord;
use crate::model::{Activation, DenseAutoencoder, DenseLayer};

pub const MAC_A: [u8; 6] = [0x00, 0x1a, 0x2b, 0x3c, 0x4d, 0x5e];
pub const MAC_B: [u8; 6] = [0xff, 0xff, 0xff, 0xff, 0xff, 0xff];

pub fn ethernet(ethertype: u16, payload: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(14 + payload.len());
    frame.extend_from_slice(&MAC_B);
    frame.extend_from_slice(&MAC_A);
    frame.extend_from_slice(&ethertype.to_be_bytes());
    frame.extend_from_slice(payload);
    frame
}

pub fn ipv4(protocol: u8, src: [u8; 4], dst: [u8; 4], payload: &[u8]) -> Vec<u8> {
    let total = (20 + payload.len()) as u16;
    let mut pkt = vec![0x45, 0x00];
    pkt.extend_from_slice(&total.to_be_bytes());
    pkt.extend_from_slice(&[0x00, 0x01, 0x40, 0x00, 64, protocol, 0x00, 0x00]);
    pkt.extend_from_slice(&src);
    pkt.extend_from_slice(&dst);
    pkt.extend_from_slice(payload);
    pkt
}

pub fn ipv6(next_header: u8, src: [u8; 16], dst: [u8; 16], payload: &[u8]) -> Vec<u8> {
    let mut pkt = vec![0x60, 0x00, 0x00, 0x00];
    pkt.extend_from_slice(&(payload.len() as u16).to_be_bytes());
    pkt.push(next_header);
    pkt.push(64);
    pkt.extend_from_slice(&src);
    pkt.extend_from_slice(&dst);
    pkt.extend_from_slice(payload);
    pkt
}

/// 20-byte TCP header with only SYN set
pub fn tcp_syn(src_port: u16, dst_port: u16) -> Vec<u8> {
    let mut seg = Vec::with_capacity(20);
    seg.extend_from_slice(&src_port.to_be_bytes());
    seg.extend_from_slice(&dst_port.to_be_bytes());
    seg.extend_from_slice(&[0, 0, 0, 1, 0, 0, 0, 0, 0x50, 0x02, 0xff, 0xff, 0, 0, 0, 0]);
    seg
}

pub fn udp(src_port: u16, dst_port: u16, payload: &[u8]) -> Vec<u8> {
    let mut dgram = Vec::with_capacity(8 + payload.len());
    dgram.extend_from_slice(&src_port.to_be_bytes());
    dgram.extend_from_slice(&dst_port.to_be_bytes());
    dgram.extend_from_slice(&((8 + payload.len()) as u16).to_be_bytes());
    dgram.extend_from_slice(&[0, 0]);
    dgram.extend_from_slice(payload);
    dgram
}

pub fn arp_request() -> Vec<u8> {
    let mut body = vec![0x00, 0x01, 0x08, 0x00, 6, 4, 0x00, 0x01];
    body.extend_from_slice(&MAC_A);
    body.extend_from_slice(&[192, 168, 1, 10]);
    body.extend_from_slice(&[0; 6]);
    body.extend_from_slice(&[192, 168, 1, 1]);
    ethernet(0x0806, &body)
}

pub fn tcp_frame(src_port: u16, dst_port: u16) -> Vec<u8> {
    ethernet(0x0800, &ipv4(6, [10, 0, 0, 1], [10, 0, 0, 2], &tcp_syn(src_port, dst_port)))
}

pub fn udp_frame(src_port: u16, dst_port: u16) -> Vec<u8> {
    ethernet(0x0800, &ipv4(17, [10, 0, 0, 1], [8, 8, 8, 8], &udp(src_port, dst_port, &[0; 12])))
}

/// ARP request, IPv4/TCP SYN 443 -> 51000, IPv4/UDP 53 -> 5353
pub fn three_frame_records() -> Vec<RawRecord> {
    vec![
        RawRecord::new(arp_request(), 1_700_000_000.0),
        RawRecord::new(tcp_frame(443, 51000), 1_700_000_000.5),
        RawRecord::new(udp_frame(53, 5353), 1_700_000_001.0),
    ]
}

/// Linear autoencoder keeping the first `keep` coordinates and zeroing the rest
pub fn projection_model(dim: usize, keep: usize) -> DenseAutoencoder {
    let encoder = DenseLayer {
        weights: (0..keep)
            .map(|r| (0..dim).map(|c| if r == c { 1.0 } else { 0.0 }).collect())
            .collect(),
        bias: vec![0.0; keep],
        activation: Activation::Identity,
    };
    let decoder = DenseLayer {
        weights: (0..dim)
            .map(|r| (0..keep).map(|c| if r == c { 1.0 } else { 0.0 }).collect())
            .collect(),
        bias: vec![0.0; dim],
        activation: Activation::Identity,
    };
    DenseAutoencoder::from_layers(&[encoder, decoder]).expect("valid projection layers")
}

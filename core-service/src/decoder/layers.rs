//! Per-layer decode steps

use std::net::{Ipv4Addr, Ipv6Addr};

use super::DecodedHeader;

pub const ETHERTYPE_IPV4: u16 = 0x0800;
pub const ETHERTYPE_ARP: u16 = 0x0806;
pub const ETHERTYPE_IPV6: u16 = 0x86DD;

const ETHERNET_HEADER_LEN: usize = 14;
const IPV4_MIN_HEADER_LEN: usize = 20;
const IPV6_HEADER_LEN: usize = 40;
const PORT_PAIR_LEN: usize = 4;

const IPPROTO_TCP: u8 = 6;
const IPPROTO_UDP: u8 = 17;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Layer {
    Ethernet,
    Ipv4,
    Ipv6,
    Arp,
    Transport,
}

/// Outcome of one layer: next layer at an absolute offset, or done
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Step {
    Continue(Layer, usize),
    Stop,
}

impl Layer {
    pub(super) fn decode(self, data: &[u8], offset: usize, header: &mut DecodedHeader) -> Step {
        let bytes = data.get(offset..).unwrap_or(&[]);
        match self {
            Layer::Ethernet => decode_ethernet(bytes, header),
            Layer::Ipv4 => decode_ipv4(bytes, offset, header),
            Layer::Ipv6 => decode_ipv6(bytes, offset, header),
            Layer::Arp => {
                header.protocol = Some("ARP".to_string());
                Step::Stop
            }
            Layer::Transport => decode_ports(bytes, header),
        }
    }
}

/// Truncated: keep what was filled so far
fn truncated(header: &mut DecodedHeader) -> Step {
    header.malformed = true;
    Step::Stop
}

fn decode_ethernet(bytes: &[u8], header: &mut DecodedHeader) -> Step {
    if bytes.len() >= 6 {
        header.dest_mac = Some(format_mac(&bytes[0..6]));
    }
    if bytes.len() >= 12 {
        header.source_mac = Some(format_mac(&bytes[6..12]));
    }
    if bytes.len() < ETHERNET_HEADER_LEN {
        return truncated(header);
    }

    let ethertype = u16::from_be_bytes([bytes[12], bytes[13]]);
    header.ethertype = Some(ethertype);

    match ethertype {
        ETHERTYPE_IPV4 => Step::Continue(Layer::Ipv4, ETHERNET_HEADER_LEN),
        ETHERTYPE_IPV6 => Step::Continue(Layer::Ipv6, ETHERNET_HEADER_LEN),
        ETHERTYPE_ARP => Step::Continue(Layer::Arp, ETHERNET_HEADER_LEN),
        _ => Step::Stop,
    }
}

fn decode_ipv4(bytes: &[u8], offset: usize, header: &mut DecodedHeader) -> Step {
    if bytes.len() < IPV4_MIN_HEADER_LEN {
        return truncated(header);
    }

    // Total length is not checked: offloaded captures often carry 0 there.
    let header_len = (bytes[0] & 0x0F) as usize * 4;
    if header_len < IPV4_MIN_HEADER_LEN || header_len > bytes.len() {
        return truncated(header);
    }

    let protocol = bytes[9];
    header.protocol = Some(ip_protocol_name(protocol));
    header.source_ip = Some(Ipv4Addr::new(bytes[12], bytes[13], bytes[14], bytes[15]).to_string());
    header.dest_ip = Some(Ipv4Addr::new(bytes[16], bytes[17], bytes[18], bytes[19]).to_string());

    match protocol {
        IPPROTO_TCP | IPPROTO_UDP => Step::Continue(Layer::Transport, offset + header_len),
        _ => Step::Stop,
    }
}

fn decode_ipv6(bytes: &[u8], offset: usize, header: &mut DecodedHeader) -> Step {
    if bytes.len() < IPV6_HEADER_LEN {
        return truncated(header);
    }

    let next_header = bytes[6];
    header.protocol = Some(ip_protocol_name(next_header));
    header.source_ip = Some(ipv6_at(&bytes[8..24]).to_string());
    header.dest_ip = Some(ipv6_at(&bytes[24..40]).to_string());

    match next_header {
        IPPROTO_TCP | IPPROTO_UDP => Step::Continue(Layer::Transport, offset + IPV6_HEADER_LEN),
        _ => Step::Stop,
    }
}

fn decode_ports(bytes: &[u8], header: &mut DecodedHeader) -> Step {
    if bytes.len() < PORT_PAIR_LEN {
        return truncated(header);
    }
    header.source_port = Some(u16::from_be_bytes([bytes[0], bytes[1]]));
    header.dest_port = Some(u16::from_be_bytes([bytes[2], bytes[3]]));
    Step::Stop
}

fn format_mac(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(":")
}

fn ipv6_at(bytes: &[u8]) -> Ipv6Addr {
    let mut octets = [0u8; 16];
    octets.copy_from_slice(bytes);
    Ipv6Addr::from(octets)
}

/// Name for an IP protocol / IPv6 next-header number
pub fn ip_protocol_name(protocol: u8) -> String {
    let name = match protocol {
        0 => "HOPOPT",
        1 => "ICMP",
        2 => "IGMP",
        6 => "TCP",
        17 => "UDP",
        41 => "IPv6",
        43 => "IPv6-Route",
        44 => "IPv6-Frag",
        47 => "GRE",
        50 => "ESP",
        51 => "AH",
        58 => "ICMPv6",
        59 => "IPv6-NoNxt",
        60 => "IPv6-Opts",
        89 => "OSPF",
        103 => "PIM",
        112 => "VRRP",
        132 => "SCTP",
        other => return format!("IP-{}", other),
    };
    name.to_string()
}

//! # Packets
//!
//! A decoded view of one frame: the network layer (IPv4, IPv6 or another
//! ethertype), the transport layer if any, and link metadata (VLAN, mark).
//! Pipelines only ever borrow a packet for the duration of one `apply`.
//!
//! ```
//! use std::net::Ipv4Addr;
//! use netlang_packet::Packet;
//!
//! let pkt = Packet::ipv4(Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::new(10, 0, 0, 2))
//!     .tcp(40000, 80)
//!     .len(60)
//!     .build();
//! assert_eq!(pkt.ports().map(|p| p.dst), Some(80));
//! ```

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ethertype of IPv4.
pub const ETH_P_IP: u16 = 0x0800;
/// Ethertype of IPv6.
pub const ETH_P_IPV6: u16 = 0x86dd;

/// IP protocol numbers.
pub const IPPROTO_ICMP: u8 = 1;
pub const IPPROTO_TCP: u8 = 6;
pub const IPPROTO_UDP: u8 = 17;
pub const IPPROTO_ICMPV6: u8 = 58;

const IP_MF: u16 = 0x2000;
const IP_OFFSET: u16 = 0x1fff;

/// The fixed IPv4 header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ipv4Header {
    pub src: Ipv4Addr,
    pub dst: Ipv4Addr,
    pub protocol: u8,
    pub ttl: u8,
    pub tos: u8,
    pub id: u16,
    /// Flags (top 3 bits) and fragment offset.
    pub frag_off: u16,
}

impl Ipv4Header {
    /// Part of a fragmented datagram.
    pub fn is_fragment(&self) -> bool {
        self.frag_off & (IP_MF | IP_OFFSET) != 0
    }

    /// The first fragment of a fragmented datagram.
    pub fn is_first_fragment(&self) -> bool {
        self.frag_off & IP_MF != 0 && self.frag_off & IP_OFFSET == 0
    }

    /// More fragments follow this one.
    pub fn has_more_fragments(&self) -> bool {
        self.frag_off & IP_MF != 0
    }
}

/// The fixed IPv6 header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ipv6Header {
    pub src: Ipv6Addr,
    pub dst: Ipv6Addr,
    pub next_header: u8,
    pub hop_limit: u8,
}

/// Network layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Network {
    Ipv4(Ipv4Header),
    Ipv6(Ipv6Header),
    /// Any other ethertype, not decoded.
    Other(u16),
}

/// Transport layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transport {
    Tcp(Ports),
    Udp(Ports),
    Icmp { kind: u8, code: u8 },
}

/// Source and destination port of a flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ports {
    pub src: u16,
    pub dst: u16,
}

impl fmt::Display for Ports {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.src, self.dst)
    }
}

/// A decoded frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Packet {
    network: Network,
    transport: Option<Transport>,
    vlan: Option<u16>,
    mark: u32,
    len: usize,
}

impl Packet {
    /// Start an IPv4 packet.
    pub fn ipv4(src: Ipv4Addr, dst: Ipv4Addr) -> PacketBuilder {
        PacketBuilder::new(Network::Ipv4(Ipv4Header {
            src,
            dst,
            protocol: 0,
            ttl: 64,
            tos: 0,
            id: 0,
            frag_off: 0,
        }))
    }

    /// Start an IPv6 packet.
    pub fn ipv6(src: Ipv6Addr, dst: Ipv6Addr) -> PacketBuilder {
        PacketBuilder::new(Network::Ipv6(Ipv6Header {
            src,
            dst,
            next_header: 0,
            hop_limit: 64,
        }))
    }

    /// Start a non-IP frame.
    pub fn other(ethertype: u16) -> PacketBuilder {
        PacketBuilder::new(Network::Other(ethertype))
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn transport(&self) -> Option<&Transport> {
        self.transport.as_ref()
    }

    pub fn ethertype(&self) -> u16 {
        match self.network {
            Network::Ipv4(_) => ETH_P_IP,
            Network::Ipv6(_) => ETH_P_IPV6,
            Network::Other(ethertype) => ethertype,
        }
    }

    pub fn ipv4_header(&self) -> Option<&Ipv4Header> {
        match &self.network {
            Network::Ipv4(header) => Some(header),
            _ => None,
        }
    }

    pub fn ipv6_header(&self) -> Option<&Ipv6Header> {
        match &self.network {
            Network::Ipv6(header) => Some(header),
            _ => None,
        }
    }

    /// The L4 protocol number, for IP packets.
    pub fn l4_proto(&self) -> Option<u8> {
        match &self.network {
            Network::Ipv4(h) => Some(h.protocol),
            Network::Ipv6(h) => Some(h.next_header),
            Network::Other(_) => None,
        }
    }

    /// Ports of a TCP or UDP packet.
    pub fn ports(&self) -> Option<Ports> {
        match self.transport {
            Some(Transport::Tcp(ports)) | Some(Transport::Udp(ports)) => Some(ports),
            _ => None,
        }
    }

    pub fn src_addr(&self) -> Option<IpAddr> {
        match &self.network {
            Network::Ipv4(h) => Some(IpAddr::V4(h.src)),
            Network::Ipv6(h) => Some(IpAddr::V6(h.src)),
            Network::Other(_) => None,
        }
    }

    pub fn dst_addr(&self) -> Option<IpAddr> {
        match &self.network {
            Network::Ipv4(h) => Some(IpAddr::V4(h.dst)),
            Network::Ipv6(h) => Some(IpAddr::V6(h.dst)),
            Network::Other(_) => None,
        }
    }

    pub fn vlan(&self) -> Option<u16> {
        self.vlan
    }

    pub fn mark(&self) -> u32 {
        self.mark
    }

    /// Frame length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Builds a [`Packet`] layer by layer.
#[derive(Debug, Clone)]
pub struct PacketBuilder {
    packet: Packet,
}

impl PacketBuilder {
    fn new(network: Network) -> Self {
        Self {
            packet: Packet {
                network,
                transport: None,
                vlan: None,
                mark: 0,
                len: 0,
            },
        }
    }

    fn set_proto(&mut self, proto: u8) {
        match &mut self.packet.network {
            Network::Ipv4(h) => h.protocol = proto,
            Network::Ipv6(h) => h.next_header = proto,
            Network::Other(_) => {}
        }
    }

    /// TCP transport. Also sets the IP protocol field.
    pub fn tcp(mut self, src: u16, dst: u16) -> Self {
        self.set_proto(IPPROTO_TCP);
        self.packet.transport = Some(Transport::Tcp(Ports { src, dst }));
        self
    }

    /// UDP transport. Also sets the IP protocol field.
    pub fn udp(mut self, src: u16, dst: u16) -> Self {
        self.set_proto(IPPROTO_UDP);
        self.packet.transport = Some(Transport::Udp(Ports { src, dst }));
        self
    }

    /// ICMP (or ICMPv6 on an IPv6 packet).
    pub fn icmp(mut self, kind: u8, code: u8) -> Self {
        let proto = match self.packet.network {
            Network::Ipv6(_) => IPPROTO_ICMPV6,
            _ => IPPROTO_ICMP,
        };
        self.set_proto(proto);
        self.packet.transport = Some(Transport::Icmp { kind, code });
        self
    }

    /// Raw L4 protocol number with no decoded transport.
    pub fn protocol(mut self, proto: u8) -> Self {
        self.set_proto(proto);
        self.packet.transport = None;
        self
    }

    pub fn ttl(mut self, ttl: u8) -> Self {
        match &mut self.packet.network {
            Network::Ipv4(h) => h.ttl = ttl,
            Network::Ipv6(h) => h.hop_limit = ttl,
            Network::Other(_) => {}
        }
        self
    }

    /// IPv4 type of service. Ignored for other networks.
    pub fn tos(mut self, tos: u8) -> Self {
        if let Network::Ipv4(h) = &mut self.packet.network {
            h.tos = tos;
        }
        self
    }

    /// IPv4 flags and fragment offset. Ignored for other networks.
    pub fn frag_off(mut self, frag_off: u16) -> Self {
        if let Network::Ipv4(h) = &mut self.packet.network {
            h.frag_off = frag_off;
        }
        self
    }

    pub fn vlan(mut self, vid: u16) -> Self {
        self.packet.vlan = Some(vid);
        self
    }

    pub fn mark(mut self, mark: u32) -> Self {
        self.packet.mark = mark;
        self
    }

    pub fn len(mut self, len: usize) -> Self {
        self.packet.len = len;
        self
    }

    pub fn build(self) -> Packet {
        self.packet
    }
}

// ============================================================================
// Networks
// ============================================================================

/// An IPv4 network in CIDR notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ipv4Net {
    addr: Ipv4Addr,
    prefix: u8,
}

/// Errors parsing an [`Ipv4Net`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetParseError {
    #[error("Missing '/' in network '{0}'")]
    MissingPrefix(String),

    #[error("Invalid address in network '{0}'")]
    InvalidAddress(String),

    #[error("Invalid prefix length {0}, expected 0..=32")]
    InvalidPrefix(String),
}

impl Ipv4Net {
    /// A network from an address and prefix length. The host bits of `addr`
    /// are cleared.
    pub fn new(addr: Ipv4Addr, prefix: u8) -> Result<Self, NetParseError> {
        if prefix > 32 {
            return Err(NetParseError::InvalidPrefix(prefix.to_string()));
        }
        let masked = u32::from(addr) & mask(prefix);
        Ok(Self {
            addr: Ipv4Addr::from(masked),
            prefix,
        })
    }

    pub fn addr(&self) -> Ipv4Addr {
        self.addr
    }

    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    pub fn contains(&self, ip: Ipv4Addr) -> bool {
        u32::from(ip) & mask(self.prefix) == u32::from(self.addr)
    }
}

fn mask(prefix: u8) -> u32 {
    match prefix {
        0 => 0,
        p => u32::MAX << (32 - u32::from(p)),
    }
}

impl fmt::Display for Ipv4Net {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.prefix)
    }
}

impl FromStr for Ipv4Net {
    type Err = NetParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (addr, prefix) = s
            .split_once('/')
            .ok_or_else(|| NetParseError::MissingPrefix(s.to_string()))?;
        let addr: Ipv4Addr = addr
            .parse()
            .map_err(|_| NetParseError::InvalidAddress(s.to_string()))?;
        let prefix: u8 = prefix
            .parse()
            .map_err(|_| NetParseError::InvalidPrefix(prefix.to_string()))?;
        Self::new(addr, prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_protocol() {
        let pkt = Packet::ipv4(Ipv4Addr::LOCALHOST, Ipv4Addr::LOCALHOST)
            .udp(53, 5353)
            .build();
        assert_eq!(pkt.l4_proto(), Some(IPPROTO_UDP));
        assert_eq!(pkt.ports(), Some(Ports { src: 53, dst: 5353 }));
        assert_eq!(pkt.ethertype(), ETH_P_IP);
    }

    #[test]
    fn test_icmpv6_protocol() {
        let pkt = Packet::ipv6(Ipv6Addr::LOCALHOST, Ipv6Addr::LOCALHOST)
            .icmp(128, 0)
            .build();
        assert_eq!(pkt.l4_proto(), Some(IPPROTO_ICMPV6));
        assert_eq!(pkt.ports(), None);
    }

    #[test]
    fn test_addresses() {
        let v4 = Packet::ipv4(Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::new(10, 0, 0, 2)).build();
        assert_eq!(v4.src_addr(), Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1))));
        assert_eq!(v4.dst_addr(), Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2))));

        let v6 = Packet::ipv6(Ipv6Addr::LOCALHOST, Ipv6Addr::UNSPECIFIED).build();
        assert_eq!(v6.src_addr(), Some(IpAddr::V6(Ipv6Addr::LOCALHOST)));
        assert_eq!(v6.dst_addr(), Some(IpAddr::V6(Ipv6Addr::UNSPECIFIED)));

        let arp = Packet::other(0x0806).build();
        assert_eq!(arp.src_addr(), None);
        assert_eq!(arp.dst_addr(), None);
    }

    #[test]
    fn test_raw_protocol_has_no_transport() {
        let gre = Packet::ipv4(Ipv4Addr::LOCALHOST, Ipv4Addr::LOCALHOST)
            .tcp(1, 2)
            .protocol(47)
            .build();
        assert_eq!(gre.l4_proto(), Some(47));
        assert_eq!(gre.ports(), None);
    }

    #[test]
    fn test_fragments() {
        let first = Ipv4Header {
            src: Ipv4Addr::LOCALHOST,
            dst: Ipv4Addr::LOCALHOST,
            protocol: IPPROTO_UDP,
            ttl: 64,
            tos: 0,
            id: 7,
            frag_off: IP_MF,
        };
        let last = Ipv4Header {
            frag_off: 185,
            ..first
        };
        assert!(first.is_fragment() && first.is_first_fragment());
        assert!(last.is_fragment() && !last.is_first_fragment());
        assert!(!last.has_more_fragments());
    }

    #[test]
    fn test_net_parse() {
        let net: Ipv4Net = "192.168.1.77/24".parse().unwrap();
        assert_eq!(net.to_string(), "192.168.1.0/24");
        assert!(net.contains(Ipv4Addr::new(192, 168, 1, 200)));
        assert!(!net.contains(Ipv4Addr::new(192, 168, 2, 1)));

        let any: Ipv4Net = "0.0.0.0/0".parse().unwrap();
        assert!(any.contains(Ipv4Addr::BROADCAST));
    }

    #[test]
    fn test_net_parse_errors() {
        assert!(matches!(
            "10.0.0.0".parse::<Ipv4Net>(),
            Err(NetParseError::MissingPrefix(_))
        ));
        assert!(matches!(
            "10.0.0/8".parse::<Ipv4Net>(),
            Err(NetParseError::InvalidAddress(_))
        ));
        assert_eq!(
            "10.0.0.0/40".parse::<Ipv4Net>(),
            Err(NetParseError::InvalidPrefix("40".to_string()))
        );
    }
}

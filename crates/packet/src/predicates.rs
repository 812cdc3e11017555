//! Packet predicates.
//!
//! Each constructor returns a fresh [`Predicate<Packet>`]. Predicates that
//! take a parameter record it as a leaf argument, so `has_port(80)` renders
//! as `has_port(80)`.

use netlang_core::{predicate, Argument, Predicate};

use crate::packet::{Ipv4Net, Network, Packet, Transport};
use crate::renderers;

fn ipv4_with(packet: &Packet, test: impl Fn(&Transport) -> bool) -> bool {
    matches!(packet.network(), Network::Ipv4(_)) && packet.transport().is_some_and(test)
}

fn ipv6_with(packet: &Packet, test: impl Fn(&Transport) -> bool) -> bool {
    matches!(packet.network(), Network::Ipv6(_)) && packet.transport().is_some_and(test)
}

fn tcp(t: &Transport) -> bool {
    matches!(t, Transport::Tcp(_))
}

fn udp(t: &Transport) -> bool {
    matches!(t, Transport::Udp(_))
}

fn icmp(t: &Transport) -> bool {
    matches!(t, Transport::Icmp { .. })
}

// ============================================================================
// Protocols
// ============================================================================

pub fn is_ip() -> Predicate<Packet> {
    predicate("is_ip", |p: &Packet| matches!(p.network(), Network::Ipv4(_)))
}

pub fn is_ip6() -> Predicate<Packet> {
    predicate("is_ip6", |p: &Packet| matches!(p.network(), Network::Ipv6(_)))
}

/// TCP over IPv4.
pub fn is_tcp() -> Predicate<Packet> {
    predicate("is_tcp", |p: &Packet| ipv4_with(p, tcp))
}

/// UDP over IPv4.
pub fn is_udp() -> Predicate<Packet> {
    predicate("is_udp", |p: &Packet| ipv4_with(p, udp))
}

/// ICMP over IPv4.
pub fn is_icmp() -> Predicate<Packet> {
    predicate("is_icmp", |p: &Packet| ipv4_with(p, icmp))
}

pub fn is_tcp6() -> Predicate<Packet> {
    predicate("is_tcp6", |p: &Packet| ipv6_with(p, tcp))
}

pub fn is_udp6() -> Predicate<Packet> {
    predicate("is_udp6", |p: &Packet| ipv6_with(p, udp))
}

pub fn is_icmp6() -> Predicate<Packet> {
    predicate("is_icmp6", |p: &Packet| ipv6_with(p, icmp))
}

/// IPv4 TCP or UDP: anything with a port pair.
pub fn is_flow() -> Predicate<Packet> {
    predicate("is_flow", |p: &Packet| {
        ipv4_with(p, |t| tcp(t) || udp(t))
    })
}

/// Ethertype equals `ethertype`.
pub fn is_l3_proto(ethertype: u16) -> Predicate<Packet> {
    predicate("is_l3_proto", move |p: &Packet| p.ethertype() == ethertype).with_arg(&ethertype)
}

/// IP protocol (or IPv6 next header) equals `proto`.
pub fn is_l4_proto(proto: u8) -> Predicate<Packet> {
    predicate("is_l4_proto", move |p: &Packet| p.l4_proto() == Some(proto)).with_arg(&proto)
}

// ============================================================================
// Ports
// ============================================================================

/// Either port equals `port`.
pub fn has_port(port: u16) -> Predicate<Packet> {
    predicate("has_port", move |p: &Packet| {
        p.ports().is_some_and(|ports| ports.src == port || ports.dst == port)
    })
    .with_arg(&port)
}

pub fn has_src_port(port: u16) -> Predicate<Packet> {
    predicate("has_src_port", move |p: &Packet| {
        p.ports().is_some_and(|ports| ports.src == port)
    })
    .with_arg(&port)
}

pub fn has_dst_port(port: u16) -> Predicate<Packet> {
    predicate("has_dst_port", move |p: &Packet| {
        p.ports().is_some_and(|ports| ports.dst == port)
    })
    .with_arg(&port)
}

// ============================================================================
// Addresses
// ============================================================================

fn net_arg(net: &Ipv4Net) -> Argument {
    Argument::with(renderers(), net)
}

/// Source or destination address inside `net`.
pub fn has_addr(net: Ipv4Net) -> Predicate<Packet> {
    predicate("has_addr", move |p: &Packet| {
        p.ipv4_header()
            .is_some_and(|h| net.contains(h.src) || net.contains(h.dst))
    })
    .with_argument(net_arg(&net))
}

pub fn has_src_addr(net: Ipv4Net) -> Predicate<Packet> {
    predicate("has_src_addr", move |p: &Packet| {
        p.ipv4_header().is_some_and(|h| net.contains(h.src))
    })
    .with_argument(net_arg(&net))
}

pub fn has_dst_addr(net: Ipv4Net) -> Predicate<Packet> {
    predicate("has_dst_addr", move |p: &Packet| {
        p.ipv4_header().is_some_and(|h| net.contains(h.dst))
    })
    .with_argument(net_arg(&net))
}

// ============================================================================
// Link & Fragments
// ============================================================================

pub fn has_vlan() -> Predicate<Packet> {
    predicate("has_vlan", |p: &Packet| p.vlan().is_some())
}

pub fn has_vid(vid: u16) -> Predicate<Packet> {
    predicate("has_vid", move |p: &Packet| p.vlan() == Some(vid)).with_arg(&vid)
}

pub fn has_mark(mark: u32) -> Predicate<Packet> {
    predicate("has_mark", move |p: &Packet| p.mark() == mark).with_arg(&mark)
}

pub fn is_frag() -> Predicate<Packet> {
    predicate("is_frag", |p: &Packet| {
        p.ipv4_header().is_some_and(|h| h.is_fragment())
    })
}

pub fn is_first_frag() -> Predicate<Packet> {
    predicate("is_first_frag", |p: &Packet| {
        p.ipv4_header().is_some_and(|h| h.is_first_fragment())
    })
}

pub fn is_more_frag() -> Predicate<Packet> {
    predicate("is_more_frag", |p: &Packet| {
        p.ipv4_header().is_some_and(|h| h.has_more_fragments())
    })
}

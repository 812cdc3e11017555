//! Packet properties and monadic accessors.
//!
//! Properties always return a value; fields that do not exist on a packet
//! read as zero. The monadic accessors return `None` instead, so a pipeline
//! built on them stops at the first missing layer.

use netlang_core::{mfunction, property, MonadicFunction, Property};

use crate::packet::{Ipv4Header, Ipv6Header, Packet, Ports};

// ============================================================================
// Properties
// ============================================================================

/// Source port, or 0 when the packet has no ports.
pub fn src_port() -> Property<Packet, u16> {
    property("src_port", |p: &Packet| p.ports().map_or(0, |ports| ports.src))
}

/// Destination port, or 0 when the packet has no ports.
pub fn dst_port() -> Property<Packet, u16> {
    property("dst_port", |p: &Packet| p.ports().map_or(0, |ports| ports.dst))
}

/// IP protocol / IPv6 next header, or 0.
pub fn ip_proto() -> Property<Packet, u8> {
    property("ip_proto", |p: &Packet| p.l4_proto().unwrap_or(0))
}

/// IPv4 TTL / IPv6 hop limit, or 0.
pub fn ip_ttl() -> Property<Packet, u8> {
    property("ip_ttl", |p: &Packet| {
        p.ipv4_header()
            .map(|h| h.ttl)
            .or_else(|| p.ipv6_header().map(|h| h.hop_limit))
            .unwrap_or(0)
    })
}

pub fn ip_tos() -> Property<Packet, u8> {
    property("ip_tos", |p: &Packet| p.ipv4_header().map_or(0, |h| h.tos))
}

pub fn packet_len() -> Property<Packet, usize> {
    property("packet_len", |p: &Packet| p.len())
}

pub fn mark() -> Property<Packet, u32> {
    property("mark", |p: &Packet| p.mark())
}

pub fn vlan_id() -> Property<Packet, u16> {
    property("vlan_id", |p: &Packet| p.vlan().unwrap_or(0))
}

// ============================================================================
// Monadic Accessors
// ============================================================================

/// The port pair of a TCP or UDP packet.
pub fn ports() -> MonadicFunction<Packet, Option<Ports>> {
    mfunction("ports", |p: &Packet| p.ports())
}

pub fn ipv4_header() -> MonadicFunction<Packet, Option<Ipv4Header>> {
    mfunction("ipv4_header", |p: &Packet| p.ipv4_header().copied())
}

pub fn ipv6_header() -> MonadicFunction<Packet, Option<Ipv6Header>> {
    mfunction("ipv6_header", |p: &Packet| p.ipv6_header().copied())
}

//! # Netlang Packet - A Packet Filtering Vocabulary
//!
//! Concrete leaves for `netlang-core` pipelines over a decoded [`Packet`]:
//!
//! - [`predicates`]: protocol, port, address, VLAN and fragment tests
//! - [`properties`]: field extractors, plain and monadic
//! - [`values`]: comparisons against constants, text conversion
//! - [`actions`]: terminal stages producing a [`Verdict`]
//!
//! ## Example
//!
//! ```
//! use std::net::Ipv4Addr;
//! use netlang_core::{and, compose, render, when, Combinator};
//! use netlang_packet::{actions, predicates, properties, values, Packet, Verdict};
//!
//! let web = and(predicates::is_tcp(), predicates::has_dst_port(443));
//! let small = compose(values::less(128usize), properties::packet_len());
//! let rule = when(and(web, small), actions::steer(2));
//!
//! let pkt = Packet::ipv4(Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::new(10, 0, 0, 2))
//!     .tcp(50000, 443)
//!     .len(64)
//!     .build();
//!
//! assert_eq!(rule.apply(&pkt), Some(Verdict::Steer(2)));
//! assert_eq!(
//!     render(&rule),
//!     "((is_tcp and has_dst_port(443)) and (less(128) ∘ packet_len)) then steer(2)"
//! );
//! ```

use std::sync::OnceLock;

use netlang_core::Renderers;

pub mod actions;
pub mod packet;
pub mod predicates;
pub mod properties;
pub mod values;

pub use actions::Verdict;
pub use packet::{
    Ipv4Header, Ipv4Net, Ipv6Header, NetParseError, Network, Packet, PacketBuilder, Ports,
    Transport,
};

/// The standard renderers plus the packet types used as leaf arguments.
pub fn renderers() -> &'static Renderers {
    static RENDERERS: OnceLock<Renderers> = OnceLock::new();
    RENDERERS.get_or_init(|| {
        let mut renderers = Renderers::with_standard();
        renderers.register::<Ipv4Net>().register::<Ports>();
        renderers
    })
}

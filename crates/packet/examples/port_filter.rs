//! # Port Filter
//!
//! Builds a small rule set, prints how each rule renders, and runs a few
//! packets through it.
//!
//! Run with: `RUST_LOG=trace cargo run -p netlang-packet --example port_filter`

use std::net::Ipv4Addr;

use netlang_core::{and, compose, or, render, unless, when, Combinator, Expr};
use netlang_packet::actions::{drop, pass, steer};
use netlang_packet::predicates::{has_dst_port, has_src_addr, is_tcp, is_udp};
use netlang_packet::properties::{dst_port, packet_len};
use netlang_packet::values::{greater, less};
use netlang_packet::{Ipv4Net, NetParseError, Packet, Verdict};

fn main() -> Result<(), NetParseError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== Port Filter ===\n");

    let lan: Ipv4Net = "192.168.0.0/16".parse()?;

    // Rule 1: web traffic from the LAN goes to queue 1.
    let web = when(
        and(
            and(is_tcp(), or(has_dst_port(80), has_dst_port(443))),
            has_src_addr(lan),
        ),
        steer(1),
    );

    // Rule 2: small UDP on a low port passes.
    let low_udp = when(
        and(is_udp(), compose(less(1024u16), dst_port())),
        pass(),
    );

    // Rule 3: anything oversized is dropped.
    let oversized = unless(compose(greater(1500usize), packet_len()), pass());

    println!("Rules:");
    println!("  1. {}", render(&web));
    println!("  2. {}", render(&low_udp));
    println!("  3. {}", render(&oversized));
    println!();

    let packets = [
        Packet::ipv4(Ipv4Addr::new(192, 168, 1, 10), Ipv4Addr::new(93, 184, 216, 34))
            .tcp(51000, 443)
            .len(60)
            .build(),
        Packet::ipv4(Ipv4Addr::new(10, 0, 0, 5), Ipv4Addr::new(10, 0, 0, 53))
            .udp(40000, 53)
            .len(80)
            .build(),
        Packet::ipv4(Ipv4Addr::new(10, 0, 0, 5), Ipv4Addr::new(10, 0, 0, 9))
            .tcp(40000, 22)
            .len(9000)
            .build(),
    ];

    for (i, pkt) in packets.iter().enumerate() {
        let verdict = web
            .apply(pkt)
            .or_else(|| low_udp.apply(pkt))
            .or_else(|| oversized.apply(pkt))
            .unwrap_or(Verdict::Drop);
        println!("packet {}: {:?} -> {}", i, pkt.ports(), verdict);
    }

    // The same rules are available as data.
    println!();
    println!("Rule 2 has {} nodes, depth {}", low_udp.expr().size(), low_udp.expr().depth());

    let rejected = Expr::compose(pass().expr(), drop().expr());
    if let Err(err) = rejected {
        println!("Checked layer: {}", err);
    }

    Ok(())
}

//! Actions: the terminal stage of a pipeline.
//!
//! An action turns a packet into a [`Verdict`]. Nothing may be composed after
//! it, but it may be guarded or placed after any number of other stages.

use std::fmt;

use netlang_core::{action, Action};
use serde::{Deserialize, Serialize};

use crate::packet::Packet;

/// What happens to a packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Deliver the packet.
    Pass,
    /// Discard the packet.
    Drop,
    /// Deliver the packet to a specific queue.
    Steer(u32),
}

impl Verdict {
    /// The verdict of a guarded pipeline: a stage that did not fire drops.
    pub fn or_drop(verdict: Option<Verdict>) -> Verdict {
        verdict.unwrap_or(Verdict::Drop)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => write!(f, "pass"),
            Verdict::Drop => write!(f, "drop"),
            Verdict::Steer(queue) => write!(f, "steer {}", queue),
        }
    }
}

fn decide(verdict: Verdict, packet: &Packet) -> Verdict {
    tracing::trace!(%verdict, len = packet.len(), "verdict");
    verdict
}

pub fn pass() -> Action<Packet, Verdict> {
    action("pass", |p: &Packet| decide(Verdict::Pass, p))
}

pub fn drop() -> Action<Packet, Verdict> {
    action("drop", |p: &Packet| decide(Verdict::Drop, p))
}

/// Send the packet to `queue`.
pub fn steer(queue: u32) -> Action<Packet, Verdict> {
    action("steer", move |p: &Packet| decide(Verdict::Steer(queue), p)).with_arg(&queue)
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use netlang_core::{render, when, Combinator, Shape};

    use super::*;
    use crate::predicates::is_udp;

    #[test]
    fn test_actions() {
        let pkt = Packet::ipv4(Ipv4Addr::LOCALHOST, Ipv4Addr::LOCALHOST).build();
        assert_eq!(pass().apply(&pkt), Verdict::Pass);
        assert_eq!(drop().apply(&pkt), Verdict::Drop);
        assert_eq!(steer(3).apply(&pkt), Verdict::Steer(3));
        assert_eq!(steer(3).signature().shape, Shape::Terminal);
        assert_eq!(render(&steer(3)), "steer(3)");
    }

    #[test]
    fn test_guarded_action() {
        let udp = Packet::ipv4(Ipv4Addr::LOCALHOST, Ipv4Addr::LOCALHOST)
            .udp(1, 2)
            .build();
        let tcp = Packet::ipv4(Ipv4Addr::LOCALHOST, Ipv4Addr::LOCALHOST)
            .tcp(1, 2)
            .build();
        let rule = when(is_udp(), steer(1));

        assert_eq!(Verdict::or_drop(rule.apply(&udp)), Verdict::Steer(1));
        assert_eq!(Verdict::or_drop(rule.apply(&tcp)), Verdict::Drop);
        assert_eq!(render(&rule), "is_udp then steer(1)");
    }

    #[test]
    fn test_verdict_serde() {
        let json = serde_json::to_string(&Verdict::Steer(2)).unwrap();
        assert_eq!(json, r#"{"steer":2}"#);
        assert_eq!(Verdict::Pass.to_string(), "pass");
    }
}

//! Value functions: comparisons against a constant and text conversion.
//!
//! These are generic over the compared type and meant to be composed after
//! a property:
//!
//! ```
//! use netlang_core::{compose, render, Combinator};
//! use netlang_packet::{properties::dst_port, values::less, Packet};
//! use std::net::Ipv4Addr;
//!
//! let low_port = compose(less(1024u16), dst_port());
//! let pkt = Packet::ipv4(Ipv4Addr::LOCALHOST, Ipv4Addr::LOCALHOST).udp(5353, 53).build();
//!
//! assert!(low_port.apply(&pkt));
//! assert_eq!(render(&low_port), "less(1024) ∘ dst_port");
//! ```

use std::any::Any;
use std::fmt::Display;
use std::ops::BitAnd;

use netlang_core::{function, predicate, Function, Predicate};

/// Bound on the value types accepted by the comparisons.
pub trait Value: Any + Copy + Send + Sync {}

impl<T: Any + Copy + Send + Sync> Value for T {}

fn compare<T: Value>(name: &str, bound: T, test: fn(&T, &T) -> bool) -> Predicate<T> {
    predicate(name, move |v: &T| test(v, &bound)).with_arg(&bound)
}

/// `x < bound`.
pub fn less<T: Value + PartialOrd>(bound: T) -> Predicate<T> {
    compare("less", bound, T::lt)
}

/// `x <= bound`.
pub fn less_eq<T: Value + PartialOrd>(bound: T) -> Predicate<T> {
    compare("less_eq", bound, T::le)
}

/// `x > bound`.
pub fn greater<T: Value + PartialOrd>(bound: T) -> Predicate<T> {
    compare("greater", bound, T::gt)
}

/// `x >= bound`.
pub fn greater_eq<T: Value + PartialOrd>(bound: T) -> Predicate<T> {
    compare("greater_eq", bound, T::ge)
}

/// `x == value`.
pub fn equal<T: Value + PartialEq>(value: T) -> Predicate<T> {
    compare("equal", value, T::eq)
}

/// `x != value`.
pub fn not_equal<T: Value + PartialEq>(value: T) -> Predicate<T> {
    compare("not_equal", value, T::ne)
}

/// Some bit of `mask` is set in `x`.
pub fn any_bit<T>(mask: T) -> Predicate<T>
where
    T: Value + BitAnd<Output = T> + PartialEq + Default,
{
    compare("any_bit", mask, |v, m| (*v & *m) != T::default())
}

/// Every bit of `mask` is set in `x`.
pub fn all_bit<T>(mask: T) -> Predicate<T>
where
    T: Value + BitAnd<Output = T> + PartialEq + Default,
{
    compare("all_bit", mask, |v, m| (*v & *m) == *m)
}

/// Render a value as text.
pub fn to_text<T: Display + ?Sized + 'static>() -> Function<T, String> {
    function("to_text", |v: &T| v.to_string())
}

#[cfg(test)]
mod tests {
    use netlang_core::{render, Combinator};

    use super::*;

    #[test]
    fn test_comparisons() {
        assert!(less(10u16).apply(&9));
        assert!(!less(10u16).apply(&10));
        assert!(less_eq(10u16).apply(&10));
        assert!(greater(10u32).apply(&11));
        assert!(greater_eq(10u32).apply(&10));
        assert!(equal(6u8).apply(&6));
        assert!(not_equal(6u8).apply(&17));
    }

    #[test]
    fn test_bit_masks() {
        assert!(any_bit(0b0110u8).apply(&0b0100));
        assert!(!any_bit(0b0110u8).apply(&0b1001));
        assert!(all_bit(0b0110u8).apply(&0b1110));
        assert!(!all_bit(0b0110u8).apply(&0b0100));
    }

    #[test]
    fn test_arguments_rendered() {
        assert_eq!(render(&greater_eq(64u8)), "greater_eq(64)");
        assert_eq!(render(&any_bit(0x12u32)), "any_bit(18)");
    }

    #[test]
    fn test_to_text() {
        assert_eq!(to_text::<u16>().apply(&80), "80");
        assert_eq!(to_text::<str>().apply("eth0"), "eth0");
    }
}

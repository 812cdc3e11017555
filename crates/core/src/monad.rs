//! # Monads - Wrapped Results
//!
//! A monadic function returns its value inside a wrapper that may be empty
//! or failed (`Option`, `Result`). Composing two such functions threads the
//! wrapper with `bind`: an empty or failed value propagates unchanged and the
//! continuation is never invoked.
//!
//! The wrapper is split in two traits:
//!
//! - [`Family`]: the type constructor (`Option<_>`, `Result<_, E>`), with
//!   `unit` and `bind`.
//! - [`Monad`]: a concrete wrapped type, which knows its value type and its
//!   family.
//!
//! Two monadic functions compose only when their codomains share a family.
//! The composition engine states this as an equality of associated types,
//! so mixing `Option` with `Result` does not compile.

use std::any::type_name;
use std::marker::PhantomData;

/// A monad type constructor.
pub trait Family: Sized + 'static {
    /// The wrapper type for a value `T`.
    type Wrap<T>: Monad<Value = T, Family = Self>;

    /// Family name used in structural signatures.
    fn name() -> String;

    /// Wrap a plain value.
    fn unit<A>(value: A) -> Self::Wrap<A>;

    /// Feed the wrapped value to `k`, short-circuiting on empty/failed values.
    fn bind<A, B, K>(m: Self::Wrap<A>, k: K) -> Self::Wrap<B>
    where
        K: FnOnce(A) -> Self::Wrap<B>;
}

/// A concrete monadic value.
pub trait Monad: Sized {
    /// The wrapped value type.
    type Value;

    /// The type constructor this value belongs to.
    type Family: Family;

    /// View `self` as its family's wrapper. Always the identity; it lets the
    /// compiler see `Self` as `Family::Wrap<Value>`.
    fn into_wrapped(self) -> Wrapped<Self>;
}

/// `M` seen through its family.
pub type Wrapped<M> = <<M as Monad>::Family as Family>::Wrap<<M as Monad>::Value>;

/// `bind` for any monadic value.
pub fn bind<M, B, K>(m: M, k: K) -> <M::Family as Family>::Wrap<B>
where
    M: Monad,
    K: FnOnce(M::Value) -> <M::Family as Family>::Wrap<B>,
{
    <M::Family as Family>::bind(m.into_wrapped(), k)
}

/// Apply a plain function inside the wrapper.
pub fn fmap<M, B, K>(m: M, k: K) -> <M::Family as Family>::Wrap<B>
where
    M: Monad,
    K: FnOnce(M::Value) -> B,
{
    bind(m, |a| <M::Family as Family>::unit(k(a)))
}

// ============================================================================
// Option
// ============================================================================

/// The `Option<_>` family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionFamily;

impl Family for OptionFamily {
    type Wrap<T> = Option<T>;

    fn name() -> String {
        "Option".to_string()
    }

    fn unit<A>(value: A) -> Option<A> {
        Some(value)
    }

    fn bind<A, B, K>(m: Option<A>, k: K) -> Option<B>
    where
        K: FnOnce(A) -> Option<B>,
    {
        m.and_then(k)
    }
}

impl<T> Monad for Option<T> {
    type Value = T;
    type Family = OptionFamily;

    fn into_wrapped(self) -> Option<T> {
        self
    }
}

// ============================================================================
// Result
// ============================================================================

/// The `Result<_, E>` family. Different error types are different families.
pub struct ResultFamily<E>(PhantomData<fn() -> E>);

impl<E: 'static> Family for ResultFamily<E> {
    type Wrap<T> = Result<T, E>;

    fn name() -> String {
        format!("Result[{}]", type_name::<E>())
    }

    fn unit<A>(value: A) -> Result<A, E> {
        Ok(value)
    }

    fn bind<A, B, K>(m: Result<A, E>, k: K) -> Result<B, E>
    where
        K: FnOnce(A) -> Result<B, E>,
    {
        m.and_then(k)
    }
}

impl<T, E: 'static> Monad for Result<T, E> {
    type Value = T;
    type Family = ResultFamily<E>;

    fn into_wrapped(self) -> Result<T, E> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_bind_short_circuits() {
        let mut called = false;
        let out: Option<u32> = bind(None::<u32>, |v| {
            called = true;
            Some(v + 1)
        });
        assert_eq!(out, None);
        assert!(!called);

        assert_eq!(bind(Some(1u32), |v| Some(v + 1)), Some(2));
    }

    #[test]
    fn test_result_bind_keeps_first_error() {
        let failed: Result<u32, &str> = Err("no route");
        let out = bind(failed, |v| Ok::<_, &str>(v * 2));
        assert_eq!(out, Err("no route"));
    }

    #[test]
    fn test_fmap() {
        assert_eq!(fmap(Some(20u16), |p| p.to_string()), Some("20".to_string()));
        assert_eq!(fmap(None::<u16>, |p| p.to_string()), None);
    }

    #[test]
    fn test_family_names() {
        assert_eq!(OptionFamily::name(), "Option");
        let name = ResultFamily::<String>::name();
        assert!(name.starts_with("Result["));
        assert!(name.contains("String"));
    }
}

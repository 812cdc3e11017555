//! # Shapes - Domains, Codomains and Kinds
//!
//! Composition `f ∘ g` is only defined when the codomain of `g` fits the
//! domain of `f`. This module describes those interfaces in two ways:
//!
//! - **Statically**, through the [`Kind`] markers ([`Plain`], [`Monadic`],
//!   [`Terminal`]) every combinator declares. The composition engine selects
//!   its rule from the pair of kinds, so the choice is made by the compiler.
//! - **Structurally**, through [`Ty`] and [`Signature`], a runtime
//!   description carried by every expression node. Rendering, export and the
//!   checked construction interface work on these.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A structural type description.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ty {
    /// Accepts any input. Only meaningful in a domain position
    /// (e.g. a generic `show` function).
    Any,
    /// A plain value type.
    Named(String),
    /// A value wrapped in a monad family, e.g. `Option<u16>`.
    Wrapped { family: String, inner: Box<Ty> },
}

impl Ty {
    pub fn named(name: impl Into<String>) -> Self {
        Ty::Named(name.into())
    }

    pub fn wrapped(family: impl Into<String>, inner: Ty) -> Self {
        Ty::Wrapped {
            family: family.into(),
            inner: Box::new(inner),
        }
    }

    /// The plain description of a Rust type, named by
    /// [`std::any::type_name`].
    ///
    /// That name is not guaranteed unique or stable across compiler versions,
    /// and the checked layer compares names with `==`. Only compare
    /// signatures produced by the same build; a stable name should be spelled
    /// out with [`Ty::named`].
    pub fn of<T: ?Sized>() -> Self {
        Ty::Named(std::any::type_name::<T>().to_string())
    }

    /// Shorthand for the predicate codomain.
    pub fn bool() -> Self {
        Ty::of::<bool>()
    }

    pub fn is_wrapped(&self) -> bool {
        matches!(self, Ty::Wrapped { .. })
    }

    /// The monad family name, if wrapped.
    pub fn family(&self) -> Option<&str> {
        match self {
            Ty::Wrapped { family, .. } => Some(family),
            _ => None,
        }
    }

    /// The wrapped value type, if wrapped.
    pub fn inner(&self) -> Option<&Ty> {
        match self {
            Ty::Wrapped { inner, .. } => Some(inner),
            _ => None,
        }
    }

    /// Whether a value of type `other` may flow into a slot of type `self`.
    pub fn accepts(&self, other: &Ty) -> bool {
        match (self, other) {
            (Ty::Any, _) => true,
            (Ty::Named(a), Ty::Named(b)) => a == b,
            (
                Ty::Wrapped { family: fa, inner: ia },
                Ty::Wrapped { family: fb, inner: ib },
            ) => fa == fb && ia.accepts(ib),
            _ => false,
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Any => write!(f, "_"),
            Ty::Named(name) => write!(f, "{}", name),
            Ty::Wrapped { family, inner } => write!(f, "{}<{}>", family, inner),
        }
    }
}

/// The runtime view of a [`Kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shape {
    /// Returns a plain value.
    Plain,
    /// Returns a value wrapped in a monad.
    Monadic,
    /// A sink (action). Nothing may be composed after it.
    Terminal,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Plain => write!(f, "plain"),
            Shape::Monadic => write!(f, "monadic"),
            Shape::Terminal => write!(f, "terminal"),
        }
    }
}

/// Domain, codomain and shape of a combinator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    pub domain: Ty,
    pub codomain: Ty,
    pub shape: Shape,
}

impl Signature {
    pub fn new(domain: Ty, codomain: Ty, shape: Shape) -> Self {
        Self {
            domain,
            codomain,
            shape,
        }
    }

    /// `domain -> bool`, plain.
    pub fn predicate(domain: Ty) -> Self {
        Self::new(domain, Ty::bool(), Shape::Plain)
    }

    pub fn is_predicate(&self) -> bool {
        self.shape == Shape::Plain && self.codomain == Ty::bool()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} ({})", self.domain, self.codomain, self.shape)
    }
}

// ============================================================================
// Static Kinds
// ============================================================================

mod sealed {
    pub trait Sealed {}
}

/// Compile-time shape marker of a combinator.
///
/// Sealed: the composition rules are written for exactly these three kinds.
pub trait Kind: sealed::Sealed + Send + Sync + 'static {
    const SHAPE: Shape;
}

/// Marker: plain codomain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Plain;

/// Marker: monadic codomain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Monadic;

/// Marker: terminal codomain (actions).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Terminal;

impl sealed::Sealed for Plain {}
impl sealed::Sealed for Monadic {}
impl sealed::Sealed for Terminal {}

impl Kind for Plain {
    const SHAPE: Shape = Shape::Plain;
}

impl Kind for Monadic {
    const SHAPE: Shape = Shape::Monadic;
}

impl Kind for Terminal {
    const SHAPE: Shape = Shape::Terminal;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ty_display() {
        assert_eq!(Ty::named("Packet").to_string(), "Packet");
        assert_eq!(Ty::wrapped("Option", Ty::named("u16")).to_string(), "Option<u16>");
        assert_eq!(Ty::Any.to_string(), "_");
    }

    #[test]
    fn test_ty_accepts() {
        let port = Ty::named("u16");
        let opt_port = Ty::wrapped("Option", port.clone());

        assert!(port.accepts(&port));
        assert!(!port.accepts(&opt_port));
        assert!(Ty::Any.accepts(&opt_port));
        assert!(!opt_port.accepts(&Ty::wrapped("Result", Ty::named("u16"))));
    }

    #[test]
    fn test_ty_of() {
        assert_eq!(Ty::of::<bool>(), Ty::bool());
        assert_eq!(Ty::of::<str>(), Ty::named("str"));
    }

    #[test]
    fn test_kind_shapes() {
        assert_eq!(Plain::SHAPE, Shape::Plain);
        assert_eq!(Monadic::SHAPE, Shape::Monadic);
        assert_eq!(Terminal::SHAPE, Shape::Terminal);
    }

    #[test]
    fn test_predicate_signature() {
        let sig = Signature::predicate(Ty::named("Packet"));
        assert!(sig.is_predicate());
        assert_eq!(sig.to_string(), "Packet -> bool (plain)");
    }
}

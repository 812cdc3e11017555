//! # Descriptors - Naming Combinators
//!
//! Every combinator carries a [`Descriptor`]: the name it is known by, the
//! operator symbol used when it is rendered, and its arity (how many
//! sub-expressions it owns). Leaves have arity 0; connectives like `not`
//! have arity 1; `and`, `or`, guards and compositions have arity 2; the
//! two-way conditional has arity 3.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of children a node owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Arity {
    /// A leaf: no children.
    Nullary,
    /// One child (e.g. `not`).
    Unary,
    /// Two children (e.g. `and`, composition).
    Binary,
    /// Three children (the conditional).
    Ternary,
}

impl Arity {
    /// The arity as a child count.
    pub fn count(self) -> usize {
        match self {
            Arity::Nullary => 0,
            Arity::Unary => 1,
            Arity::Binary => 2,
            Arity::Ternary => 3,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.count())
    }
}

/// Identification and rendering metadata for a combinator.
///
/// Immutable once attached: the fields are private and there are no setters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Descriptor {
    name: String,
    symbol: String,
    arity: Arity,
}

impl Descriptor {
    /// Create a descriptor with explicit name, symbol and arity.
    pub fn new(name: impl Into<String>, symbol: impl Into<String>, arity: Arity) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            arity,
        }
    }

    /// A leaf descriptor. The symbol is the name itself.
    pub fn leaf(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            symbol: name.clone(),
            name,
            arity: Arity::Nullary,
        }
    }

    /// A unary operator descriptor.
    pub fn unary(name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self::new(name, symbol, Arity::Unary)
    }

    /// A binary operator descriptor.
    pub fn binary(name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self::new(name, symbol, Arity::Binary)
    }

    /// A three-operand operator descriptor.
    pub fn ternary(name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self::new(name, symbol, Arity::Ternary)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.arity)
    }
}

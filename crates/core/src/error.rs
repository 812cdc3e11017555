//! # Error Types
//!
//! Construction errors are "non-composable combinators": attempts to join
//! pieces whose interfaces do not fit. Composition `f ∘ g` is only defined
//! when `g`'s codomain fits `f`'s domain, so a mismatch is an undefined
//! operation rather than a runtime failure.
//!
//! The typed layer rejects all of these at compile time. These values are
//! produced by the checked [`Expr`](crate::expr::Expr) constructors, which a
//! surface compiler uses when it only knows names and signatures. A tree
//! that was built successfully never fails structurally during `apply`.

use thiserror::Error;

use crate::descriptor::Arity;
use crate::shape::Ty;

/// Errors raised while constructing a combinator tree.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LangError {
    /// `g`'s output does not fit `f`'s input.
    #[error("Shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: Ty, got: Ty },

    /// Two monadic stages use different wrapper families.
    #[error("Monad mismatch: cannot bind {got} into {expected}")]
    MonadMismatch { expected: String, got: String },

    /// Both a plain and a monadic reading of `f ∘ g` are well formed.
    #[error("Ambiguous composition of '{f}' after '{g}': both plain and monadic readings apply")]
    AmbiguousComposition { f: String, g: String },

    /// Something was composed after an action.
    #[error("Cannot compose past action '{action}'")]
    ComposePastAction { action: String },

    /// A connective was given an operand that is not a predicate.
    #[error("'{name}' is not a predicate (codomain {codomain})")]
    NotAPredicate { name: String, codomain: Ty },

    /// A descriptor's arity does not match the node it was used for.
    #[error("Arity mismatch for '{name}': descriptor says {declared}, node has {actual} children")]
    ArityMismatch {
        name: String,
        declared: Arity,
        actual: usize,
    },

    /// A leaf signature is inconsistent with its shape.
    #[error("Invalid signature for '{name}': {reason}")]
    InvalidSignature { name: String, reason: String },
}

//! # Netlang Core - A Typed Combinator Algebra
//!
//! Packet pipelines are built from small composable units:
//!
//! - **Functions**: predicates, properties, monadic functions and actions,
//!   each a named leaf wrapping a callable.
//! - **Connectives**: `not`, `and`, `or`, `xor` over predicates, plus the
//!   `when` / `unless` guards and the two-way `conditional`.
//! - **Composition**: `f ∘ g`, with the plain or Kleisli rule selected at
//!   compile time from the kinds of the operands.
//! - **Expressions**: the structural view of any tree, with a checked
//!   construction interface for callers that only know signatures.
//! - **Show**: capability-based rendering that never requires every value
//!   in the tree to be printable.
//!
//! ## Example
//!
//! ```
//! use netlang_core::{and, compose, predicate, property, function, render, Combinator};
//!
//! let tcp = predicate("isTCP", |p: &(u8, u16)| p.0 == 6);
//! let web = predicate("isPort80", |p: &(u8, u16)| p.1 == 80);
//! let filter = and(tcp, web);
//! assert!(filter.apply(&(6, 80)));
//! assert_eq!(render(&filter), "isTCP and isPort80");
//!
//! let port = property("srcPort", |p: &(u8, u16)| p.1);
//! let text = function("toString", |n: &u16| n.to_string());
//! let describe = compose(text, port);
//! assert_eq!(describe.apply(&(17, 53)), "53");
//! assert_eq!(render(&describe), "toString ∘ srcPort");
//! ```
//!
//! Trees are immutable values. Every constructor returns a new node that
//! owns its operands, so a built tree is `Send + Sync` and can be evaluated
//! from many threads at once.

pub mod combinator;
pub mod compose;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod expr;
pub mod function;
pub mod monad;
pub mod shape;
pub mod show;

// Re-export key types at crate root for convenience
pub use combinator::{
    and, conditional, not, or, unless, when, xor, Combinator1, Combinator2, Conditional, Guard,
};
pub use compose::{as_plain, compose, AsPlain, Composition, Strategy};
pub use config::RenderConfig;
pub use descriptor::{Arity, Descriptor};
pub use error::LangError;
pub use expr::{Expr, Node};
pub use function::{
    action, apply, function, mfunction, predicate, property, Action, Combinator, CombinatorExt,
    Function, MonadicFunction, Predicate, Property,
};
pub use monad::{Family, Monad, OptionFamily, ResultFamily};
pub use shape::{Kind, Monadic, Plain, Shape, Signature, Terminal, Ty};
pub use show::{render, render_expr, render_with, Argument, Renderers};

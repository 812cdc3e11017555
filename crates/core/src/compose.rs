//! # Composition - Joining Combinators
//!
//! `compose(f, g)` builds `f ∘ g`: apply `g`, then feed its result to `f`.
//! Which rule is used depends on the kinds of the two operands:
//!
//! | F \ G | `Plain` | `Monadic` |
//! |-------|---------|-----------|
//! | `Plain` | `f(g(x))`, plain | `bind(g(x), unit ∘ f)`, monadic |
//! | `Monadic` | `f(g(x))`, monadic | `bind(g(x), f)`, monadic |
//! | `Terminal` | `f(g(x))`, terminal | `bind(g(x), unit ∘ f)`, terminal |
//!
//! There is no column for `Terminal`: nothing composes after an action.
//!
//! ## Static Selection
//!
//! The rule is a trait implemented on the pair of kind markers, so the
//! compiler picks it and a missing rule is a type error. Each pair has
//! exactly one implementation, which rules out ambiguous compositions in
//! the typed layer. To hand a monadic function's whole wrapper to `f`, wrap
//! it with [`as_plain`] first.
//!
//! `bind` short-circuits: when `g` yields an empty or failed value, `f` is
//! never invoked and the value propagates unchanged.
//!
//! ## Rejections
//!
//! Two monadic stages must share a monad family:
//!
//! ```compile_fail
//! use netlang_core::{compose, mfunction};
//!
//! let lookup = mfunction("lookup", |k: &u32| if *k > 0 { Some(*k) } else { None });
//! let parse = mfunction("parse", |v: &u32| -> Result<String, String> { Ok(v.to_string()) });
//!
//! let _ = compose(parse, lookup);
//! ```
//!
//! Nothing may follow an action:
//!
//! ```compile_fail
//! use netlang_core::{action, compose, function};
//!
//! let drop = action("drop", |_: &u32| String::from("dropped"));
//! let len = function("len", |s: &String| s.len());
//!
//! let _ = compose(len, drop);
//! ```
//!
//! The domain of `f` must match what `g` produces:
//!
//! ```compile_fail
//! use netlang_core::{compose, property};
//!
//! let len = property("len", |s: &str| s.len());
//! let _ = compose(len.clone(), len);
//! ```

use serde::{Deserialize, Serialize};

use crate::descriptor::Descriptor;
use crate::error::LangError;
use crate::expr::{Expr, Node};
use crate::function::Combinator;
use crate::monad::{self, Family, Monad};
use crate::shape::{Kind, Monadic, Plain, Shape, Signature, Terminal, Ty};

/// How `f` receives `g`'s output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// `f` receives `g`'s output unchanged.
    Plain,
    /// `f` receives the value bound out of `g`'s wrapper.
    Kleisli,
}

/// The descriptor shared by every composition node.
pub(crate) fn descriptor() -> Descriptor {
    Descriptor::binary("compose", "∘")
}

// ============================================================================
// Structural Rules
// ============================================================================

/// Pick a strategy for `f ∘ g` from the signatures alone.
///
/// Only fails when no strategy can be picked: `g` is an action, or both
/// readings fit. Any other mismatch is reported by [`check`].
pub(crate) fn resolve(f: &Expr, g: &Expr) -> Result<Strategy, LangError> {
    let (fs, gs) = (f.signature(), g.signature());
    if gs.shape == Shape::Terminal {
        return Err(past_action(g));
    }

    // Only a monadic stage is bound through. A wrapped plain stage (from
    // `as_plain`) passes its whole wrapper on.
    let bindable = gs.shape == Shape::Monadic;
    let plain = fs.domain.accepts(&gs.codomain);
    let kleisli = bindable && gs.codomain.inner().is_some_and(|inner| fs.domain.accepts(inner));

    match (plain, kleisli) {
        (true, true) => Err(LangError::AmbiguousComposition {
            f: f.descriptor().name().to_string(),
            g: g.descriptor().name().to_string(),
        }),
        (true, false) => Ok(Strategy::Plain),
        (false, true) => Ok(Strategy::Kleisli),
        (false, false) if bindable => Ok(Strategy::Kleisli),
        (false, false) => Ok(Strategy::Plain),
    }
}

/// Validate `f ∘ g` under `strategy`.
pub(crate) fn check(strategy: Strategy, f: &Expr, g: &Expr) -> Result<(), LangError> {
    let (fs, gs) = (f.signature(), g.signature());
    if gs.shape == Shape::Terminal {
        return Err(past_action(g));
    }

    match strategy {
        Strategy::Plain => {
            if !fs.domain.accepts(&gs.codomain) {
                return Err(LangError::ShapeMismatch {
                    expected: fs.domain.clone(),
                    got: gs.codomain.clone(),
                });
            }
        }
        Strategy::Kleisli => {
            if gs.shape != Shape::Monadic {
                return Err(LangError::ShapeMismatch {
                    expected: fs.domain.clone(),
                    got: gs.codomain.clone(),
                });
            }
            let (family, inner) = match &gs.codomain {
                Ty::Wrapped { family, inner } => (family, inner.as_ref()),
                other => {
                    return Err(LangError::ShapeMismatch {
                        expected: Ty::wrapped("_", fs.domain.clone()),
                        got: other.clone(),
                    })
                }
            };
            if fs.shape == Shape::Monadic {
                let own = fs.codomain.family().unwrap_or_default();
                if own != family.as_str() {
                    return Err(LangError::MonadMismatch {
                        expected: family.clone(),
                        got: own.to_string(),
                    });
                }
            }
            if !fs.domain.accepts(inner) {
                return Err(LangError::ShapeMismatch {
                    expected: fs.domain.clone(),
                    got: inner.clone(),
                });
            }
        }
    }
    Ok(())
}

/// The signature of `f ∘ g` under `strategy`.
///
/// The domain is always `g`'s. A plain `f` bound over a monadic `g` has its
/// codomain re-wrapped in `g`'s family; an action stays terminal.
pub fn composed_signature(strategy: Strategy, f: &Signature, g: &Signature) -> Signature {
    let domain = g.domain.clone();
    match (strategy, f.shape, g.codomain.family()) {
        (Strategy::Kleisli, Shape::Monadic, _) => {
            Signature::new(domain, f.codomain.clone(), Shape::Monadic)
        }
        (Strategy::Kleisli, shape, Some(family)) => {
            let shape = match shape {
                Shape::Terminal => Shape::Terminal,
                _ => Shape::Monadic,
            };
            Signature::new(domain, Ty::wrapped(family, f.codomain.clone()), shape)
        }
        _ => Signature::new(domain, f.codomain.clone(), f.shape),
    }
}

fn past_action(g: &Expr) -> LangError {
    LangError::ComposePastAction {
        action: g.descriptor().name().to_string(),
    }
}

// ============================================================================
// Typed Rules
// ============================================================================

/// A composition rule, implemented on the pair `(F::Kind, G::Kind)`.
pub trait Rule<F: Combinator, G: Combinator> {
    /// What `f ∘ g` returns.
    type Output;

    /// The kind of `f ∘ g`.
    type Kind: Kind;

    const STRATEGY: Strategy;

    fn run(f: &F, g: &G, input: &G::Domain) -> Self::Output;
}

/// Plain `g`: `f(g(x))`, keeping `f`'s kind.
impl<K, F, G> Rule<F, G> for (K, Plain)
where
    K: Kind,
    F: Combinator<Kind = K, Domain = G::Codomain>,
    G: Combinator<Kind = Plain>,
{
    type Output = F::Codomain;
    type Kind = K;

    const STRATEGY: Strategy = Strategy::Plain;

    fn run(f: &F, g: &G, input: &G::Domain) -> F::Codomain {
        f.apply(&g.apply(input))
    }
}

/// Monadic `g`, plain `f`: `bind(g(x), unit ∘ f)`.
impl<F, G> Rule<F, G> for (Plain, Monadic)
where
    F: Combinator<Kind = Plain, Domain = <G::Codomain as Monad>::Value>,
    G: Combinator<Kind = Monadic>,
    G::Codomain: Monad,
{
    type Output = <<G::Codomain as Monad>::Family as Family>::Wrap<F::Codomain>;
    type Kind = Monadic;

    const STRATEGY: Strategy = Strategy::Kleisli;

    fn run(f: &F, g: &G, input: &G::Domain) -> Self::Output {
        monad::fmap(g.apply(input), |value| f.apply(&value))
    }
}

/// Monadic `g`, action `f`: bound like a plain `f`, but stays terminal.
impl<F, G> Rule<F, G> for (Terminal, Monadic)
where
    F: Combinator<Kind = Terminal, Domain = <G::Codomain as Monad>::Value>,
    G: Combinator<Kind = Monadic>,
    G::Codomain: Monad,
{
    type Output = <<G::Codomain as Monad>::Family as Family>::Wrap<F::Codomain>;
    type Kind = Terminal;

    const STRATEGY: Strategy = Strategy::Kleisli;

    fn run(f: &F, g: &G, input: &G::Domain) -> Self::Output {
        monad::fmap(g.apply(input), |value| f.apply(&value))
    }
}

/// Both monadic, same family: `bind(g(x), f)`.
impl<F, G> Rule<F, G> for (Monadic, Monadic)
where
    F: Combinator<Kind = Monadic, Domain = <G::Codomain as Monad>::Value>,
    G: Combinator<Kind = Monadic>,
    G::Codomain: Monad,
    F::Codomain: Monad<Family = <G::Codomain as Monad>::Family>,
{
    type Output = <<G::Codomain as Monad>::Family as Family>::Wrap<<F::Codomain as Monad>::Value>;
    type Kind = Monadic;

    const STRATEGY: Strategy = Strategy::Kleisli;

    fn run(f: &F, g: &G, input: &G::Domain) -> Self::Output {
        monad::bind(g.apply(input), |value| f.apply(&value).into_wrapped())
    }
}

/// The rule selected for `f ∘ g`.
type RuleOf<F, G> = (<F as Combinator>::Kind, <G as Combinator>::Kind);

// ============================================================================
// Composition
// ============================================================================

/// `f ∘ g`: apply `g`, then `f`.
#[derive(Clone)]
pub struct Composition<F, G> {
    descriptor: Descriptor,
    f: F,
    g: G,
}

impl<F, G> Composition<F, G> {
    /// The stage applied last.
    pub fn outer(&self) -> &F {
        &self.f
    }

    /// The stage applied first.
    pub fn inner(&self) -> &G {
        &self.g
    }
}

impl<F, G> Combinator for Composition<F, G>
where
    F: Combinator,
    G: Combinator,
    RuleOf<F, G>: Rule<F, G>,
{
    type Domain = G::Domain;
    type Codomain = <RuleOf<F, G> as Rule<F, G>>::Output;
    type Kind = <RuleOf<F, G> as Rule<F, G>>::Kind;

    fn apply(&self, input: &G::Domain) -> Self::Codomain {
        <RuleOf<F, G> as Rule<F, G>>::run(&self.f, &self.g, input)
    }

    fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    fn signature(&self) -> Signature {
        composed_signature(
            <RuleOf<F, G> as Rule<F, G>>::STRATEGY,
            &self.f.signature(),
            &self.g.signature(),
        )
    }

    fn expr(&self) -> Expr {
        Expr::assemble(
            self.descriptor.clone(),
            self.signature(),
            Node::Composition {
                strategy: <RuleOf<F, G> as Rule<F, G>>::STRATEGY,
                f: Box::new(self.f.expr()),
                g: Box::new(self.g.expr()),
            },
        )
    }
}

/// Build `f ∘ g`. Only compiles when a rule exists for the pair.
///
/// ```
/// use netlang_core::{compose, mfunction, property, render, Combinator};
///
/// let lookup = mfunction("lookup", |k: &u32| if *k < 10 { Some(*k * 2) } else { None });
/// let half = property("half", |v: &u32| *v / 2);
///
/// let pipeline = compose(half, lookup);
/// assert_eq!(pipeline.apply(&4), Some(4));
/// assert_eq!(pipeline.apply(&40), None);
/// assert_eq!(render(&pipeline), "half ∘ lookup");
/// ```
pub fn compose<F, G>(f: F, g: G) -> Composition<F, G>
where
    F: Combinator,
    G: Combinator,
    RuleOf<F, G>: Rule<F, G>,
{
    let strategy = <RuleOf<F, G> as Rule<F, G>>::STRATEGY;
    tracing::trace!(
        f = f.descriptor().name(),
        g = g.descriptor().name(),
        ?strategy,
        "compose"
    );
    Composition {
        descriptor: descriptor(),
        f,
        g,
    }
}

// ============================================================================
// Disambiguation
// ============================================================================

/// A monadic function seen as a plain one: the next stage receives the
/// whole wrapper instead of the bound value.
#[derive(Clone)]
pub struct AsPlain<G> {
    inner: G,
}

impl<G> Combinator for AsPlain<G>
where
    G: Combinator<Kind = Monadic>,
{
    type Domain = G::Domain;
    type Codomain = G::Codomain;
    type Kind = Plain;

    fn apply(&self, input: &G::Domain) -> G::Codomain {
        self.inner.apply(input)
    }

    fn descriptor(&self) -> &Descriptor {
        self.inner.descriptor()
    }

    fn signature(&self) -> Signature {
        Signature {
            shape: Shape::Plain,
            ..self.inner.signature()
        }
    }

    fn expr(&self) -> Expr {
        self.inner.expr().reshaped(Shape::Plain)
    }
}

/// Treat `g`'s wrapped output as a plain value.
///
/// ```
/// use netlang_core::{as_plain, compose, function, mfunction, Combinator};
///
/// let lookup = mfunction("lookup", |k: &u32| if *k < 10 { Some(*k) } else { None });
/// let found = function("found", |v: &Option<u32>| v.is_some());
///
/// let pipeline = compose(found, as_plain(lookup));
/// assert!(!pipeline.apply(&12));
/// ```
pub fn as_plain<G>(g: G) -> AsPlain<G>
where
    G: Combinator<Kind = Monadic>,
{
    AsPlain { inner: g }
}

//! # Connectives and Guards
//!
//! Predicates combine with the usual logical connectives. Each node owns its
//! operands and evaluates them lazily where the connective allows:
//!
//! - [`not`]: negation.
//! - [`and`]: the right operand is skipped when the left is false.
//! - [`or`]: the right operand is skipped when the left is true.
//! - [`xor`]: both operands are always evaluated.
//!
//! Guards run a body only when a predicate fires ([`when`]) or does not
//! ([`unless`]). The result is an `Option`: a guarded plain function becomes
//! monadic and composes by `bind`; a guarded action stays terminal.
//!
//! [`conditional`] picks one of two branches of the same kind, and is that
//! kind itself. The branch not taken is never evaluated.
//!
//! Operands must be plain predicates over the same domain. Anything else is
//! a type error:
//!
//! ```compile_fail
//! use netlang_core::{and, predicate, property};
//!
//! let is_even = predicate("isEven", |n: &u32| n % 2 == 0);
//! let half = property("half", |n: &u32| n / 2);
//! let _ = and(is_even, half);
//! ```

use std::marker::PhantomData;

use crate::descriptor::Descriptor;
use crate::expr::{Expr, Node};
use crate::function::Combinator;
use crate::monad::{Family, OptionFamily};
use crate::shape::{Kind, Monadic, Plain, Signature, Terminal, Ty};

// ============================================================================
// Operators
// ============================================================================

/// A unary boolean connective.
pub trait UnaryOp: Send + Sync + 'static {
    const NAME: &'static str;
    const SYMBOL: &'static str;

    fn eval(value: bool) -> bool;
}

/// A binary boolean connective. Operands are passed as thunks so the
/// connective decides what to evaluate.
pub trait BinaryOp: Send + Sync + 'static {
    const NAME: &'static str;
    const SYMBOL: &'static str;

    fn eval(lhs: impl FnOnce() -> bool, rhs: impl FnOnce() -> bool) -> bool;
}

/// When a guard lets its body run.
pub trait GuardOp: Send + Sync + 'static {
    const NAME: &'static str;
    const SYMBOL: &'static str;

    fn fires(test: bool) -> bool;
}

#[derive(Debug, Clone, Copy)]
pub struct Not;

#[derive(Debug, Clone, Copy)]
pub struct And;

#[derive(Debug, Clone, Copy)]
pub struct Or;

#[derive(Debug, Clone, Copy)]
pub struct Xor;

#[derive(Debug, Clone, Copy)]
pub struct When;

#[derive(Debug, Clone, Copy)]
pub struct Unless;

impl UnaryOp for Not {
    const NAME: &'static str = "not";
    const SYMBOL: &'static str = "not";

    fn eval(value: bool) -> bool {
        !value
    }
}

impl BinaryOp for And {
    const NAME: &'static str = "and";
    const SYMBOL: &'static str = "and";

    fn eval(lhs: impl FnOnce() -> bool, rhs: impl FnOnce() -> bool) -> bool {
        lhs() && rhs()
    }
}

impl BinaryOp for Or {
    const NAME: &'static str = "or";
    const SYMBOL: &'static str = "or";

    fn eval(lhs: impl FnOnce() -> bool, rhs: impl FnOnce() -> bool) -> bool {
        lhs() || rhs()
    }
}

impl BinaryOp for Xor {
    const NAME: &'static str = "xor";
    const SYMBOL: &'static str = "xor";

    fn eval(lhs: impl FnOnce() -> bool, rhs: impl FnOnce() -> bool) -> bool {
        let lhs = lhs();
        lhs != rhs()
    }
}

impl GuardOp for When {
    const NAME: &'static str = "when";
    const SYMBOL: &'static str = "then";

    fn fires(test: bool) -> bool {
        test
    }
}

impl GuardOp for Unless {
    const NAME: &'static str = "unless";
    const SYMBOL: &'static str = "else";

    fn fires(test: bool) -> bool {
        !test
    }
}

/// The kind of a stage whose result has been wrapped in `Option`.
pub trait Lift: Kind {
    type Lifted: Kind;
}

impl Lift for Plain {
    type Lifted = Monadic;
}

impl Lift for Terminal {
    type Lifted = Terminal;
}

// ============================================================================
// Nodes
// ============================================================================

/// A unary connective over one predicate.
pub struct Combinator1<Op, P> {
    descriptor: Descriptor,
    sub: P,
    op: PhantomData<fn() -> Op>,
}

/// A binary connective over two predicates.
pub struct Combinator2<Op, A, B> {
    descriptor: Descriptor,
    lhs: A,
    rhs: B,
    op: PhantomData<fn() -> Op>,
}

/// Runs `body` only when `Op` lets `pred` through.
pub struct Guard<Op, P, F> {
    descriptor: Descriptor,
    pred: P,
    body: F,
    op: PhantomData<fn() -> Op>,
}

impl<Op, P: Clone> Clone for Combinator1<Op, P> {
    fn clone(&self) -> Self {
        Self {
            descriptor: self.descriptor.clone(),
            sub: self.sub.clone(),
            op: PhantomData,
        }
    }
}

impl<Op, A: Clone, B: Clone> Clone for Combinator2<Op, A, B> {
    fn clone(&self) -> Self {
        Self {
            descriptor: self.descriptor.clone(),
            lhs: self.lhs.clone(),
            rhs: self.rhs.clone(),
            op: PhantomData,
        }
    }
}

impl<Op, P: Clone, F: Clone> Clone for Guard<Op, P, F> {
    fn clone(&self) -> Self {
        Self {
            descriptor: self.descriptor.clone(),
            pred: self.pred.clone(),
            body: self.body.clone(),
            op: PhantomData,
        }
    }
}

impl<Op, P> Combinator for Combinator1<Op, P>
where
    Op: UnaryOp,
    P: Combinator<Codomain = bool, Kind = Plain>,
{
    type Domain = P::Domain;
    type Codomain = bool;
    type Kind = Plain;

    fn apply(&self, input: &P::Domain) -> bool {
        Op::eval(self.sub.apply(input))
    }

    fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    fn signature(&self) -> Signature {
        Signature::predicate(self.sub.signature().domain)
    }

    fn expr(&self) -> Expr {
        Expr::assemble(
            self.descriptor.clone(),
            self.signature(),
            Node::Unary {
                sub: Box::new(self.sub.expr()),
            },
        )
    }
}

impl<Op, A, B> Combinator for Combinator2<Op, A, B>
where
    Op: BinaryOp,
    A: Combinator<Codomain = bool, Kind = Plain>,
    B: Combinator<Domain = A::Domain, Codomain = bool, Kind = Plain>,
{
    type Domain = A::Domain;
    type Codomain = bool;
    type Kind = Plain;

    fn apply(&self, input: &A::Domain) -> bool {
        Op::eval(|| self.lhs.apply(input), || self.rhs.apply(input))
    }

    fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    fn signature(&self) -> Signature {
        Signature::predicate(self.lhs.signature().domain)
    }

    fn expr(&self) -> Expr {
        Expr::assemble(
            self.descriptor.clone(),
            self.signature(),
            Node::Binary {
                lhs: Box::new(self.lhs.expr()),
                rhs: Box::new(self.rhs.expr()),
            },
        )
    }
}

impl<Op, P, F> Combinator for Guard<Op, P, F>
where
    Op: GuardOp,
    P: Combinator<Codomain = bool, Kind = Plain>,
    F: Combinator<Domain = P::Domain>,
    F::Kind: Lift,
{
    type Domain = P::Domain;
    type Codomain = Option<F::Codomain>;
    type Kind = <F::Kind as Lift>::Lifted;

    fn apply(&self, input: &P::Domain) -> Option<F::Codomain> {
        if Op::fires(self.pred.apply(input)) {
            Some(self.body.apply(input))
        } else {
            None
        }
    }

    fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    fn signature(&self) -> Signature {
        let body = self.body.signature();
        Signature::new(
            self.pred.signature().domain,
            Ty::wrapped(OptionFamily::name(), body.codomain),
            <Self::Kind as Kind>::SHAPE,
        )
    }

    fn expr(&self) -> Expr {
        Expr::assemble(
            self.descriptor.clone(),
            self.signature(),
            Node::Binary {
                lhs: Box::new(self.pred.expr()),
                rhs: Box::new(self.body.expr()),
            },
        )
    }
}

/// Runs `then` when `pred` holds and `otherwise` when it does not.
pub struct Conditional<P, F, G> {
    descriptor: Descriptor,
    pred: P,
    then: F,
    otherwise: G,
}

impl<P: Clone, F: Clone, G: Clone> Clone for Conditional<P, F, G> {
    fn clone(&self) -> Self {
        Self {
            descriptor: self.descriptor.clone(),
            pred: self.pred.clone(),
            then: self.then.clone(),
            otherwise: self.otherwise.clone(),
        }
    }
}

impl<P, F, G> Combinator for Conditional<P, F, G>
where
    P: Combinator<Codomain = bool, Kind = Plain>,
    F: Combinator<Domain = P::Domain>,
    G: Combinator<Domain = P::Domain, Codomain = F::Codomain, Kind = F::Kind>,
{
    type Domain = P::Domain;
    type Codomain = F::Codomain;
    type Kind = F::Kind;

    fn apply(&self, input: &P::Domain) -> F::Codomain {
        if self.pred.apply(input) {
            self.then.apply(input)
        } else {
            self.otherwise.apply(input)
        }
    }

    fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    fn signature(&self) -> Signature {
        let then = self.then.signature();
        Signature::new(self.pred.signature().domain, then.codomain, then.shape)
    }

    fn expr(&self) -> Expr {
        Expr::assemble(
            self.descriptor.clone(),
            self.signature(),
            Node::Conditional {
                pred: Box::new(self.pred.expr()),
                then: Box::new(self.then.expr()),
                otherwise: Box::new(self.otherwise.expr()),
            },
        )
    }
}

// ============================================================================
// Constructors
// ============================================================================

fn unary<Op: UnaryOp>() -> Descriptor {
    Descriptor::unary(Op::NAME, Op::SYMBOL)
}

fn binary<Op: BinaryOp>() -> Descriptor {
    Descriptor::binary(Op::NAME, Op::SYMBOL)
}

fn guard<Op: GuardOp>() -> Descriptor {
    Descriptor::binary(Op::NAME, Op::SYMBOL)
}

/// `!p(x)`.
pub fn not<P>(p: P) -> Combinator1<Not, P>
where
    P: Combinator<Codomain = bool, Kind = Plain>,
{
    Combinator1 {
        descriptor: unary::<Not>(),
        sub: p,
        op: PhantomData,
    }
}

fn connective<Op, A, B>(lhs: A, rhs: B) -> Combinator2<Op, A, B>
where
    Op: BinaryOp,
    A: Combinator<Codomain = bool, Kind = Plain>,
    B: Combinator<Domain = A::Domain, Codomain = bool, Kind = Plain>,
{
    Combinator2 {
        descriptor: binary::<Op>(),
        lhs,
        rhs,
        op: PhantomData,
    }
}

/// `a(x) && b(x)`.
///
/// ```
/// use netlang_core::{and, predicate, render, Combinator};
///
/// let small = predicate("small", |n: &u32| *n < 100);
/// let even = predicate("even", |n: &u32| n % 2 == 0);
/// let both = and(small, even);
///
/// assert!(both.apply(&42));
/// assert!(!both.apply(&101));
/// assert_eq!(render(&both), "small and even");
/// ```
pub fn and<A, B>(a: A, b: B) -> Combinator2<And, A, B>
where
    A: Combinator<Codomain = bool, Kind = Plain>,
    B: Combinator<Domain = A::Domain, Codomain = bool, Kind = Plain>,
{
    connective(a, b)
}

/// `a(x) || b(x)`.
pub fn or<A, B>(a: A, b: B) -> Combinator2<Or, A, B>
where
    A: Combinator<Codomain = bool, Kind = Plain>,
    B: Combinator<Domain = A::Domain, Codomain = bool, Kind = Plain>,
{
    connective(a, b)
}

/// `a(x) != b(x)`.
pub fn xor<A, B>(a: A, b: B) -> Combinator2<Xor, A, B>
where
    A: Combinator<Codomain = bool, Kind = Plain>,
    B: Combinator<Domain = A::Domain, Codomain = bool, Kind = Plain>,
{
    connective(a, b)
}

/// `Some(body(x))` when `pred(x)` holds.
pub fn when<P, F>(pred: P, body: F) -> Guard<When, P, F>
where
    P: Combinator<Codomain = bool, Kind = Plain>,
    F: Combinator<Domain = P::Domain>,
    F::Kind: Lift,
{
    Guard {
        descriptor: guard::<When>(),
        pred,
        body,
        op: PhantomData,
    }
}

/// `Some(body(x))` when `pred(x)` does not hold.
pub fn unless<P, F>(pred: P, body: F) -> Guard<Unless, P, F>
where
    P: Combinator<Codomain = bool, Kind = Plain>,
    F: Combinator<Domain = P::Domain>,
    F::Kind: Lift,
{
    Guard {
        descriptor: guard::<Unless>(),
        pred,
        body,
        op: PhantomData,
    }
}

/// `then(x)` if `pred(x)`, else `otherwise(x)`.
///
/// ```
/// use netlang_core::{action, conditional, predicate, render, Combinator};
///
/// let small = predicate("small", |n: &u32| *n < 100);
/// let keep = action("keep", |n: &u32| format!("keep {}", n));
/// let skip = action("skip", |_: &u32| String::from("skip"));
/// let route = conditional(small, keep, skip);
///
/// assert_eq!(route.apply(&7), "keep 7");
/// assert_eq!(route.apply(&700), "skip");
/// assert_eq!(render(&route), "if(small, keep, skip)");
/// ```
pub fn conditional<P, F, G>(pred: P, then: F, otherwise: G) -> Conditional<P, F, G>
where
    P: Combinator<Codomain = bool, Kind = Plain>,
    F: Combinator<Domain = P::Domain>,
    G: Combinator<Domain = P::Domain, Codomain = F::Codomain, Kind = F::Kind>,
{
    Conditional {
        descriptor: Descriptor::ternary("conditional", "if"),
        pred,
        then,
        otherwise,
    }
}

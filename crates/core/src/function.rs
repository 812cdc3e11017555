//! # Functions - Leaf Combinators
//!
//! The leaves of every tree are [`Function`] values: a shared callable, a
//! [`Descriptor`] and the constant arguments it was built with. The kind
//! parameter tells the composition engine how the leaf composes:
//!
//! | Alias | Codomain | Kind |
//! |-------|----------|------|
//! | [`Predicate<D>`] | `bool` | [`Plain`] |
//! | [`Property<D, V>`] | `V` | [`Plain`] |
//! | [`MonadicFunction<D, M>`] | `M: Monad` | [`Monadic`] |
//! | [`Action<D, R>`] | `R` | [`Terminal`] |
//!
//! A monadic function whose codomain is not a [`Monad`] does not compile, so
//! there are no shape errors at this layer.
//!
//! ```
//! use netlang_core::{predicate, render, Combinator};
//!
//! let has_port = predicate("hasPort", |p: &u16| *p == 80).with_arg(&80u16);
//! assert!(has_port.apply(&80));
//! assert_eq!(render(&has_port), "hasPort(80)");
//! ```

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::compose::{self, AsPlain, Composition, Rule};
use crate::descriptor::{Arity, Descriptor};
use crate::expr::{Expr, Node};
use crate::monad::{Family, Monad};
use crate::shape::{Kind, Monadic, Plain, Shape, Signature, Terminal, Ty};
use crate::show::Argument;

// ============================================================================
// Combinator
// ============================================================================

/// Anything that can sit in a combinator tree.
///
/// Implementations are immutable once built; `apply` never changes the tree,
/// so a tree can be shared across threads and evaluated concurrently.
pub trait Combinator: Send + Sync {
    /// Input type. May be unsized (`str`, `[u8]`).
    type Domain: ?Sized;

    /// Output type.
    type Codomain;

    /// How this combinator composes.
    type Kind: Kind;

    /// Evaluate on one input.
    fn apply(&self, input: &Self::Domain) -> Self::Codomain;

    fn descriptor(&self) -> &Descriptor;

    /// Structural signature, as seen by rendering and the checked layer.
    fn signature(&self) -> Signature;

    /// The structural tree rooted here.
    fn expr(&self) -> Expr;
}

/// Evaluate `tree` on `input`.
pub fn apply<C: Combinator + ?Sized>(tree: &C, input: &C::Domain) -> C::Codomain {
    tree.apply(input)
}

/// Method-style construction.
pub trait CombinatorExt: Combinator + Sized {
    /// `self ∘ g`: run `g` first, then `self`.
    fn after<G>(self, g: G) -> Composition<Self, G>
    where
        G: Combinator,
        (Self::Kind, G::Kind): Rule<Self, G>,
    {
        compose::compose(self, g)
    }

    /// `next ∘ self`: run `self` first, then `next`.
    fn then<F>(self, next: F) -> Composition<F, Self>
    where
        F: Combinator,
        (F::Kind, Self::Kind): Rule<F, Self>,
    {
        compose::compose(next, self)
    }

    /// See [`compose::as_plain`].
    fn as_plain(self) -> AsPlain<Self>
    where
        Self: Combinator<Kind = Monadic>,
    {
        compose::as_plain(self)
    }
}

impl<C: Combinator> CombinatorExt for C {}

// ============================================================================
// Function
// ============================================================================

/// A named leaf wrapping a callable.
pub struct Function<D: ?Sized, C, K = Plain> {
    descriptor: Descriptor,
    args: Vec<Argument>,
    body: Arc<dyn Fn(&D) -> C + Send + Sync>,
    kind: PhantomData<fn() -> K>,
}

/// A boolean test.
pub type Predicate<D> = Function<D, bool>;

/// A plain value extractor.
pub type Property<D, V> = Function<D, V>;

/// A function returning a monadic value.
pub type MonadicFunction<D, M> = Function<D, M, Monadic>;

/// A terminal leaf. Nothing composes after it.
pub type Action<D, R> = Function<D, R, Terminal>;

impl<D: ?Sized, C, K> Function<D, C, K> {
    /// Wrap `body` under `descriptor`. Leaves own no children, so the arity
    /// is always recorded as nullary.
    pub fn new(descriptor: Descriptor, body: impl Fn(&D) -> C + Send + Sync + 'static) -> Self
    where
        D: 'static,
        C: 'static,
    {
        let descriptor = match descriptor.arity() {
            Arity::Nullary => descriptor,
            _ => Descriptor::new(descriptor.name(), descriptor.symbol(), Arity::Nullary),
        };
        Self {
            descriptor,
            args: Vec::new(),
            body: Arc::new(body),
            kind: PhantomData,
        }
    }

    /// Attach a constant, rendered now if its type can be shown.
    pub fn with_arg<T: Any>(mut self, value: &T) -> Self {
        self.args.push(Argument::new(value));
        self
    }

    /// Attach an already captured argument.
    pub fn with_argument(mut self, arg: Argument) -> Self {
        self.args.push(arg);
        self
    }

    pub fn args(&self) -> &[Argument] {
        &self.args
    }

    /// Call the wrapped function.
    pub fn call(&self, input: &D) -> C {
        (self.body)(input)
    }

    fn leaf_expr(&self, signature: Signature) -> Expr {
        Expr::assemble(
            self.descriptor.clone(),
            signature,
            Node::Leaf {
                args: self.args.clone(),
            },
        )
    }
}

impl<D: ?Sized, C, K> Clone for Function<D, C, K> {
    fn clone(&self) -> Self {
        Self {
            descriptor: self.descriptor.clone(),
            args: self.args.clone(),
            body: Arc::clone(&self.body),
            kind: PhantomData,
        }
    }
}

impl<D: ?Sized, C, K: Kind> fmt::Debug for Function<D, C, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("descriptor", &self.descriptor)
            .field("args", &self.args)
            .field("shape", &K::SHAPE)
            .finish()
    }
}

impl<D: ?Sized, C> Combinator for Function<D, C, Plain> {
    type Domain = D;
    type Codomain = C;
    type Kind = Plain;

    fn apply(&self, input: &D) -> C {
        self.call(input)
    }

    fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    fn signature(&self) -> Signature {
        Signature::new(Ty::of::<D>(), Ty::of::<C>(), Shape::Plain)
    }

    fn expr(&self) -> Expr {
        self.leaf_expr(self.signature())
    }
}

impl<D: ?Sized, M: Monad> Combinator for Function<D, M, Monadic> {
    type Domain = D;
    type Codomain = M;
    type Kind = Monadic;

    fn apply(&self, input: &D) -> M {
        self.call(input)
    }

    fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    fn signature(&self) -> Signature {
        let codomain = Ty::wrapped(<M::Family as Family>::name(), Ty::of::<M::Value>());
        Signature::new(Ty::of::<D>(), codomain, Shape::Monadic)
    }

    fn expr(&self) -> Expr {
        self.leaf_expr(self.signature())
    }
}

impl<D: ?Sized, R> Combinator for Function<D, R, Terminal> {
    type Domain = D;
    type Codomain = R;
    type Kind = Terminal;

    fn apply(&self, input: &D) -> R {
        self.call(input)
    }

    fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    fn signature(&self) -> Signature {
        Signature::new(Ty::of::<D>(), Ty::of::<R>(), Shape::Terminal)
    }

    fn expr(&self) -> Expr {
        self.leaf_expr(self.signature())
    }
}

// ============================================================================
// Constructors
// ============================================================================

/// A plain function.
pub fn function<D, C>(name: &str, body: impl Fn(&D) -> C + Send + Sync + 'static) -> Function<D, C>
where
    D: ?Sized + 'static,
    C: 'static,
{
    Function::new(Descriptor::leaf(name), body)
}

/// A boolean test.
pub fn predicate<D>(name: &str, body: impl Fn(&D) -> bool + Send + Sync + 'static) -> Predicate<D>
where
    D: ?Sized + 'static,
{
    Function::new(Descriptor::leaf(name), body)
}

/// A value extractor.
pub fn property<D, V>(name: &str, body: impl Fn(&D) -> V + Send + Sync + 'static) -> Property<D, V>
where
    D: ?Sized + 'static,
    V: 'static,
{
    Function::new(Descriptor::leaf(name), body)
}

/// A function returning `Option`, `Result` or another [`Monad`].
pub fn mfunction<D, M>(
    name: &str,
    body: impl Fn(&D) -> M + Send + Sync + 'static,
) -> MonadicFunction<D, M>
where
    D: ?Sized + 'static,
    M: Monad + 'static,
{
    Function::new(Descriptor::leaf(name), body)
}

/// A terminal leaf.
pub fn action<D, R>(name: &str, body: impl Fn(&D) -> R + Send + Sync + 'static) -> Action<D, R>
where
    D: ?Sized + 'static,
    R: 'static,
{
    Function::new(Descriptor::leaf(name), body)
}

//! # Expressions - The Structural View of a Tree
//!
//! Every combinator tree has a structural description, [`Expr`]: a tagged
//! variant over the node kinds, each node owning its children and carrying
//! its [`Descriptor`] and [`Signature`]. Children are boxed values, so an
//! `Expr` is always a finite tree.
//!
//! `Expr` serves two consumers:
//!
//! - Rendering and export. Typed trees produce their `Expr` through
//!   [`Combinator::expr`](crate::function::Combinator::expr).
//! - A surface compiler that knows only names and signatures. The checked
//!   constructors below apply the same composition rules the typed layer
//!   enforces at compile time, and return [`LangError`] instead.
//!
//! ```
//! use netlang_core::{Descriptor, Expr, Signature, Shape, Ty};
//!
//! let packet = Ty::named("Packet");
//! let port = Ty::named("u16");
//!
//! let src_port = Expr::leaf(
//!     Descriptor::leaf("srcPort"),
//!     Signature::new(packet.clone(), port.clone(), Shape::Plain),
//!     vec![],
//! ).unwrap();
//! let to_text = Expr::leaf(
//!     Descriptor::leaf("toString"),
//!     Signature::new(port, Ty::named("String"), Shape::Plain),
//!     vec![],
//! ).unwrap();
//!
//! let composed = Expr::compose(to_text, src_port).unwrap();
//! assert_eq!(composed.to_string(), "toString ∘ srcPort");
//! assert_eq!(composed.signature().domain, packet);
//! ```

use serde::Serialize;

use crate::compose::{self, Strategy};
use crate::descriptor::Descriptor;
use crate::error::LangError;
use crate::monad::{Family, OptionFamily};
use crate::shape::{Shape, Signature, Ty};
use crate::show::Argument;

/// A node of the structural tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expr {
    descriptor: Descriptor,
    signature: Signature,
    node: Node,
}

/// The node kinds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    /// A leaf with its rendered arguments.
    Leaf { args: Vec<Argument> },
    /// A unary connective (`not`).
    Unary { sub: Box<Expr> },
    /// A binary connective or guard.
    Binary { lhs: Box<Expr>, rhs: Box<Expr> },
    /// `pred ? then : otherwise`. Only the taken branch is evaluated.
    Conditional {
        pred: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    /// `f ∘ g`: `g` is applied first.
    Composition {
        strategy: Strategy,
        f: Box<Expr>,
        g: Box<Expr>,
    },
}

impl Expr {
    /// Assemble a node whose well-formedness is already guaranteed (by the
    /// type system, for the typed layer).
    pub(crate) fn assemble(descriptor: Descriptor, signature: Signature, node: Node) -> Self {
        Self {
            descriptor,
            signature,
            node,
        }
    }

    /// The same node under a different shape. Used by adapters that change
    /// how a stage is composed without changing what it computes.
    pub(crate) fn reshaped(mut self, shape: Shape) -> Self {
        self.signature.shape = shape;
        self
    }

    // ------------------------------------------------------------------------
    // Checked construction
    // ------------------------------------------------------------------------

    /// A leaf combinator.
    ///
    /// The signature must agree with its shape: monadic leaves return a
    /// wrapped value, plain leaves and actions do not, and no leaf returns
    /// `Any`.
    pub fn leaf(
        descriptor: Descriptor,
        signature: Signature,
        args: Vec<Argument>,
    ) -> Result<Self, LangError> {
        expect_arity(&descriptor, 0)?;

        let invalid = |reason: &str| LangError::InvalidSignature {
            name: descriptor.name().to_string(),
            reason: reason.to_string(),
        };
        if signature.codomain == Ty::Any {
            return Err(invalid("codomain cannot be '_'"));
        }
        match (signature.shape, signature.codomain.is_wrapped()) {
            (Shape::Monadic, false) => return Err(invalid("monadic codomain must be wrapped")),
            (Shape::Plain, true) => return Err(invalid("plain codomain must not be wrapped")),
            (Shape::Terminal, true) => return Err(invalid("action codomain must not be wrapped")),
            _ => {}
        }

        Ok(Self::assemble(descriptor, signature, Node::Leaf { args }))
    }

    /// A unary connective over a predicate.
    pub fn combinator1(descriptor: Descriptor, sub: Expr) -> Result<Self, LangError> {
        expect_arity(&descriptor, 1)?;
        expect_predicate(&sub)?;

        let signature = Signature::predicate(sub.signature.domain.clone());
        Ok(Self::assemble(
            descriptor,
            signature,
            Node::Unary { sub: Box::new(sub) },
        ))
    }

    /// A binary connective over two predicates on the same domain.
    pub fn combinator2(descriptor: Descriptor, lhs: Expr, rhs: Expr) -> Result<Self, LangError> {
        expect_arity(&descriptor, 2)?;
        expect_predicate(&lhs)?;
        expect_predicate(&rhs)?;
        let domain = common_domain(&lhs, &rhs)?;

        Ok(Self::assemble(
            descriptor,
            Signature::predicate(domain),
            Node::Binary {
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
        ))
    }

    /// A guard: `body` runs only when `pred` fires, the result is optional.
    ///
    /// A plain body makes the guard monadic (`Option`); an action body keeps
    /// it terminal.
    pub fn guard(descriptor: Descriptor, pred: Expr, body: Expr) -> Result<Self, LangError> {
        expect_arity(&descriptor, 2)?;
        expect_predicate(&pred)?;
        let domain = common_domain(&pred, &body)?;

        let shape = match body.signature.shape {
            Shape::Plain => Shape::Monadic,
            Shape::Terminal => Shape::Terminal,
            Shape::Monadic => {
                return Err(LangError::InvalidSignature {
                    name: body.descriptor.name().to_string(),
                    reason: "guarded body must be plain or an action".to_string(),
                })
            }
        };
        let codomain = Ty::wrapped(OptionFamily::name(), body.signature.codomain.clone());

        Ok(Self::assemble(
            descriptor,
            Signature::new(domain, codomain, shape),
            Node::Binary {
                lhs: Box::new(pred),
                rhs: Box::new(body),
            },
        ))
    }

    /// A two-way conditional: `then` when `pred` holds, `otherwise` when it
    /// does not.
    ///
    /// Both branches share the predicate's domain and must agree on codomain
    /// and shape. The node takes the branches' shape, so no wrapping occurs.
    pub fn conditional(
        descriptor: Descriptor,
        pred: Expr,
        then: Expr,
        otherwise: Expr,
    ) -> Result<Self, LangError> {
        expect_arity(&descriptor, 3)?;
        expect_predicate(&pred)?;
        let domain = common_domain(&pred, &then)?;
        let domain = meet(&domain, &otherwise.signature.domain)?;

        if then.signature.shape != otherwise.signature.shape {
            return Err(LangError::InvalidSignature {
                name: otherwise.descriptor.name().to_string(),
                reason: format!(
                    "branches must share a shape, got {} and {}",
                    then.signature.shape, otherwise.signature.shape
                ),
            });
        }
        let codomain = meet(&then.signature.codomain, &otherwise.signature.codomain)?;
        let shape = then.signature.shape;

        Ok(Self::assemble(
            descriptor,
            Signature::new(domain, codomain, shape),
            Node::Conditional {
                pred: Box::new(pred),
                then: Box::new(then),
                otherwise: Box::new(otherwise),
            },
        ))
    }

    /// `f ∘ g`, with the strategy resolved from the signatures.
    ///
    /// Fails with [`LangError::AmbiguousComposition`] when both the plain and
    /// the monadic reading fit; use [`Expr::compose_with`] to pick one.
    pub fn compose(f: Expr, g: Expr) -> Result<Self, LangError> {
        let strategy = compose::resolve(&f, &g).map_err(|err| rejected(err, &f, &g))?;
        Self::compose_with(strategy, f, g)
    }

    /// `f ∘ g` with an explicit strategy.
    pub fn compose_with(strategy: Strategy, f: Expr, g: Expr) -> Result<Self, LangError> {
        compose::check(strategy, &f, &g).map_err(|err| rejected(err, &f, &g))?;

        let signature = compose::composed_signature(strategy, &f.signature, &g.signature);
        tracing::debug!(
            f = f.descriptor.name(),
            g = g.descriptor.name(),
            ?strategy,
            %signature,
            "composed"
        );
        Ok(Self::assemble(
            compose::descriptor(),
            signature,
            Node::Composition {
                strategy,
                f: Box::new(f),
                g: Box::new(g),
            },
        ))
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    /// Direct children, in rendering order.
    pub fn children(&self) -> Vec<&Expr> {
        match &self.node {
            Node::Leaf { .. } => vec![],
            Node::Unary { sub } => vec![&**sub],
            Node::Binary { lhs, rhs } => vec![&**lhs, &**rhs],
            Node::Conditional {
                pred,
                then,
                otherwise,
            } => vec![&**pred, &**then, &**otherwise],
            Node::Composition { f, g, .. } => vec![&**f, &**g],
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.node, Node::Leaf { .. })
    }

    /// Height of the tree (a leaf has depth 1).
    pub fn depth(&self) -> usize {
        1 + self.children().iter().map(|c| c.depth()).max().unwrap_or(0)
    }

    /// Number of nodes.
    pub fn size(&self) -> usize {
        1 + self.children().iter().map(|c| c.size()).sum::<usize>()
    }

    /// Leaves from left to right.
    pub fn leaves(&self) -> Vec<&Expr> {
        if self.is_leaf() {
            return vec![self];
        }
        self.children().into_iter().flat_map(|c| c.leaves()).collect()
    }
}

fn expect_arity(descriptor: &Descriptor, actual: usize) -> Result<(), LangError> {
    if descriptor.arity().count() != actual {
        return Err(LangError::ArityMismatch {
            name: descriptor.name().to_string(),
            declared: descriptor.arity(),
            actual,
        });
    }
    Ok(())
}

fn expect_predicate(expr: &Expr) -> Result<(), LangError> {
    if !expr.signature.is_predicate() {
        return Err(LangError::NotAPredicate {
            name: expr.descriptor.name().to_string(),
            codomain: expr.signature.codomain.clone(),
        });
    }
    Ok(())
}

/// The domain two operands share.
fn common_domain(lhs: &Expr, rhs: &Expr) -> Result<Ty, LangError> {
    meet(&lhs.signature.domain, &rhs.signature.domain)
}

/// The more specific of two compatible types (`_` yields to the other).
fn meet(a: &Ty, b: &Ty) -> Result<Ty, LangError> {
    if a.accepts(b) {
        Ok(b.clone())
    } else if b.accepts(a) {
        Ok(a.clone())
    } else {
        Err(LangError::ShapeMismatch {
            expected: a.clone(),
            got: b.clone(),
        })
    }
}

fn rejected(err: LangError, f: &Expr, g: &Expr) -> LangError {
    tracing::debug!(
        f = f.descriptor.name(),
        g = g.descriptor.name(),
        %err,
        "composition rejected"
    );
    err
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packet() -> Ty {
        Ty::named("Packet")
    }

    fn pred(name: &str) -> Expr {
        Expr::leaf(Descriptor::leaf(name), Signature::predicate(packet()), vec![]).unwrap()
    }

    fn plain(name: &str, dom: Ty, cod: Ty) -> Expr {
        Expr::leaf(Descriptor::leaf(name), Signature::new(dom, cod, Shape::Plain), vec![]).unwrap()
    }

    fn monadic(name: &str, dom: Ty, family: &str, inner: Ty) -> Expr {
        Expr::leaf(
            Descriptor::leaf(name),
            Signature::new(dom, Ty::wrapped(family, inner), Shape::Monadic),
            vec![],
        )
        .unwrap()
    }

    fn action(name: &str) -> Expr {
        Expr::leaf(
            Descriptor::leaf(name),
            Signature::new(packet(), Ty::named("Verdict"), Shape::Terminal),
            vec![],
        )
        .unwrap()
    }

    #[test]
    fn test_leaf_shape_validation() {
        let bad = Expr::leaf(
            Descriptor::leaf("lookup"),
            Signature::new(Ty::named("Key"), Ty::named("Value"), Shape::Monadic),
            vec![],
        );
        assert!(matches!(bad, Err(LangError::InvalidSignature { .. })));

        let bad = Expr::leaf(
            Descriptor::leaf("srcPort"),
            Signature::new(packet(), Ty::wrapped("Option", Ty::named("u16")), Shape::Plain),
            vec![],
        );
        assert!(matches!(bad, Err(LangError::InvalidSignature { .. })));
    }

    #[test]
    fn test_leaf_rejects_operator_descriptor() {
        let result = Expr::leaf(
            Descriptor::binary("and", "and"),
            Signature::predicate(packet()),
            vec![],
        );
        assert!(matches!(
            result,
            Err(LangError::ArityMismatch { actual: 0, .. })
        ));
    }

    #[test]
    fn test_combinator2_structure() {
        let and = Expr::combinator2(Descriptor::binary("and", "and"), pred("isTCP"), pred("isPort80"))
            .unwrap();

        assert!(and.signature().is_predicate());
        assert_eq!(and.children().len(), and.descriptor().arity().count());
        assert_eq!(and.size(), 3);
        assert_eq!(and.depth(), 2);
        assert_eq!(and.to_string(), "isTCP and isPort80");
    }

    #[test]
    fn test_combinator_requires_predicates() {
        let port = plain("srcPort", packet(), Ty::named("u16"));
        let result = Expr::combinator1(Descriptor::unary("not", "not"), port);
        assert!(matches!(result, Err(LangError::NotAPredicate { .. })));
    }

    #[test]
    fn test_combinator_arity_checked() {
        let result = Expr::combinator1(Descriptor::binary("and", "and"), pred("isTCP"));
        assert!(matches!(
            result,
            Err(LangError::ArityMismatch { actual: 1, .. })
        ));
    }

    #[test]
    fn test_combinator2_domain_mismatch() {
        let other = Expr::leaf(
            Descriptor::leaf("isEven"),
            Signature::predicate(Ty::named("u64")),
            vec![],
        )
        .unwrap();
        let result = Expr::combinator2(Descriptor::binary("or", "or"), pred("isTCP"), other);
        assert!(matches!(result, Err(LangError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_plain_composition() {
        let port = plain("srcPort", packet(), Ty::named("u16"));
        let text = plain("toString", Ty::named("u16"), Ty::named("String"));
        let composed = Expr::compose(text, port).unwrap();

        assert_eq!(
            composed.signature(),
            &Signature::new(packet(), Ty::named("String"), Shape::Plain)
        );
        assert!(matches!(
            composed.node(),
            Node::Composition {
                strategy: Strategy::Plain,
                ..
            }
        ));
    }

    #[test]
    fn test_kleisli_composition() {
        let lookup = monadic("lookup", Ty::named("Key"), "Option", Ty::named("Value"));
        let use_ = monadic("use", Ty::named("Value"), "Option", Ty::named("Outcome"));
        let composed = Expr::compose(use_, lookup).unwrap();

        assert_eq!(
            composed.signature().codomain,
            Ty::wrapped("Option", Ty::named("Outcome"))
        );
        assert_eq!(composed.signature().shape, Shape::Monadic);
        assert!(matches!(
            composed.node(),
            Node::Composition {
                strategy: Strategy::Kleisli,
                ..
            }
        ));
    }

    #[test]
    fn test_monad_mismatch() {
        let lookup = monadic("lookup", Ty::named("Key"), "Option", Ty::named("Value"));
        let parse = monadic("parse", Ty::named("Value"), "Result", Ty::named("Outcome"));
        let result = Expr::compose(parse, lookup);
        assert!(matches!(result, Err(LangError::MonadMismatch { .. })));
    }

    #[test]
    fn test_shape_mismatch() {
        let port = plain("srcPort", packet(), Ty::named("u16"));
        let result = Expr::compose(port.clone(), port);
        assert_eq!(
            result,
            Err(LangError::ShapeMismatch {
                expected: packet(),
                got: Ty::named("u16"),
            })
        );
    }

    #[test]
    fn test_ambiguous_composition() {
        let lookup = monadic("lookup", Ty::named("Key"), "Option", Ty::named("Value"));
        let show = plain("show", Ty::Any, Ty::named("String"));

        let result = Expr::compose(show.clone(), lookup.clone());
        assert_eq!(
            result,
            Err(LangError::AmbiguousComposition {
                f: "show".to_string(),
                g: "lookup".to_string(),
            })
        );

        let whole = Expr::compose_with(Strategy::Plain, show.clone(), lookup.clone()).unwrap();
        assert_eq!(whole.signature().codomain, Ty::named("String"));

        let inner = Expr::compose_with(Strategy::Kleisli, show, lookup).unwrap();
        assert_eq!(
            inner.signature().codomain,
            Ty::wrapped("Option", Ty::named("String"))
        );
    }

    #[test]
    fn test_compose_past_action_rejected() {
        let drop = action("drop");
        let log = plain("log", Ty::named("Verdict"), Ty::named("Verdict"));
        let result = Expr::compose(log, drop);
        assert_eq!(
            result,
            Err(LangError::ComposePastAction {
                action: "drop".to_string()
            })
        );
    }

    #[test]
    fn test_action_as_outer_stage() {
        let lookup = monadic("route", packet(), "Option", packet());
        let composed = Expr::compose(action("drop"), lookup).unwrap();
        assert_eq!(composed.signature().shape, Shape::Terminal);
        assert_eq!(
            composed.signature().codomain,
            Ty::wrapped("Option", Ty::named("Verdict"))
        );
    }

    #[test]
    fn test_guard_signature() {
        let guarded = Expr::guard(Descriptor::binary("when", "then"), pred("isTCP"), action("drop"))
            .unwrap();
        assert_eq!(guarded.signature().shape, Shape::Terminal);
        assert_eq!(guarded.to_string(), "isTCP then drop");

        let monadic_body = monadic("route", packet(), "Option", packet());
        let result = Expr::guard(Descriptor::binary("when", "then"), pred("isTCP"), monadic_body);
        assert!(matches!(result, Err(LangError::InvalidSignature { .. })));
    }

    fn ternary() -> Descriptor {
        Descriptor::ternary("conditional", "if")
    }

    #[test]
    fn test_conditional_signature() {
        let tree = Expr::conditional(ternary(), pred("isTCP"), action("pass"), action("drop")).unwrap();
        assert_eq!(
            tree.signature(),
            &Signature::new(packet(), Ty::named("Verdict"), Shape::Terminal)
        );
        assert_eq!(tree.size(), 4);
        assert_eq!(tree.to_string(), "if(isTCP, pass, drop)");

        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(json["node"]["kind"], "conditional");
        assert_eq!(json["node"]["otherwise"]["descriptor"]["name"], "drop");
    }

    #[test]
    fn test_conditional_branches_must_agree() {
        let port = plain("srcPort", packet(), Ty::named("u16"));
        let proto = plain("ipProto", packet(), Ty::named("u8"));
        let result = Expr::conditional(ternary(), pred("isTCP"), port.clone(), proto);
        assert_eq!(
            result,
            Err(LangError::ShapeMismatch {
                expected: Ty::named("u16"),
                got: Ty::named("u8"),
            })
        );

        let result = Expr::conditional(ternary(), pred("isTCP"), port, action("drop"));
        assert!(matches!(result, Err(LangError::InvalidSignature { .. })));
    }

    #[test]
    fn test_conditional_checks_predicate_and_arity() {
        let port = plain("srcPort", packet(), Ty::named("u16"));
        let result = Expr::conditional(ternary(), port.clone(), port.clone(), port.clone());
        assert!(matches!(result, Err(LangError::NotAPredicate { .. })));

        let result = Expr::conditional(
            Descriptor::binary("when", "then"),
            pred("isTCP"),
            port.clone(),
            port,
        );
        assert!(matches!(
            result,
            Err(LangError::ArityMismatch { actual: 3, .. })
        ));
    }

    #[test]
    fn test_leaves_in_order() {
        let tree = Expr::combinator2(
            Descriptor::binary("or", "or"),
            Expr::combinator1(Descriptor::unary("not", "not"), pred("isUDP")).unwrap(),
            pred("isICMP"),
        )
        .unwrap();
        let names: Vec<&str> = tree.leaves().iter().map(|l| l.descriptor().name()).collect();
        assert_eq!(names, vec!["isUDP", "isICMP"]);
        assert_eq!(tree.to_string(), "not(isUDP) or isICMP");
    }
}

//! # Show - Capability-Based Rendering
//!
//! Rendering a combinator tree must not require every value flowing through
//! it to be printable. Leaves may carry constant arguments (the `80` in
//! `hasPort(80)`) of arbitrary types; whether such a value can be shown is a
//! *capability* of its type, looked up once when the argument is attached.
//!
//! ## Design
//!
//! - [`Renderers`]: a registry of text converters keyed by `TypeId`. A type is
//!   renderable iff a converter is registered for it.
//! - [`Argument`]: an attached constant, already rendered (or marked opaque)
//!   at construction.
//! - [`render`] / [`render_with`]: walk the structural [`Expr`] of a tree.
//!   Rendering never evaluates anything.
//!
//! ## Output
//!
//! | Node | Rendering |
//! |------|-----------|
//! | leaf | `name`, or `name(arg, ..)` |
//! | opaque argument | `<opaque>` |
//! | unary | `symbol(sub)` |
//! | binary | `lhs symbol rhs` |
//! | conditional | `symbol(pred, then, otherwise)` |
//! | composition | `f ∘ g` (g is applied first) |

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};

use crate::config::RenderConfig;
use crate::expr::{Expr, Node};
use crate::function::Combinator;

// ============================================================================
// Renderer Registry
// ============================================================================

type RenderFn = Arc<dyn Fn(&dyn Any) -> Option<String> + Send + Sync>;

/// A registry of text converters indexed by value type.
///
/// # Example
///
/// ```
/// use netlang_core::show::Renderers;
///
/// struct Mac([u8; 6]);
///
/// let mut renderers = Renderers::with_standard();
/// assert!(!renderers.can_render::<Mac>());
///
/// renderers.register_with::<Mac>(|mac| {
///     mac.0.iter().map(|b| format!("{:02x}", b)).collect::<Vec<_>>().join(":")
/// });
/// let text = renderers.render(&Mac([0, 1, 2, 3, 4, 5]));
/// assert_eq!(text.as_deref(), Some("00:01:02:03:04:05"));
/// ```
#[derive(Clone, Default)]
pub struct Renderers {
    table: HashMap<TypeId, RenderFn>,
}

impl Renderers {
    /// An empty registry: every argument renders opaque.
    pub fn new() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// A registry with converters for the primitive types, strings, IP
    /// addresses and vectors of those.
    pub fn with_standard() -> Self {
        let mut r = Self::new();
        r.register::<u8>()
            .register::<u16>()
            .register::<u32>()
            .register::<u64>()
            .register::<u128>()
            .register::<usize>()
            .register::<i8>()
            .register::<i16>()
            .register::<i32>()
            .register::<i64>()
            .register::<i128>()
            .register::<isize>()
            .register::<f32>()
            .register::<f64>()
            .register::<bool>()
            .register::<char>()
            .register::<Ipv4Addr>()
            .register::<Ipv6Addr>()
            .register_with::<String>(|s| quote(s))
            .register_with::<&'static str>(|s| quote(s))
            .register_vec::<u8>()
            .register_vec::<u16>()
            .register_vec::<u32>()
            .register_vec::<u64>()
            .register_vec::<i32>()
            .register_vec::<i64>()
            .register_vec::<Ipv4Addr>()
            .register_with::<Vec<String>>(|v| list(v.iter().map(|s| quote(s))));
        r
    }

    /// The shared standard registry.
    pub fn standard() -> &'static Renderers {
        static STANDARD: OnceLock<Renderers> = OnceLock::new();
        STANDARD.get_or_init(Renderers::with_standard)
    }

    /// Register `T` using its `Display` implementation.
    pub fn register<T: fmt::Display + 'static>(&mut self) -> &mut Self {
        self.register_with::<T>(|v| v.to_string())
    }

    /// Register `Vec<T>` as `[a b c]`.
    pub fn register_vec<T: fmt::Display + 'static>(&mut self) -> &mut Self {
        self.register_with::<Vec<T>>(|v| list(v.iter().map(|e| e.to_string())))
    }

    /// Register `T` with a custom converter. Replaces any previous one.
    pub fn register_with<T: 'static>(
        &mut self,
        convert: impl Fn(&T) -> String + Send + Sync + 'static,
    ) -> &mut Self {
        let erased: RenderFn = Arc::new(move |any: &dyn Any| any.downcast_ref::<T>().map(&convert));
        self.table.insert(TypeId::of::<T>(), erased);
        self
    }

    /// Whether `T` has the rendering capability.
    pub fn can_render<T: 'static>(&self) -> bool {
        self.table.contains_key(&TypeId::of::<T>())
    }

    /// Render `value`, or `None` if its type has no converter.
    pub fn render<T: 'static>(&self, value: &T) -> Option<String> {
        self.table
            .get(&TypeId::of::<T>())
            .and_then(|convert| convert(value as &dyn Any))
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl fmt::Debug for Renderers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderers")
            .field("types", &self.table.len())
            .finish()
    }
}

/// Quoted with `"` and `\` escaped.
fn quote(s: &str) -> String {
    format!("{:?}", s)
}

fn list(items: impl Iterator<Item = String>) -> String {
    format!("[{}]", items.collect::<Vec<_>>().join(" "))
}

// ============================================================================
// Arguments
// ============================================================================

/// A constant attached to a leaf, rendered at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Argument {
    type_name: String,
    text: Option<String>,
}

impl Argument {
    /// Capture `value` using the standard registry.
    pub fn new<T: Any>(value: &T) -> Self {
        Self::with(Renderers::standard(), value)
    }

    /// Capture `value` using `renderers`.
    pub fn with<T: Any>(renderers: &Renderers, value: &T) -> Self {
        let text = renderers.render(value);
        if text.is_none() {
            tracing::trace!(
                type_name = type_name::<T>(),
                "no renderer registered, argument is opaque"
            );
        }
        Self {
            type_name: type_name::<T>().to_string(),
            text,
        }
    }

    /// An argument known to be unrenderable.
    pub fn opaque<T: ?Sized>() -> Self {
        Self {
            type_name: type_name::<T>().to_string(),
            text: None,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The rendered value, if the type had the capability.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn is_opaque(&self) -> bool {
        self.text.is_none()
    }

    fn render<'a>(&'a self, config: &'a RenderConfig) -> &'a str {
        self.text.as_deref().unwrap_or(config.opaque.as_str())
    }
}

// ============================================================================
// Rendering
// ============================================================================

/// Render a combinator tree with the default configuration.
pub fn render<C: Combinator + ?Sized>(tree: &C) -> String {
    render_expr(&tree.expr(), &RenderConfig::default())
}

/// Render a combinator tree with `config`.
pub fn render_with<C: Combinator + ?Sized>(tree: &C, config: &RenderConfig) -> String {
    render_expr(&tree.expr(), config)
}

/// Render a structural expression.
pub fn render_expr(expr: &Expr, config: &RenderConfig) -> String {
    let mut out = String::new();
    write_expr(&mut out, expr, config);
    out
}

fn write_expr(out: &mut String, expr: &Expr, config: &RenderConfig) {
    let descriptor = expr.descriptor();
    match expr.node() {
        Node::Leaf { args } => {
            out.push_str(descriptor.name());
            if config.show_args && !args.is_empty() {
                let rendered: Vec<&str> = args.iter().map(|a| a.render(config)).collect();
                out.push('(');
                out.push_str(&rendered.join(", "));
                out.push(')');
            }
        }
        Node::Unary { sub } => {
            out.push_str(descriptor.symbol());
            out.push('(');
            write_expr(out, sub, config);
            out.push(')');
        }
        Node::Binary { lhs, rhs } => {
            write_operand(out, lhs, config);
            out.push(' ');
            out.push_str(descriptor.symbol());
            out.push(' ');
            write_operand(out, rhs, config);
        }
        Node::Conditional {
            pred,
            then,
            otherwise,
        } => {
            out.push_str(descriptor.symbol());
            out.push('(');
            write_expr(out, pred, config);
            out.push_str(", ");
            write_expr(out, then, config);
            out.push_str(", ");
            write_expr(out, otherwise, config);
            out.push(')');
        }
        Node::Composition { f, g, .. } => {
            write_stage(out, f, config);
            out.push(' ');
            out.push_str(&config.compose_symbol);
            out.push(' ');
            write_stage(out, g, config);
        }
    }
}

/// Operand of a binary connective: compound operands are grouped.
fn write_operand(out: &mut String, expr: &Expr, config: &RenderConfig) {
    let compound = matches!(expr.node(), Node::Binary { .. } | Node::Composition { .. });
    if compound && config.parenthesize {
        out.push('(');
        write_expr(out, expr, config);
        out.push(')');
    } else {
        write_expr(out, expr, config);
    }
}

/// Stage of a composition: nested compositions are flattened, since
/// composition is associative.
fn write_stage(out: &mut String, expr: &Expr, config: &RenderConfig) {
    match expr.node() {
        Node::Composition { .. } => write_expr(out, expr, config),
        _ => write_operand(out, expr, config),
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", render_expr(self, &RenderConfig::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Descriptor;
    use crate::shape::{Shape, Signature, Ty};

    struct NoShow;

    #[test]
    fn test_standard_primitives() {
        let r = Renderers::standard();
        assert_eq!(r.render(&80u16).as_deref(), Some("80"));
        assert_eq!(r.render(&true).as_deref(), Some("true"));
        assert_eq!(r.render(&"eth0").as_deref(), Some("\"eth0\""));
        assert_eq!(r.render(&String::from("eth0")).as_deref(), Some("\"eth0\""));
        assert_eq!(
            r.render(&Ipv4Addr::new(192, 168, 0, 1)).as_deref(),
            Some("192.168.0.1")
        );
    }

    #[test]
    fn test_standard_vectors() {
        let r = Renderers::standard();
        assert_eq!(r.render(&vec![22u16, 80, 443]).as_deref(), Some("[22 80 443]"));
        assert_eq!(
            r.render(&vec!["a".to_string(), "b".to_string()]).as_deref(),
            Some("[\"a\" \"b\"]")
        );
    }

    #[test]
    fn test_missing_capability_is_opaque() {
        let r = Renderers::standard();
        assert!(!r.can_render::<NoShow>());
        assert_eq!(r.render(&NoShow), None);

        let arg = Argument::new(&NoShow);
        assert!(arg.is_opaque());
        assert!(arg.type_name().ends_with("NoShow"));
        assert_eq!(arg.render(&RenderConfig::default()), "<opaque>");
    }

    #[test]
    fn test_capability_fixed_at_construction() {
        let mut r = Renderers::new();
        let before = Argument::with(&r, &7u32);
        r.register::<u32>();
        let after = Argument::with(&r, &7u32);

        assert!(before.is_opaque());
        assert_eq!(after.text(), Some("7"));
    }

    #[test]
    fn test_strings_escaped() {
        let r = Renderers::standard();
        assert_eq!(r.render(&"a\"b").as_deref(), Some(r#""a\"b""#));
        assert_eq!(r.render(&String::from("c:\\tmp")).as_deref(), Some(r#""c:\\tmp""#));
    }

    #[test]
    fn test_opaque_argument_matches_unrenderable_capture() {
        assert_eq!(Argument::opaque::<NoShow>(), Argument::new(&NoShow));
        assert_eq!(Argument::opaque::<str>().type_name(), "str");
    }

    fn leaf(name: &str, args: Vec<Argument>) -> Expr {
        Expr::leaf(
            Descriptor::leaf(name),
            Signature::predicate(Ty::named("Packet")),
            args,
        )
        .unwrap()
    }

    fn binary(name: &str, lhs: Expr, rhs: Expr) -> Expr {
        Expr::combinator2(Descriptor::binary(name, name), lhs, rhs).unwrap()
    }

    #[test]
    fn test_config_without_parentheses() {
        let tree = binary(
            "or",
            binary("and", leaf("isTCP", vec![]), leaf("isPort80", vec![])),
            leaf("isUDP", vec![]),
        );
        assert_eq!(render_expr(&tree, &RenderConfig::default()), "(isTCP and isPort80) or isUDP");

        let flat = RenderConfig::default().with_parentheses(false);
        assert_eq!(render_expr(&tree, &flat), "isTCP and isPort80 or isUDP");
    }

    #[test]
    fn test_config_opaque_token() {
        let tree = leaf("hasHandle", vec![Argument::opaque::<NoShow>(), Argument::new(&3u8)]);
        let config = RenderConfig::default().with_opaque("?");

        assert_eq!(tree.to_string(), "hasHandle(<opaque>, 3)");
        assert_eq!(render_expr(&tree, &config), "hasHandle(?, 3)");
    }

    #[test]
    fn test_conditional_rendering() {
        let verdict = |name: &str| {
            Expr::leaf(
                Descriptor::leaf(name),
                Signature::new(Ty::named("Packet"), Ty::named("Verdict"), Shape::Terminal),
                vec![],
            )
            .unwrap()
        };
        let tree = Expr::conditional(
            Descriptor::ternary("conditional", "if"),
            binary("and", leaf("isTCP", vec![]), leaf("isPort80", vec![])),
            verdict("pass"),
            verdict("drop"),
        )
        .unwrap();
        assert_eq!(tree.to_string(), "if(isTCP and isPort80, pass, drop)");
    }

    #[test]
    fn test_register_replaces() {
        let mut r = Renderers::new();
        r.register::<u16>();
        r.register_with::<u16>(|p| format!("port {}", p));
        assert_eq!(r.len(), 1);
        assert_eq!(r.render(&443u16).as_deref(), Some("port 443"));
    }
}

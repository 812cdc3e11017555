//! Rendering configuration.

use serde::{Deserialize, Serialize};

/// Controls how expression trees are rendered to text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Placeholder for arguments whose type has no renderer
    pub opaque: String,
    /// Symbol placed between the operands of a composition
    pub compose_symbol: String,
    /// Render leaf arguments (`hasPort(80)` rather than `hasPort`)
    pub show_args: bool,
    /// Parenthesise compound operands of binary nodes
    pub parenthesize: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            opaque: "<opaque>".to_string(),
            compose_symbol: "∘".to_string(),
            show_args: true,
            parenthesize: true,
        }
    }
}

impl RenderConfig {
    /// Set the opaque placeholder.
    pub fn with_opaque(mut self, token: impl Into<String>) -> Self {
        self.opaque = token.into();
        self
    }

    /// Set the composition symbol.
    pub fn with_compose_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.compose_symbol = symbol.into();
        self
    }

    /// Show or hide leaf arguments.
    pub fn with_args(mut self, show: bool) -> Self {
        self.show_args = show;
        self
    }

    /// Enable or disable parentheses around compound operands.
    pub fn with_parentheses(mut self, parenthesize: bool) -> Self {
        self.parenthesize = parenthesize;
        self
    }
}

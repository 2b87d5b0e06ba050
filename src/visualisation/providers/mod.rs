//! Built-in providers.

mod grid;
mod image;
mod math;
mod tabular;

use std::sync::Arc;

pub use grid::GridLayoutProvider;
pub use image::IncludeGraphicsProvider;
pub use math::MathProvider;
pub use tabular::TabularProvider;

use crate::base::SourceFileRange;
use crate::syntax::{AstNodeKind, NodeRef};

use super::model::ModelContext;
use super::provider::{ProviderRegistry, VisualisationModelProvider};

/// Every built-in provider, in registration order.
pub fn builtin_providers() -> Vec<Arc<dyn VisualisationModelProvider>> {
    vec![
        Arc::new(IncludeGraphicsProvider),
        Arc::new(TabularProvider),
        Arc::new(GridLayoutProvider),
        Arc::new(MathProvider),
    ]
}

impl ProviderRegistry {
    /// Registry of the built-in providers, optionally limited to the kinds
    /// named in `enabled`.
    pub fn builtin(enabled: Option<&[String]>) -> Self {
        let mut registry = Self::new();
        for provider in builtin_providers() {
            if enabled.is_some_and(|names| !names.iter().any(|name| name == provider.name())) {
                tracing::debug!(provider = provider.name(), "provider disabled by configuration");
                continue;
            }
            registry.register(provider);
        }
        registry
    }
}

/// Curly parameter blocks of a command or environment.
pub(crate) fn curly_blocks<'a>(node: NodeRef<'a>) -> Vec<NodeRef<'a>> {
    node.parameter_blocks()
        .into_iter()
        .filter(|block| matches!(block.kind(), AstNodeKind::CurlyBracesParameterBlock(_)))
        .collect()
}

/// Source text between the first and last of `nodes`, if any.
pub(crate) fn span_text<'a>(context: &ModelContext<'a>, nodes: &[NodeRef<'_>]) -> Option<&'a str> {
    match (nodes.first(), nodes.last()) {
        (Some(first), Some(last)) => {
            context.text_in(SourceFileRange::spanning(first.range().from(), last.range().to()))
        }
        _ => Some(""),
    }
}

/// Text inside a parameter block, without its delimiters.
pub(crate) fn block_text<'a>(context: &ModelContext<'a>, block: NodeRef<'_>) -> Option<&'a str> {
    let children: Vec<_> = block.children().collect();
    span_text(context, &children)
}

/// Non-trivia nodes with the surrounding trivia trimmed off both ends.
pub(crate) fn trim_trivia<'a>(nodes: &[NodeRef<'a>]) -> Vec<NodeRef<'a>> {
    let start = nodes.iter().position(|node| !node.kind().is_trivia());
    let end = nodes.iter().rposition(|node| !node.kind().is_trivia());
    match (start, end) {
        (Some(start), Some(end)) => nodes[start..=end].to_vec(),
        _ => Vec::new(),
    }
}

//! The provider contract and the provider registry.

use std::sync::Arc;

use thiserror::Error;

use crate::mappings::CodeMapping;
use crate::syntax::NodeRef;

use super::model::{ModelContext, VisualisationModel};

/// Errors a provider reports when it cannot build a model for a pair.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The node lacks a parameter the provider needs.
    #[error("{provider}: missing {what}")]
    MissingParameter {
        provider: &'static str,
        what: &'static str,
    },

    /// The node is not one the provider can read.
    #[error("{provider}: cannot build a model from {node}")]
    UnsupportedNode { provider: &'static str, node: String },

    /// The node's range no longer maps onto the file text.
    #[error("{provider}: node text is out of date")]
    StaleNode { provider: &'static str },
}

/// A visualisation kind: which mappings and nodes it accepts, and how it
/// turns a correlated pair into a model.
///
/// Providers are stateless and shared across threads during extraction.
pub trait VisualisationModelProvider: Send + Sync {
    /// Kind name, matched against [`CodeMapping::kind`].
    fn name(&self) -> &'static str;

    fn can_provide_for_code_mapping(&self, mapping: &CodeMapping) -> bool {
        mapping.kind == self.name()
    }

    /// Static match predicate used to collect candidate nodes.
    fn can_provide_for_node(&self, node: NodeRef<'_>) -> bool;

    fn provide_model_with(&self, context: &ModelContext<'_>) -> Result<VisualisationModel, ProviderError>;
}

/// Registered providers in registration order.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn VisualisationModelProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider. A second provider with an already registered
    /// name is ignored.
    pub fn register(&mut self, provider: Arc<dyn VisualisationModelProvider>) -> bool {
        if self.get(provider.name()).is_some() {
            tracing::warn!(provider = provider.name(), "provider already registered");
            return false;
        }
        tracing::debug!(provider = provider.name(), "registered provider");
        self.providers.push(provider);
        true
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn VisualisationModelProvider>> {
        self.providers.iter().find(|provider| provider.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn VisualisationModelProvider>> {
        self.providers.iter()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|provider| provider.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// The first provider, in registration order, that accepts `mapping`.
    pub fn assign(&self, mapping: &CodeMapping) -> Option<usize> {
        self.providers
            .iter()
            .position(|provider| provider.can_provide_for_code_mapping(mapping))
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

use indexmap::IndexMap;

use crate::syntax::{AstNodeKind, NodeRef};
use crate::visualisation::model::{ImageContent, ModelContent, ModelContext, VisualisationModel};
use crate::visualisation::provider::{ProviderError, VisualisationModelProvider};

use super::{block_text, curly_blocks};

const NAME: &str = "includegraphics";

/// `\includegraphics[options]{path}`
#[derive(Debug, Clone, Copy, Default)]
pub struct IncludeGraphicsProvider;

impl VisualisationModelProvider for IncludeGraphicsProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    fn can_provide_for_node(&self, node: NodeRef<'_>) -> bool {
        node.command_name()
            .is_some_and(|name| name.trim_end_matches('*') == NAME)
            && !curly_blocks(node).is_empty()
    }

    fn provide_model_with(&self, context: &ModelContext<'_>) -> Result<VisualisationModel, ProviderError> {
        let node = context.node;
        let Some(path_block) = curly_blocks(node).last().copied() else {
            return Err(ProviderError::MissingParameter {
                provider: NAME,
                what: "image path",
            });
        };
        let path = block_text(context, path_block)
            .ok_or(ProviderError::StaleNode { provider: NAME })?
            .trim()
            .to_string();

        let mut options = IndexMap::new();
        for block in node.parameter_blocks() {
            if !matches!(block.kind(), AstNodeKind::SquareBracesParameterBlock(_)) {
                continue;
            }
            for item in block.children().flat_map(|list| list.children()) {
                match item.kind() {
                    AstNodeKind::ParameterAssignment(assignment) => {
                        options.insert(assignment.key.clone(), Some(assignment.value.clone()));
                    }
                    AstNodeKind::Parameter(parameter) => {
                        options.insert(parameter.value.clone(), None);
                    }
                    _ => {}
                }
            }
        }

        Ok(context.model(NAME, ModelContent::Image(ImageContent { path, options })))
    }
}

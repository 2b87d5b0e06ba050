use crate::syntax::NodeRef;
use crate::visualisation::model::{MathContent, ModelContent, ModelContext, VisualisationModel};
use crate::visualisation::provider::{ProviderError, VisualisationModelProvider};

const NAME: &str = "math";

/// Display math: `$$…$$`, `\[…\]` and math environments.
#[derive(Debug, Clone, Copy, Default)]
pub struct MathProvider;

impl VisualisationModelProvider for MathProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    fn can_provide_for_node(&self, node: NodeRef<'_>) -> bool {
        node.kind().as_math().is_some_and(|math| math.is_display())
    }

    fn provide_model_with(&self, context: &ModelContext<'_>) -> Result<VisualisationModel, ProviderError> {
        let math = context
            .node
            .kind()
            .as_math()
            .ok_or_else(|| ProviderError::UnsupportedNode {
                provider: NAME,
                node: context.node.kind().to_string(),
            })?;
        let content = MathContent {
            source: math.content.clone(),
            display: math.is_display(),
        };
        Ok(context.model(NAME, ModelContent::Math(content)))
    }
}

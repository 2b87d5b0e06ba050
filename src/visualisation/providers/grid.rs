use crate::syntax::NodeRef;
use crate::visualisation::model::{GridCell, GridContent, GridRow, ModelContent, ModelContext, VisualisationModel};
use crate::visualisation::provider::{ProviderError, VisualisationModelProvider};

use super::{block_text, curly_blocks, span_text, trim_trivia};

const NAME: &str = "gridlayout";

/// `gridlayout` environments made of nested `row` and `cell` environments:
///
/// ```text
/// \begin{gridlayout}
///   \begin{row}{3cm}
///     \begin{cell}{0.5} left \end{cell}
///     \begin{cell}{0.5} right \end{cell}
///   \end{row}
/// \end{gridlayout}
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct GridLayoutProvider;

impl VisualisationModelProvider for GridLayoutProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    fn can_provide_for_node(&self, node: NodeRef<'_>) -> bool {
        node.environment_name() == Some(NAME)
    }

    fn provide_model_with(&self, context: &ModelContext<'_>) -> Result<VisualisationModel, ProviderError> {
        let node = context.node;
        if node.environment_name() != Some(NAME) {
            return Err(ProviderError::UnsupportedNode {
                provider: NAME,
                node: node.kind().to_string(),
            });
        }

        let mut rows = Vec::new();
        for row in environments_named(node, "row") {
            let mut cells = Vec::new();
            for cell in environments_named(row, "cell") {
                let body = trim_trivia(&cell.environment_body());
                let content = span_text(context, &body)
                    .ok_or(ProviderError::StaleNode { provider: NAME })?
                    .to_string();
                cells.push(GridCell {
                    width: first_argument(context, cell)?,
                    content,
                });
            }
            rows.push(GridRow {
                height: first_argument(context, row)?,
                cells,
            });
        }

        if rows.is_empty() {
            tracing::debug!(node = %node.id(), "grid layout without rows");
        }
        Ok(context.model(NAME, ModelContent::Grid(GridContent { rows })))
    }
}

fn environments_named<'a>(node: NodeRef<'a>, name: &str) -> impl Iterator<Item = NodeRef<'a>> {
    node.environment_body()
        .into_iter()
        .filter(move |child| child.environment_name() == Some(name))
}

fn first_argument(context: &ModelContext<'_>, node: NodeRef<'_>) -> Result<Option<String>, ProviderError> {
    curly_blocks(node)
        .first()
        .map(|block| {
            block_text(context, *block)
                .map(|text| text.trim().to_string())
                .ok_or(ProviderError::StaleNode { provider: NAME })
        })
        .transpose()
}

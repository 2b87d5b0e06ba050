use crate::syntax::{AstNodeKind, NodeRef};
use crate::visualisation::model::{ModelContent, ModelContext, TabularContent, VisualisationModel};
use crate::visualisation::provider::{ProviderError, VisualisationModelProvider};

use super::{block_text, curly_blocks, span_text, trim_trivia};

const NAME: &str = "tabular";

const ENVIRONMENTS: &[&str] = &["tabular", "tabular*", "tabularx"];

/// Horizontal rules between rows; they are not cell content.
const RULES: &[&str] = &["hline", "cline", "toprule", "midrule", "bottomrule", "cmidrule"];

/// `tabular`, `tabular*` and `tabularx` environments.
#[derive(Debug, Clone, Copy, Default)]
pub struct TabularProvider;

impl VisualisationModelProvider for TabularProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    fn can_provide_for_node(&self, node: NodeRef<'_>) -> bool {
        node.environment_name().is_some_and(|name| ENVIRONMENTS.contains(&name))
    }

    fn provide_model_with(&self, context: &ModelContext<'_>) -> Result<VisualisationModel, ProviderError> {
        let node = context.node;
        let environment = node
            .environment_name()
            .ok_or_else(|| ProviderError::UnsupportedNode {
                provider: NAME,
                node: node.kind().to_string(),
            })?
            .to_string();

        let blocks = curly_blocks(node);
        let Some(spec_block) = blocks.last().copied() else {
            return Err(ProviderError::MissingParameter {
                provider: NAME,
                what: "column specification",
            });
        };
        let column_spec = block_text(context, spec_block)
            .ok_or(ProviderError::StaleNode { provider: NAME })?
            .trim()
            .to_string();
        let width = match blocks.as_slice() {
            [width, _, ..] => Some(
                block_text(context, *width)
                    .ok_or(ProviderError::StaleNode { provider: NAME })?
                    .trim()
                    .to_string(),
            ),
            _ => None,
        };

        let rows = cells(context, node)?;
        let content = TabularContent {
            environment,
            width,
            column_spec,
            rows,
        };
        Ok(context.model(NAME, ModelContent::Tabular(content)))
    }
}

/// Split the body on `\\` into rows and on `&` into cells.
fn cells(context: &ModelContext<'_>, node: NodeRef<'_>) -> Result<Vec<Vec<String>>, ProviderError> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut cell = Vec::new();

    for child in node.environment_body() {
        match child.kind() {
            AstNodeKind::SpecialSymbol(symbol) if symbol.symbol == "&" => {
                row.push(cell_text(context, &cell)?);
                cell.clear();
            }
            AstNodeKind::SpecialSymbol(symbol) if symbol.symbol == "\\\\" => {
                row.push(cell_text(context, &cell)?);
                cell.clear();
                rows.push(std::mem::take(&mut row));
            }
            AstNodeKind::Command(command) if RULES.contains(&command.name.as_str()) => {}
            _ => cell.push(child),
        }
    }

    // A final row without a trailing `\\`
    let last = cell_text(context, &cell)?;
    if !row.is_empty() || !last.is_empty() {
        row.push(last);
        rows.push(row);
    }
    Ok(rows)
}

fn cell_text(context: &ModelContext<'_>, nodes: &[NodeRef<'_>]) -> Result<String, ProviderError> {
    let nodes = trim_trivia(nodes);
    span_text(context, &nodes)
        .map(|text| text.trim().to_string())
        .ok_or(ProviderError::StaleNode { provider: NAME })
}

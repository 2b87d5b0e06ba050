//! Assertions over trees and visualisation models.

use ilatex::visualisation::ModelContent;
use ilatex::{SourceFile, VisualisationModel};

/// Kind and effective start of every attached node, in pre-order.
pub fn tree_shape(file: &SourceFile) -> Vec<(String, usize, usize)> {
    let ast = file.ast();
    ast.descendants(ast.root_id())
        .into_iter()
        .filter_map(|id| ast.get(id))
        .map(|node| {
            let start = node.range().from();
            (node.kind().to_string(), start.line(), start.column())
        })
        .collect()
}

pub fn kinds(models: &[VisualisationModel]) -> Vec<&'static str> {
    models.iter().map(|model| model.kind).collect()
}

pub fn of_kind<'m>(models: &'m [VisualisationModel], kind: &str) -> Vec<&'m VisualisationModel> {
    models.iter().filter(|model| model.kind == kind).collect()
}

/// Every model's node starts on the line its mapping names.
pub fn assert_models_on_mapping_lines(models: &[VisualisationModel]) {
    for model in models {
        assert_eq!(
            model.range.from().line() + 1,
            model.mapping.line,
            "model {} ({}) is not on its mapping line",
            model.kind,
            model.mapping.id
        );
    }
}

pub fn tabular_rows(model: &VisualisationModel) -> Vec<Vec<String>> {
    match &model.content {
        ModelContent::Tabular(table) => table.rows.clone(),
        other => panic!("expected tabular content, got {other:?}"),
    }
}

pub fn math_source(model: &VisualisationModel) -> String {
    match &model.content {
        ModelContent::Math(math) => math.source.clone(),
        other => panic!("expected math content, got {other:?}"),
    }
}

//! Visualisation models and the context providers build them from.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Serialize;
use uuid::Uuid;

use crate::base::SourceFileRange;
use crate::mappings::CodeMapping;
use crate::syntax::{NodeId, NodeRef, SourceFile};

/// One correlated (node, mapping, file) triple, ready for a renderer.
///
/// Models are replaced wholesale on every extraction; `uid` is fresh each
/// time.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualisationModel {
    pub uid: Uuid,
    pub kind: &'static str,
    pub source_file: PathBuf,
    pub node: NodeId,
    /// Range of the node at extraction time.
    pub range: SourceFileRange,
    pub mapping: CodeMapping,
    pub content: ModelContent,
}

impl VisualisationModel {
    /// The `(node, mapping identity)` pairing, stable across extractions of
    /// an unchanged document.
    pub fn pairing(&self) -> (NodeId, (&Path, u64)) {
        (self.node, self.mapping.identity())
    }
}

/// Kind-specific data of a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelContent {
    Image(ImageContent),
    Tabular(TabularContent),
    Grid(GridContent),
    Math(MathContent),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageContent {
    pub path: String,
    /// `key=value` options, with flag options mapped to `None`.
    pub options: IndexMap<String, Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TabularContent {
    pub environment: String,
    /// Width argument of `tabular*` and `tabularx`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    pub column_spec: String,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridContent {
    pub rows: Vec<GridRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
    pub cells: Vec<GridCell>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridCell {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MathContent {
    pub source: String,
    pub display: bool,
}

/// Everything a provider may look at while building one model.
#[derive(Debug, Clone, Copy)]
pub struct ModelContext<'a> {
    pub file: &'a SourceFile,
    pub node: NodeRef<'a>,
    pub mapping: &'a CodeMapping,
}

impl<'a> ModelContext<'a> {
    pub fn new(file: &'a SourceFile, node: NodeRef<'a>, mapping: &'a CodeMapping) -> Self {
        Self { file, node, mapping }
    }

    /// Current source text of the node.
    pub fn node_text(&self) -> Option<&'a str> {
        self.file.node_text(self.node.id())
    }

    /// Current source text between the ends of `range`.
    pub fn text_in(&self, range: SourceFileRange) -> Option<&'a str> {
        self.file.text_in(range)
    }

    /// Wrap `content` into a model bound to this context's node, mapping and file.
    pub fn model(&self, kind: &'static str, content: ModelContent) -> VisualisationModel {
        VisualisationModel {
            uid: Uuid::new_v4(),
            kind,
            source_file: self.file.path().to_path_buf(),
            node: self.node.id(),
            range: self.node.range(),
            mapping: self.mapping.clone(),
            content,
        }
    }
}

//! A parsed LaTeX source file.
//!
//! The file keeps its text and tree in step. Plain edits only move node
//! positions; rewriting a node's source swaps in a freshly parsed subtree
//! when that is equivalent to a full reparse, and reparses otherwise.

use std::mem::discriminant;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::base::{LineIndex, SourceFilePosition, SourceFileRange, TextEdit};
use crate::parser::{ParseError, parse, parse_fragment_into};

use super::ast::{Ast, NodeId, NodeRef};

/// Errors raised while editing a [`SourceFile`].
#[derive(Debug, Error)]
pub enum EditError {
    #[error("edit ends on line {line} but the file has {line_count} lines")]
    OutOfBounds { line: usize, line_count: usize },

    #[error("node {0} is not part of the file's tree")]
    UnknownNode(NodeId),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// How [`SourceFile::replace_node_source`] updated the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Replacement {
    /// The new subtree took the old node's place; its id is returned.
    Incremental(NodeId),
    /// The whole file was reparsed.
    Reparsed,
}

/// A LaTeX source file: its path, current text and syntax tree.
#[derive(Debug, Clone)]
pub struct SourceFile {
    path: PathBuf,
    text: String,
    ast: Ast,
}

impl SourceFile {
    /// Parse `text` into a new source file.
    pub fn parse(path: impl Into<PathBuf>, text: impl Into<String>) -> Result<Self, ParseError> {
        let text = text.into();
        let ast = parse(&text)?;
        Ok(Self {
            path: path.into(),
            text,
            ast,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    pub fn root(&self) -> NodeRef<'_> {
        self.ast.root()
    }

    /// Current text covered by a node, using its effective range.
    pub fn node_text(&self, id: NodeId) -> Option<&str> {
        self.text_in(self.ast.get(id)?.range())
    }

    /// Current text between the effective ends of `range`.
    pub fn text_in(&self, range: SourceFileRange) -> Option<&str> {
        let index = LineIndex::new(&self.text);
        let start = self.offset(&index, range.from());
        let end = self.offset(&index, range.to());
        self.text.get(start..end)
    }

    fn offset(&self, index: &LineIndex, position: SourceFilePosition) -> usize {
        index.offset(&self.text, position.line(), position.column())
    }

    /// Replace the text and parse it from scratch.
    ///
    /// On a parse error the file keeps its previous text and tree.
    pub fn set_text(&mut self, text: impl Into<String>) -> Result<(), ParseError> {
        let text = text.into();
        self.ast = parse(&text)?;
        self.text = text;
        Ok(())
    }

    /// Parse the current text from scratch.
    pub fn reparse(&mut self) -> Result<(), ParseError> {
        self.ast = parse(&self.text)?;
        tracing::debug!(path = %self.path.display(), nodes = self.ast.len(), "reparsed source file");
        Ok(())
    }

    /// Apply a text edit without reparsing: the text changes and every node
    /// position moves through the edit.
    pub fn apply_edit(&mut self, edit: &TextEdit) -> Result<(), EditError> {
        self.splice(edit).map(|_| ())
    }

    /// Apply `edit`, returning the byte offset where the new text starts.
    fn splice(&mut self, edit: &TextEdit) -> Result<usize, EditError> {
        let index = LineIndex::new(&self.text);
        let last_line = edit.range.to().line();
        if last_line >= index.line_count() {
            return Err(EditError::OutOfBounds {
                line: last_line,
                line_count: index.line_count(),
            });
        }
        let start = self.offset(&index, edit.range.from());
        let end = self.offset(&index, edit.range.to());
        self.text.replace_range(start..end, &edit.new_text);
        self.ast.apply_edit(edit);
        tracing::trace!(path = %self.path.display(), range = %edit.range, "applied edit");
        Ok(start)
    }

    /// Rewrite the source of an attached node.
    ///
    /// When `new_text` parses as exactly one node of the same kind, bounded
    /// by whitespace so it cannot merge with its neighbours, that node
    /// replaces the old one in its parent. Otherwise the file is reparsed.
    /// If the reparse fails the text keeps the edit and the tree stays as
    /// [`apply_edit`](Self::apply_edit) left it.
    pub fn replace_node_source(&mut self, id: NodeId, new_text: &str) -> Result<Replacement, EditError> {
        if id == self.ast.root_id() {
            self.set_text(new_text)?;
            return Ok(Replacement::Reparsed);
        }
        let (range, parent, old_kind) = match self.ast.get(id) {
            Some(node) if self.ast.is_attached(id) => (node.range(), node.parent(), discriminant(node.kind())),
            _ => return Err(EditError::UnknownNode(id)),
        };
        let Some(parent) = parent else {
            return Err(EditError::UnknownNode(id));
        };

        let edit = TextEdit::new(range, new_text);
        let start = self.splice(&edit)?;
        let end = start + new_text.len();

        // Positions before the edit are unchanged, so the old start is still
        // where the new subtree begins.
        let origin = range.from().rebased();
        let replacement = match parse_fragment_into(&mut self.ast, new_text, origin) {
            Ok(nodes) if nodes.len() == 1 => {
                let same_kind = self
                    .ast
                    .get(nodes[0])
                    .is_some_and(|node| discriminant(node.kind()) == old_kind);
                (same_kind && self.is_isolated(start, end)).then_some(nodes[0])
            }
            Ok(nodes) => {
                tracing::debug!(path = %self.path.display(), nodes = nodes.len(), "replacement is not a single node");
                None
            }
            Err(error) => {
                tracing::debug!(path = %self.path.display(), %error, "replacement does not parse on its own");
                None
            }
        };

        match replacement {
            Some(new) if self.ast.replace_child_node(parent, id, new) => {
                tracing::debug!(path = %self.path.display(), old = %id, %new, "replaced node source");
                Ok(Replacement::Incremental(new))
            }
            _ => {
                self.reparse()?;
                Ok(Replacement::Reparsed)
            }
        }
    }

    /// Whether the text between the byte offsets is bounded by whitespace or
    /// the file edges, so lexing it alone gives the same tokens as in place.
    fn is_isolated(&self, start: usize, end: usize) -> bool {
        let before = self.text[..start].chars().next_back();
        let after = self.text[end..].chars().next();
        before.is_none_or(char::is_whitespace) && after.is_none_or(char::is_whitespace)
    }

    /// Free nodes detached by earlier replacements.
    pub fn free_detached(&mut self) -> usize {
        self.ast.free_detached()
    }
}

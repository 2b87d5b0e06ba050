//! Code mappings and their JSON-lines batch format.
//!
//! The build step writes one JSON object per line:
//!
//! ```text
//! {"kind":"tabular","id":3,"source_file":"chapters/results.tex","line":42}
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while reading a mapping batch.
#[derive(Debug, Error)]
pub enum MappingError {
    #[error("failed to read mappings from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A line is not a valid mapping object.
    #[error("malformed mapping on line {line}: {source}")]
    Malformed {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// Mapping line numbers are 1-indexed.
    #[error("mapping on line {line} points at source line 0")]
    ZeroLine { line: usize },
}

/// An annotation linking a visualisation in the compiled output to a line
/// of a source file.
///
/// Identity is `(source_file, id)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CodeMapping {
    /// Name of the visualisation kind this mapping was emitted for.
    pub kind: String,
    pub id: u64,
    pub source_file: PathBuf,
    /// 1-indexed source line.
    pub line: usize,
}

impl CodeMapping {
    pub fn new(kind: impl Into<String>, id: u64, source_file: impl Into<PathBuf>, line: usize) -> Self {
        Self {
            kind: kind.into(),
            id,
            source_file: source_file.into(),
            line,
        }
    }

    pub fn identity(&self) -> (&Path, u64) {
        (&self.source_file, self.id)
    }

    /// The 0-indexed line a matching node starts on.
    pub fn node_line(&self) -> Option<usize> {
        self.line.checked_sub(1)
    }
}

/// Parse a JSON-lines mapping batch. Blank lines are skipped.
pub fn parse_mappings(text: &str) -> Result<Vec<CodeMapping>, MappingError> {
    let mut mappings = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        if raw.trim().is_empty() {
            continue;
        }
        let mapping: CodeMapping =
            serde_json::from_str(raw).map_err(|source| MappingError::Malformed { line, source })?;
        if mapping.line == 0 {
            return Err(MappingError::ZeroLine { line });
        }
        mappings.push(mapping);
    }
    Ok(mappings)
}

/// Read and parse a mapping batch file.
pub fn load_mappings(path: &Path) -> Result<Vec<CodeMapping>, MappingError> {
    let text = fs::read_to_string(path).map_err(|source| MappingError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_mappings(&text)
}

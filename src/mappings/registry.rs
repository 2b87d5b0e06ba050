use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use super::mapping::CodeMapping;

/// Code mappings grouped by source file.
///
/// Each file's batch is replaced wholesale when a new one arrives.
#[derive(Debug, Clone, Default)]
pub struct CodeMappingRegistry {
    by_file: FxHashMap<PathBuf, Vec<CodeMapping>>,
}

impl CodeMappingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the batch of `file`.
    ///
    /// Mappings that name another source file are skipped. When two mappings
    /// share an id the later one wins, in the place of the first.
    pub fn set_file_mappings(&mut self, file: impl Into<PathBuf>, mappings: impl IntoIterator<Item = CodeMapping>) {
        let file = file.into();
        let mut by_id: IndexMap<u64, CodeMapping> = IndexMap::new();
        for mapping in mappings {
            if mapping.source_file != file {
                tracing::warn!(
                    file = %file.display(),
                    mapping_file = %mapping.source_file.display(),
                    id = mapping.id,
                    "skipping mapping for another source file"
                );
                continue;
            }
            if let Some(previous) = by_id.insert(mapping.id, mapping) {
                tracing::warn!(
                    file = %file.display(),
                    id = previous.id,
                    line = previous.line,
                    "duplicate code mapping id, keeping the later one"
                );
            }
        }
        tracing::debug!(file = %file.display(), count = by_id.len(), "registered code mappings");
        self.by_file.insert(file, by_id.into_values().collect());
    }

    /// Group a mixed batch by source file and replace the batch of every
    /// file it mentions. Files absent from the batch keep their mappings.
    pub fn set_mappings(&mut self, mappings: impl IntoIterator<Item = CodeMapping>) {
        let mut grouped: IndexMap<PathBuf, Vec<CodeMapping>> = IndexMap::new();
        for mapping in mappings {
            grouped.entry(mapping.source_file.clone()).or_default().push(mapping);
        }
        for (file, batch) in grouped {
            self.set_file_mappings(file, batch);
        }
    }

    /// Mappings of `file` in batch order.
    pub fn mappings_for(&self, file: &Path) -> &[CodeMapping] {
        self.by_file.get(file).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn remove_file(&mut self, file: &Path) -> Option<Vec<CodeMapping>> {
        self.by_file.remove(file)
    }

    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.by_file.keys().map(PathBuf::as_path)
    }

    /// Total number of mappings across files.
    pub fn len(&self) -> usize {
        self.by_file.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

//! VisualisationHost: owner of all document and model state.
//!
//! The host is synchronous. Callers that edit from asynchronous contexts go
//! through [`Session`](super::Session), which serialises every mutation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use thiserror::Error;
use uuid::Uuid;

use crate::base::TextEdit;
use crate::config::Config;
use crate::mappings::{CodeMapping, CodeMappingRegistry, MappingError, load_mappings};
use crate::parser::ParseError;
use crate::syntax::{EditError, NodeId, Replacement, SourceFile};
use crate::visualisation::{
    ExtractionReport, ProviderRegistry, VisualisationModel, VisualisationModelProvider,
    extract_models_for_all_source_files,
};

#[derive(Debug, Error)]
pub enum HostError {
    #[error("unknown source file {}", .0.display())]
    UnknownFile(PathBuf),

    #[error("no visualisation model with uid {0}")]
    UnknownModel(Uuid),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error(transparent)]
    Mapping(#[from] MappingError),
}

/// Owns the source files, code mappings, providers and current models.
///
/// Files keep their registration order, which is also the order of the
/// models produced by [`extract_models_for_all_source_files`](Self::extract_models_for_all_source_files).
#[derive(Debug)]
pub struct VisualisationHost {
    config: Config,
    files: IndexMap<PathBuf, SourceFile>,
    mappings: CodeMappingRegistry,
    providers: ProviderRegistry,
    models: Vec<VisualisationModel>,
    report: ExtractionReport,
}

impl Default for VisualisationHost {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl VisualisationHost {
    /// A host with the built-in providers the config enables.
    pub fn new(config: Config) -> Self {
        let providers = ProviderRegistry::builtin(config.enabled_providers());
        Self::with_providers(config, providers)
    }

    pub fn with_providers(config: Config, providers: ProviderRegistry) -> Self {
        tracing::debug!(providers = ?providers.names(), "created visualisation host");
        Self {
            config,
            files: IndexMap::new(),
            mappings: CodeMappingRegistry::new(),
            providers,
            models: Vec::new(),
            report: ExtractionReport::default(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Register an extra provider. Returns `false` if its name is taken.
    pub fn register_provider(&mut self, provider: Arc<dyn VisualisationModelProvider>) -> bool {
        self.providers.register(provider)
    }

    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    // ---- files ----

    /// Set the content of a file, parsing it from scratch.
    ///
    /// A file that fails to parse is not added; an existing file keeps its
    /// previous content.
    pub fn set_file_content(&mut self, path: impl Into<PathBuf>, text: impl Into<String>) -> Result<(), HostError> {
        let path = path.into();
        match self.files.get_mut(&path) {
            Some(file) => file.set_text(text)?,
            None => {
                let file = SourceFile::parse(path.clone(), text)?;
                self.files.insert(path, file);
            }
        }
        Ok(())
    }

    /// Forget a file and its code mappings.
    pub fn remove_file(&mut self, path: &Path) -> bool {
        self.mappings.remove_file(path);
        self.files.shift_remove(path).is_some()
    }

    pub fn file(&self, path: &Path) -> Option<&SourceFile> {
        self.files.get(path)
    }

    pub fn files(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.values()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    fn file_mut(&mut self, path: &Path) -> Result<&mut SourceFile, HostError> {
        self.files
            .get_mut(path)
            .ok_or_else(|| HostError::UnknownFile(path.to_path_buf()))
    }

    /// Apply an editor change: node positions move, nothing is reparsed.
    pub fn apply_edit(&mut self, path: &Path, edit: &TextEdit) -> Result<(), HostError> {
        self.file_mut(path)?.apply_edit(edit)?;
        Ok(())
    }

    /// Rewrite the source of one node.
    pub fn replace_node_source(&mut self, path: &Path, node: NodeId, new_text: &str) -> Result<Replacement, HostError> {
        Ok(self.file_mut(path)?.replace_node_source(node, new_text)?)
    }

    // ---- code mappings ----

    pub fn set_code_mappings(&mut self, path: impl Into<PathBuf>, mappings: impl IntoIterator<Item = CodeMapping>) {
        self.mappings.set_file_mappings(path, mappings);
    }

    /// Load a JSON-lines mapping file. Returns the number of mappings read.
    pub fn load_code_mappings(&mut self, mapping_file: &Path) -> Result<usize, HostError> {
        let mappings = load_mappings(mapping_file)?;
        let count = mappings.len();
        self.mappings.set_mappings(mappings);
        Ok(count)
    }

    /// Load the configured mapping file of `dir`, if it has one.
    pub fn load_code_mappings_in(&mut self, dir: &Path) -> Result<usize, HostError> {
        let mapping_file = dir.join(&self.config.mappings.file_name);
        if !mapping_file.is_file() {
            tracing::debug!(dir = %dir.display(), "no code mapping file");
            return Ok(0);
        }
        self.load_code_mappings(&mapping_file)
    }

    pub fn code_mappings(&self) -> &CodeMappingRegistry {
        &self.mappings
    }

    // ---- models ----

    /// Rebuild every model from the current files and mappings.
    ///
    /// Previous models are replaced; a model whose `(source_file, mapping id)`
    /// was already present keeps its uid, so handles held by renderers stay
    /// valid across write-backs. Nodes detached by earlier replacements are
    /// freed first.
    pub fn extract_models_for_all_source_files(&mut self) -> &[VisualisationModel] {
        let freed: usize = self.files.values_mut().map(SourceFile::free_detached).sum();
        if freed > 0 {
            tracing::trace!(freed, "freed detached nodes");
        }
        let mut extraction = extract_models_for_all_source_files(self.files.values(), &self.mappings, &self.providers);

        // A model keeps its uid while its mapping identity survives
        let previous: FxHashMap<(PathBuf, u64), Uuid> = self
            .models
            .drain(..)
            .map(|model| ((model.source_file, model.mapping.id), model.uid))
            .collect();
        for model in &mut extraction.models {
            if let Some(uid) = previous.get(&(model.source_file.clone(), model.mapping.id)) {
                model.uid = *uid;
            }
        }

        self.models = extraction.models;
        self.report = extraction.report;
        &self.models
    }

    pub fn models(&self) -> &[VisualisationModel] {
        &self.models
    }

    pub fn model(&self, uid: Uuid) -> Option<&VisualisationModel> {
        self.models.iter().find(|model| model.uid == uid)
    }

    /// Report of the last extraction.
    pub fn report(&self) -> &ExtractionReport {
        &self.report
    }

    /// Write new source text for the node behind a model.
    ///
    /// Models are not rebuilt; call
    /// [`extract_models_for_all_source_files`](Self::extract_models_for_all_source_files)
    /// afterwards.
    pub fn apply_model_edit(&mut self, uid: Uuid, new_text: &str) -> Result<Replacement, HostError> {
        let (path, node) = self
            .model(uid)
            .map(|model| (model.source_file.clone(), model.node))
            .ok_or(HostError::UnknownModel(uid))?;
        self.replace_node_source(&path, node, new_text)
    }
}

//! Visualisation models: providers, candidate extraction and correlation.
//!
//! ```text
//! SourceFile ──► CandidateExtractor ──┐
//!                                     ├──► correlate ──► provider ──► VisualisationModel
//! CodeMappingRegistry ──► assign ─────┘
//! ```

mod candidates;
mod correlation;
mod model;
mod provider;
pub mod providers;

pub use candidates::{CandidateExtractor, Candidates};
pub use correlation::{
    Candidate, Correlation, CorrelationShortfall, Extraction, ExtractionReport, ProviderFailure, correlate,
    extract_models_for_all_source_files, extract_models_for_file,
};
pub use model::{
    GridCell, GridContent, GridRow, ImageContent, MathContent, ModelContent, ModelContext, TabularContent,
    VisualisationModel,
};
pub use provider::{ProviderError, ProviderRegistry, VisualisationModelProvider};

#[cfg(test)]
mod tests;

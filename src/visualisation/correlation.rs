//! Pairing code mappings with candidate nodes.
//!
//! Per provider and file, mappings are first paired with nodes that start
//! exactly on the mapping's line. Whatever is left is paired by rank: both
//! sides are sorted by position and zipped. Leftovers after that are
//! dropped with a warning and recorded in the [`ExtractionReport`].

use std::path::PathBuf;

use rayon::prelude::*;
use rustc_hash::FxHashSet;

use crate::base::{SourceFilePosition, compare};
use crate::mappings::{CodeMapping, CodeMappingRegistry};
use crate::syntax::{NodeId, SourceFile};

use super::candidates::CandidateExtractor;
use super::model::{ModelContext, VisualisationModel};
use super::provider::{ProviderError, ProviderRegistry};

/// A candidate node and where it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub node: NodeId,
    pub start: SourceFilePosition,
}

/// Result of correlating one provider's mappings and nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correlation<'m> {
    pub pairs: Vec<(&'m CodeMapping, NodeId)>,
    pub unmatched_mappings: Vec<&'m CodeMapping>,
    pub unmatched_nodes: Vec<NodeId>,
}

/// Pair `mappings` (in their given order) with `nodes` (in document order).
///
/// At most `min(|mappings|, |nodes|)` pairs are produced, and no mapping
/// or node appears twice.
pub fn correlate<'m>(mappings: Vec<&'m CodeMapping>, mut nodes: Vec<Candidate>) -> Correlation<'m> {
    let mut pairs = Vec::new();

    // Exact phase: first unused node starting on the mapping's line
    let mut remaining = Vec::with_capacity(mappings.len());
    for mapping in mappings {
        let found = mapping
            .node_line()
            .and_then(|line| nodes.iter().position(|candidate| candidate.start.line() == line));
        match found {
            Some(index) => {
                let candidate = nodes.remove(index);
                pairs.push((mapping, candidate.node));
            }
            None => remaining.push(mapping),
        }
    }

    // Approximate phase: pair by rank
    if !remaining.is_empty() && !nodes.is_empty() {
        remaining.sort_by_key(|mapping| mapping.line);
        nodes.sort_by(|a, b| compare(&a.start, &b.start));
        let count = remaining.len().min(nodes.len());
        let leftover_mappings = remaining.split_off(count);
        let leftover_nodes = nodes.split_off(count);
        pairs.extend(remaining.into_iter().zip(nodes.into_iter().map(|candidate| candidate.node)));
        remaining = leftover_mappings;
        nodes = leftover_nodes;
    }

    Correlation {
        pairs,
        unmatched_mappings: remaining,
        unmatched_nodes: nodes.into_iter().map(|candidate| candidate.node).collect(),
    }
}

/// Mappings or nodes of one (provider, file) pair left without a partner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationShortfall {
    pub source_file: PathBuf,
    pub provider: &'static str,
    pub unmatched_mappings: Vec<u64>,
    pub unmatched_nodes: Vec<NodeId>,
}

/// A provider could not build the model of a correlated pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderFailure {
    pub source_file: PathBuf,
    pub provider: &'static str,
    pub mapping_id: u64,
    pub node: NodeId,
    pub error: ProviderError,
}

/// What an extraction pass could not do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionReport {
    pub files: usize,
    pub models: usize,
    /// Mappings no registered provider accepts.
    pub unassigned_mappings: usize,
    pub shortfalls: Vec<CorrelationShortfall>,
    pub failures: Vec<ProviderFailure>,
}

impl ExtractionReport {
    pub fn unmatched_mappings(&self) -> usize {
        self.shortfalls.iter().map(|s| s.unmatched_mappings.len()).sum()
    }

    pub fn unmatched_nodes(&self) -> usize {
        self.shortfalls.iter().map(|s| s.unmatched_nodes.len()).sum()
    }

    /// Every mapping and candidate was paired and every model was built.
    pub fn is_complete(&self) -> bool {
        self.unassigned_mappings == 0 && self.shortfalls.is_empty() && self.failures.is_empty()
    }

    fn merge(&mut self, other: ExtractionReport) {
        self.files += other.files;
        self.models += other.models;
        self.unassigned_mappings += other.unassigned_mappings;
        self.shortfalls.extend(other.shortfalls);
        self.failures.extend(other.failures);
    }
}

/// Models and report of an extraction pass.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub models: Vec<VisualisationModel>,
    pub report: ExtractionReport,
}

/// Correlate one file's mappings with its candidates, provider by provider.
pub fn extract_models_for_file(
    file: &SourceFile,
    mappings: &[CodeMapping],
    providers: &ProviderRegistry,
) -> Extraction {
    let path = file.path();
    let mut report = ExtractionReport {
        files: 1,
        ..Default::default()
    };
    let mut models = Vec::new();

    let candidates = CandidateExtractor::extract(providers, file.root());

    // Each mapping belongs to the first provider accepting it
    let mut assigned: Vec<Vec<&CodeMapping>> = vec![Vec::new(); providers.len()];
    for mapping in mappings {
        match providers.assign(mapping) {
            Some(index) => assigned[index].push(mapping),
            None => {
                tracing::debug!(file = %path.display(), id = mapping.id, kind = %mapping.kind, "no provider for mapping");
                report.unassigned_mappings += 1;
            }
        }
    }

    let mut used: FxHashSet<NodeId> = FxHashSet::default();
    for (provider, provider_mappings) in providers.iter().zip(assigned) {
        let name = provider.name();
        let nodes: Vec<Candidate> = candidates
            .get(name)
            .into_iter()
            .flatten()
            .filter(|id| !used.contains(*id))
            .filter_map(|id| {
                file.ast().get(*id).map(|node| Candidate {
                    node: *id,
                    start: node.range().from(),
                })
            })
            .collect();
        if provider_mappings.is_empty() && nodes.is_empty() {
            continue;
        }

        let correlation = correlate(provider_mappings, nodes);
        for (mapping, id) in correlation.pairs {
            used.insert(id);
            let Some(node) = file.ast().node(id) else {
                continue;
            };
            let context = ModelContext::new(file, node, mapping);
            match provider.provide_model_with(&context) {
                Ok(model) => models.push(model),
                Err(error) => {
                    tracing::warn!(
                        file = %path.display(),
                        provider = name,
                        id = mapping.id,
                        node = %id,
                        %error,
                        "provider failed to build model"
                    );
                    report.failures.push(ProviderFailure {
                        source_file: path.to_path_buf(),
                        provider: name,
                        mapping_id: mapping.id,
                        node: id,
                        error,
                    });
                }
            }
        }

        if !correlation.unmatched_mappings.is_empty() || !correlation.unmatched_nodes.is_empty() {
            tracing::warn!(
                file = %path.display(),
                provider = name,
                mappings = correlation.unmatched_mappings.len(),
                nodes = correlation.unmatched_nodes.len(),
                "unmatched code mappings or nodes dropped"
            );
            report.shortfalls.push(CorrelationShortfall {
                source_file: path.to_path_buf(),
                provider: name,
                unmatched_mappings: correlation.unmatched_mappings.iter().map(|m| m.id).collect(),
                unmatched_nodes: correlation.unmatched_nodes,
            });
        }
    }

    report.models = models.len();
    Extraction { models, report }
}

/// Extract models for every file. Files are processed in parallel and the
/// results concatenated in the order `files` yields them.
pub fn extract_models_for_all_source_files<'f>(
    files: impl IntoIterator<Item = &'f SourceFile>,
    mappings: &CodeMappingRegistry,
    providers: &ProviderRegistry,
) -> Extraction {
    let files: Vec<&SourceFile> = files.into_iter().collect();
    let per_file: Vec<Extraction> = files
        .par_iter()
        .map(|file| extract_models_for_file(file, mappings.mappings_for(file.path()), providers))
        .collect();

    let mut extraction = Extraction::default();
    for file in per_file {
        extraction.models.extend(file.models);
        extraction.report.merge(file.report);
    }
    tracing::debug!(
        files = extraction.report.files,
        models = extraction.report.models,
        shortfalls = extraction.report.shortfalls.len(),
        failures = extraction.report.failures.len(),
        "extracted visualisation models"
    );
    extraction
}

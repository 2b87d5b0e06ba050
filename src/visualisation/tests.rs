use std::path::Path;
use std::sync::Arc;

use super::providers::{MathProvider, builtin_providers};
use super::*;
use crate::base::SourceFilePosition;
use crate::mappings::{CodeMapping, CodeMappingRegistry};
use crate::syntax::{NodeId, NodeRef, SourceFile};
use rstest::rstest;

const DOCUMENT: &str = r"\documentclass{article}
\begin{document}
\begin{figure}
  \includegraphics[width=0.5\textwidth, draft]{plots/result.png}
\end{figure}
\begin{tabular}{l|r}
  \hline
  Name & Value \\
  a & 1 \\
  b & 2
\end{tabular}
$$E = mc^2$$
\begin{gridlayout}
  \begin{row}{2cm}
    \begin{cell}{0.3} left \end{cell}
    \begin{cell}{0.7} right side \end{cell}
  \end{row}
\end{gridlayout}
\end{document}
";

fn mapping(kind: &str, id: u64, line: usize) -> CodeMapping {
    CodeMapping::new(kind, id, "doc.tex", line)
}

fn candidate(raw: u32, line: usize) -> Candidate {
    Candidate {
        node: NodeId::from_raw(raw),
        start: SourceFilePosition::new(line, 0),
    }
}

fn ids(pairs: &[(&CodeMapping, NodeId)]) -> Vec<(u64, NodeId)> {
    pairs.iter().map(|(m, n)| (m.id, *n)).collect()
}

fn document() -> SourceFile {
    SourceFile::parse("doc.tex", DOCUMENT).unwrap()
}

fn document_mappings() -> Vec<CodeMapping> {
    vec![
        mapping("includegraphics", 1, 4),
        mapping("tabular", 2, 6),
        mapping("math", 3, 12),
        mapping("gridlayout", 4, 13),
    ]
}

// =============================================================================
// CORRELATION
// =============================================================================

#[test]
fn test_all_mappings_pair_exactly() {
    let mappings = [mapping("math", 1, 5), mapping("math", 2, 9)];
    let result = correlate(mappings.iter().collect(), vec![candidate(10, 4), candidate(11, 8)]);
    assert_eq!(
        ids(&result.pairs),
        vec![(1, NodeId::from_raw(10)), (2, NodeId::from_raw(11))]
    );
    assert!(result.unmatched_mappings.is_empty());
    assert!(result.unmatched_nodes.is_empty());
}

#[test]
fn test_approximate_phase_pairs_lowest_rank_and_drops_rest() {
    let mappings = [mapping("math", 1, 5), mapping("math", 2, 20)];
    let result = correlate(mappings.iter().collect(), vec![candidate(7, 10)]);
    assert_eq!(ids(&result.pairs), vec![(1, NodeId::from_raw(7))]);
    assert_eq!(result.unmatched_mappings.len(), 1);
    assert_eq!(result.unmatched_mappings[0].id, 2);
}

#[test]
fn test_exact_match_takes_first_node_on_the_line() {
    let mappings = [mapping("math", 1, 3)];
    let nodes = vec![candidate(1, 2), candidate(2, 2)];
    let result = correlate(mappings.iter().collect(), nodes);
    assert_eq!(ids(&result.pairs), vec![(1, NodeId::from_raw(1))]);
    assert_eq!(result.unmatched_nodes, vec![NodeId::from_raw(2)]);
}

#[test]
fn test_approximate_phase_sorts_both_sides() {
    // Given out of order; ranks pair 3 with 30 and 7 with 31
    let mappings = [mapping("math", 9, 7), mapping("math", 8, 3)];
    let nodes = vec![candidate(31, 50), candidate(30, 40)];
    let result = correlate(mappings.iter().collect(), nodes);
    assert_eq!(
        ids(&result.pairs),
        vec![(8, NodeId::from_raw(30)), (9, NodeId::from_raw(31))]
    );
}

#[test]
fn test_exact_matches_are_removed_before_ranking() {
    let mappings = [mapping("math", 1, 1), mapping("math", 2, 11), mapping("math", 3, 30)];
    let nodes = vec![candidate(1, 5), candidate(2, 10), candidate(3, 20)];
    let result = correlate(mappings.iter().collect(), nodes);
    assert_eq!(
        ids(&result.pairs),
        vec![
            (2, NodeId::from_raw(2)),
            (1, NodeId::from_raw(1)),
            (3, NodeId::from_raw(3)),
        ]
    );
}

#[rstest]
#[case(&[1, 2, 3], &[0, 5, 9, 12])]
#[case(&[4, 4, 4], &[3])]
#[case(&[], &[1, 2])]
#[case(&[1, 2], &[])]
#[case(&[10, 1, 7, 7], &[6, 6, 0])]
fn test_pairs_never_exceed_smaller_side(#[case] lines: &[usize], #[case] starts: &[usize]) {
    let mappings: Vec<_> = lines
        .iter()
        .enumerate()
        .map(|(i, line)| mapping("math", i as u64, *line))
        .collect();
    let nodes: Vec<_> = starts
        .iter()
        .enumerate()
        .map(|(i, line)| candidate(i as u32, *line))
        .collect();

    let first = correlate(mappings.iter().collect(), nodes.clone());
    let second = correlate(mappings.iter().collect(), nodes);
    assert!(first.pairs.len() <= lines.len().min(starts.len()));
    assert_eq!(first.pairs.len() + first.unmatched_mappings.len(), lines.len());
    assert_eq!(first.pairs.len() + first.unmatched_nodes.len(), starts.len());
    // Deterministic
    assert_eq!(first, second);
}

// =============================================================================
// CANDIDATES
// =============================================================================

#[test]
fn test_candidates_per_provider_in_document_order() {
    let file = document();
    let providers = ProviderRegistry::builtin(None);
    let candidates = CandidateExtractor::extract(&providers, file.root());

    assert_eq!(
        candidates.keys().copied().collect::<Vec<_>>(),
        vec!["includegraphics", "tabular", "gridlayout", "math"]
    );
    let start_line = |id: &NodeId| file.ast().get(*id).unwrap().range().from().line();
    assert_eq!(candidates["includegraphics"].iter().map(start_line).collect::<Vec<_>>(), vec![3]);
    assert_eq!(candidates["tabular"].iter().map(start_line).collect::<Vec<_>>(), vec![5]);
    assert_eq!(candidates["gridlayout"].iter().map(start_line).collect::<Vec<_>>(), vec![12]);
    assert_eq!(candidates["math"].iter().map(start_line).collect::<Vec<_>>(), vec![11]);
}

#[test]
fn test_inline_math_is_not_a_candidate() {
    let file = SourceFile::parse("doc.tex", "inline $x$ and \\[y\\]").unwrap();
    let providers = ProviderRegistry::builtin(None);
    let candidates = CandidateExtractor::extract(&providers, file.root());
    assert_eq!(candidates["math"].len(), 1);
    assert!(candidates["tabular"].is_empty());
}

#[test]
fn test_builtin_registry_respects_enabled_list() {
    let enabled = vec!["math".to_string(), "tabular".to_string()];
    let providers = ProviderRegistry::builtin(Some(enabled.as_slice()));
    assert_eq!(providers.names(), vec!["tabular", "math"]);
}

#[test]
fn test_duplicate_provider_name_is_ignored() {
    let mut registry = ProviderRegistry::new();
    for provider in builtin_providers() {
        assert!(registry.register(provider));
    }
    assert!(!registry.register(Arc::new(MathProvider)));
    assert_eq!(registry.len(), 4);
}

// =============================================================================
// PROVIDERS
// =============================================================================

fn model_of(kind: &str) -> VisualisationModel {
    let file = document();
    let providers = ProviderRegistry::builtin(None);
    extract_models_for_file(&file, &document_mappings(), &providers)
        .models
        .into_iter()
        .find(|model| model.kind == kind)
        .unwrap()
}

#[test]
fn test_image_model() {
    let model = model_of("includegraphics");
    let ModelContent::Image(image) = model.content else {
        panic!("expected image content");
    };
    assert_eq!(image.path, "plots/result.png");
    assert_eq!(image.options.get("width"), Some(&Some("0.5\\textwidth".to_string())));
    assert_eq!(image.options.get("draft"), Some(&None));
    assert_eq!(model.range.from(), SourceFilePosition::new(3, 2));
}

#[test]
fn test_tabular_model() {
    let ModelContent::Tabular(table) = model_of("tabular").content else {
        panic!("expected tabular content");
    };
    assert_eq!(table.environment, "tabular");
    assert_eq!(table.column_spec, "l|r");
    assert_eq!(table.width, None);
    assert_eq!(
        table.rows,
        vec![vec!["Name", "Value"], vec!["a", "1"], vec!["b", "2"]]
    );
}

#[test]
fn test_tabular_star_width_and_trailing_break() {
    let file = SourceFile::parse(
        "t.tex",
        "\\begin{tabular*}{\\linewidth}{cc}\n x & {y z} \\\\\n\\end{tabular*}",
    )
    .unwrap();
    let providers = ProviderRegistry::builtin(None);
    let models = extract_models_for_file(&file, &[CodeMapping::new("tabular", 1, "t.tex", 1)], &providers).models;
    let ModelContent::Tabular(table) = &models[0].content else {
        panic!("expected tabular content");
    };
    assert_eq!(table.width.as_deref(), Some("\\linewidth"));
    assert_eq!(table.column_spec, "cc");
    assert_eq!(table.rows, vec![vec!["x", "{y z}"]]);
}

#[test]
fn test_grid_model() {
    let ModelContent::Grid(grid) = model_of("gridlayout").content else {
        panic!("expected grid content");
    };
    assert_eq!(grid.rows.len(), 1);
    let row = &grid.rows[0];
    assert_eq!(row.height.as_deref(), Some("2cm"));
    let cells: Vec<_> = row
        .cells
        .iter()
        .map(|c| (c.width.as_deref(), c.content.as_str()))
        .collect();
    assert_eq!(cells, vec![(Some("0.3"), "left"), (Some("0.7"), "right side")]);
}

#[test]
fn test_math_model() {
    let ModelContent::Math(math) = model_of("math").content else {
        panic!("expected math content");
    };
    assert_eq!(math.source, "E = mc^2");
    assert!(math.display);
}

// =============================================================================
// EXTRACTION
// =============================================================================

#[test]
fn test_extraction_pairs_every_mapping() {
    let file = document();
    let providers = ProviderRegistry::builtin(None);
    let extraction = extract_models_for_file(&file, &document_mappings(), &providers);
    assert_eq!(extraction.models.len(), 4);
    assert!(extraction.report.is_complete(), "{:?}", extraction.report);
    for model in &extraction.models {
        assert_eq!(model.source_file, Path::new("doc.tex"));
        assert_eq!(model.range.from().line() + 1, model.mapping.line);
    }
}

#[test]
fn test_shortfalls_and_unassigned_mappings_are_reported() {
    let file = document();
    let providers = ProviderRegistry::builtin(None);
    let mut mappings = document_mappings();
    mappings.push(mapping("math", 5, 40));
    mappings.push(mapping("chart", 6, 2));

    let extraction = extract_models_for_file(&file, &mappings, &providers);
    assert_eq!(extraction.models.len(), 4);
    assert_eq!(extraction.report.unassigned_mappings, 1);
    assert_eq!(extraction.report.shortfalls.len(), 1);
    let shortfall = &extraction.report.shortfalls[0];
    assert_eq!(shortfall.provider, "math");
    assert_eq!(shortfall.unmatched_mappings, vec![5]);
    assert_eq!(extraction.report.unmatched_mappings(), 1);
    assert_eq!(extraction.report.unmatched_nodes(), 0);
}

/// Accepts every math node and never builds a model.
struct FailingProvider;

impl VisualisationModelProvider for FailingProvider {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn can_provide_for_node(&self, node: NodeRef<'_>) -> bool {
        node.kind().as_math().is_some()
    }

    fn provide_model_with(&self, context: &ModelContext<'_>) -> Result<VisualisationModel, ProviderError> {
        Err(ProviderError::UnsupportedNode {
            provider: "failing",
            node: context.node.kind().to_string(),
        })
    }
}

#[test]
fn test_provider_failure_is_counted_and_node_stays_used() {
    let file = document();
    let mut registry = ProviderRegistry::new();
    registry.register(Arc::new(FailingProvider));
    registry.register(Arc::new(MathProvider));
    let mappings = vec![mapping("failing", 1, 12), mapping("math", 2, 12)];

    let extraction = extract_models_for_file(&file, &mappings, &registry);
    assert!(extraction.models.is_empty());
    assert_eq!(extraction.report.failures.len(), 1);
    assert_eq!(extraction.report.failures[0].provider, "failing");
    // The math node was consumed by the failing provider
    assert_eq!(extraction.report.shortfalls.len(), 1);
    assert_eq!(extraction.report.shortfalls[0].provider, "math");
    assert_eq!(extraction.report.shortfalls[0].unmatched_mappings, vec![2]);
}

#[test]
fn test_extraction_is_idempotent() {
    let file = document();
    let providers = ProviderRegistry::builtin(None);
    let mut registry = CodeMappingRegistry::new();
    registry.set_file_mappings("doc.tex", document_mappings());

    let first = extract_models_for_all_source_files([&file], &registry, &providers);
    let second = extract_models_for_all_source_files([&file], &registry, &providers);
    let pairings = |e: &Extraction| {
        e.models
            .iter()
            .map(|m| (m.node, m.mapping.clone(), m.content.clone()))
            .collect::<Vec<_>>()
    };
    assert_eq!(pairings(&first), pairings(&second));
    assert_eq!(first.report, second.report);
    // Fresh model identities every pass
    assert_ne!(first.models[0].uid, second.models[0].uid);
}

#[test]
fn test_all_files_keep_registration_order() {
    let files: Vec<SourceFile> = (0..8)
        .map(|i| SourceFile::parse(format!("f{i}.tex"), "$$x$$\n").unwrap())
        .collect();
    let mut registry = CodeMappingRegistry::new();
    for file in &files {
        registry.set_file_mappings(file.path(), vec![CodeMapping::new("math", 1, file.path(), 1)]);
    }
    let providers = ProviderRegistry::builtin(None);

    let extraction = extract_models_for_all_source_files(&files, &registry, &providers);
    let order: Vec<_> = extraction.models.iter().map(|m| m.source_file.clone()).collect();
    let expected: Vec<_> = files.iter().map(|f| f.path().to_path_buf()).collect();
    assert_eq!(order, expected);
    assert_eq!(extraction.report.files, 8);
}

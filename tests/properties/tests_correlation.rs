//! Correlation properties over pseudo-random inputs.

use std::collections::HashSet;

use ilatex::CodeMapping;
use ilatex::visualisation::{Candidate, ProviderRegistry, correlate};
use ilatex::{CodeMappingRegistry, SourceFile};

use crate::helpers::source_fixtures::*;

/// Small deterministic generator, enough to vary inputs between cases.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: usize) -> usize {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((self.0 >> 33) as usize) % bound
    }
}

/// Distinct candidates built from real nodes so their ids are valid.
fn candidates(file: &SourceFile, rng: &mut Lcg, count: usize) -> Vec<Candidate> {
    let ast = file.ast();
    let ids = ast.descendants(ast.root_id());
    let mut seen = HashSet::new();
    (0..count)
        .map(|_| ids[rng.next(ids.len())])
        .filter(|id| seen.insert(*id))
        .map(|id| Candidate {
            node: id,
            start: ast.get(id).unwrap().range().from(),
        })
        .collect()
}

#[test]
fn test_correlation_bounds_and_determinism() {
    let file = SourceFile::parse(RESULTS_FILE, RESULTS).unwrap();
    let mut rng = Lcg(7);

    for _ in 0..200 {
        let mappings: Vec<CodeMapping> = (0..rng.next(8))
            .map(|i| CodeMapping::new("math", i as u64, RESULTS_FILE, rng.next(15)))
            .collect();
        let count = rng.next(8);
        let nodes = candidates(&file, &mut rng, count);

        let first = correlate(mappings.iter().collect(), nodes.clone());
        let second = correlate(mappings.iter().collect(), nodes.clone());

        assert!(first.pairs.len() <= mappings.len().min(nodes.len()));
        assert_eq!(first.pairs.len() + first.unmatched_mappings.len(), mappings.len());
        assert_eq!(first.pairs.len() + first.unmatched_nodes.len(), nodes.len());

        let paired_nodes: HashSet<_> = first.pairs.iter().map(|(_, node)| *node).collect();
        assert_eq!(paired_nodes.len(), first.pairs.len());

        let ids = |c: &ilatex::visualisation::Correlation<'_>| {
            c.pairs.iter().map(|(m, n)| (m.id, *n)).collect::<Vec<_>>()
        };
        assert_eq!(ids(&first), ids(&second));
    }
}

#[test]
fn test_mapping_on_a_candidate_line_pairs_with_it() {
    let file = SourceFile::parse(RESULTS_FILE, RESULTS).unwrap();
    let mut rng = Lcg(42);

    for _ in 0..100 {
        let nodes = candidates(&file, &mut rng, 6);
        let target = &nodes[rng.next(nodes.len())];
        let mapping = CodeMapping::new("math", 1, RESULTS_FILE, target.start.line() + 1);

        let result = correlate(vec![&mapping], nodes.clone());
        let paired = result.pairs[0].1;
        let paired_start = nodes.iter().find(|c| c.node == paired).unwrap().start;
        assert_eq!(paired_start.line(), target.start.line());
    }
}

#[test]
fn test_extraction_is_idempotent() {
    let files = [
        SourceFile::parse(MAIN_FILE, MAIN).unwrap(),
        SourceFile::parse(RESULTS_FILE, RESULTS).unwrap(),
    ];
    let mut mappings = CodeMappingRegistry::new();
    mappings.set_mappings(thesis_mappings());
    let providers = ProviderRegistry::builtin(None);

    let first = ilatex::visualisation::extract_models_for_all_source_files(&files, &mappings, &providers);
    let second = ilatex::visualisation::extract_models_for_all_source_files(&files, &mappings, &providers);

    let pairings = |models: &[ilatex::VisualisationModel]| {
        models
            .iter()
            .map(|model| (model.source_file.clone(), model.node, model.mapping.id, model.content.clone()))
            .collect::<Vec<_>>()
    };
    assert_eq!(pairings(&first.models), pairings(&second.models));
    assert_eq!(first.report, second.report);
    assert!(first.models.iter().zip(&second.models).all(|(a, b)| a.uid != b.uid));
}

use std::io::Write;
use std::path::Path;

use super::*;
use rstest::rstest;

const BATCH: &str = r#"{"kind":"tabular","id":1,"source_file":"main.tex","line":5}

{"kind":"math","id":2,"source_file":"main.tex","line":9}
{"kind":"includegraphics","id":1,"source_file":"intro.tex","line":3}
"#;

#[test]
fn test_parse_mappings_skips_blank_lines() {
    let mappings = parse_mappings(BATCH).unwrap();
    assert_eq!(mappings.len(), 3);
    assert_eq!(mappings[0], CodeMapping::new("tabular", 1, "main.tex", 5));
    assert_eq!(mappings[2].node_line(), Some(2));
}

#[rstest]
#[case("{\"kind\":\"math\",\"id\":1,\"source_file\":\"a.tex\",\"line\":1}\nnot json", 2)]
#[case("\n\n{\"kind\":\"math\",\"id\":1}", 3)]
#[case("{\"kind\":\"math\",\"id\":\"one\",\"source_file\":\"a.tex\",\"line\":1}", 1)]
fn test_malformed_line_reports_its_number(#[case] text: &str, #[case] expected: usize) {
    match parse_mappings(text) {
        Err(MappingError::Malformed { line, .. }) => assert_eq!(line, expected),
        other => panic!("expected a malformed line error, got {other:?}"),
    }
}

#[test]
fn test_zero_source_line_is_rejected() {
    let text = r#"{"kind":"math","id":1,"source_file":"a.tex","line":0}"#;
    assert!(matches!(parse_mappings(text), Err(MappingError::ZeroLine { line: 1 })));
}

#[test]
fn test_load_mappings_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(BATCH.as_bytes()).unwrap();
    let mappings = load_mappings(file.path()).unwrap();
    assert_eq!(mappings.len(), 3);
}

#[test]
fn test_load_mappings_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.jsonl");
    assert!(matches!(load_mappings(&missing), Err(MappingError::Io { .. })));
}

// =============================================================================
// REGISTRY
// =============================================================================

#[test]
fn test_registry_groups_by_file() {
    let mut registry = CodeMappingRegistry::new();
    registry.set_mappings(parse_mappings(BATCH).unwrap());
    assert_eq!(registry.len(), 3);
    assert_eq!(registry.mappings_for(Path::new("main.tex")).len(), 2);
    assert_eq!(registry.mappings_for(Path::new("intro.tex")).len(), 1);
    assert!(registry.mappings_for(Path::new("other.tex")).is_empty());
}

#[test]
fn test_new_batch_replaces_previous_batch_of_that_file_only() {
    let mut registry = CodeMappingRegistry::new();
    registry.set_mappings(parse_mappings(BATCH).unwrap());
    registry.set_file_mappings("main.tex", vec![CodeMapping::new("math", 7, "main.tex", 1)]);

    let main = registry.mappings_for(Path::new("main.tex"));
    assert_eq!(main.len(), 1);
    assert_eq!(main[0].id, 7);
    assert_eq!(registry.mappings_for(Path::new("intro.tex")).len(), 1);
}

#[test]
fn test_duplicate_identity_keeps_later_mapping() {
    let mut registry = CodeMappingRegistry::new();
    registry.set_file_mappings(
        "main.tex",
        vec![
            CodeMapping::new("math", 1, "main.tex", 3),
            CodeMapping::new("math", 2, "main.tex", 4),
            CodeMapping::new("tabular", 1, "main.tex", 10),
        ],
    );
    let main = registry.mappings_for(Path::new("main.tex"));
    assert_eq!(main.len(), 2);
    assert_eq!(main[0], CodeMapping::new("tabular", 1, "main.tex", 10));
    assert_eq!(main[1].id, 2);
}

#[test]
fn test_mappings_for_other_files_are_skipped() {
    let mut registry = CodeMappingRegistry::new();
    registry.set_file_mappings("main.tex", vec![CodeMapping::new("math", 1, "other.tex", 3)]);
    assert!(registry.is_empty());
    assert!(registry.remove_file(Path::new("main.tex")).is_some());
}

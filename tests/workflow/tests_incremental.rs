//! Incremental node replacement against full reparses.

use ilatex::SourceFile;
use ilatex::syntax::{NodeId, Replacement};
use rstest::rstest;

use crate::helpers::model_assertions::tree_shape;
use crate::helpers::source_fixtures::*;

/// First attached node whose display starts with `prefix`.
fn find(file: &SourceFile, prefix: &str) -> NodeId {
    let ast = file.ast();
    ast.descendants(ast.root_id())
        .into_iter()
        .find(|id| ast.get(*id).is_some_and(|node| node.kind().to_string().starts_with(prefix)))
        .unwrap_or_else(|| panic!("no node starting with {prefix:?}"))
}

#[rstest]
#[case::table(
    "environment tabular",
    "\\begin{tabular}{ll}\n  a & b \\\\\n  c & d\n\\end{tabular}"
)]
#[case::table_grows(
    "environment tabular",
    "\\begin{tabular}{l}\n  one \\\\\n  two \\\\\n  three \\\\\n  four\n\\end{tabular}"
)]
#[case::grid(
    "environment gridlayout",
    "\\begin{gridlayout}\n  \\begin{row}{1cm}\n    \\begin{cell}{1.0} all \\end{cell}\n  \\end{row}\n\\end{gridlayout}"
)]
#[case::display_math("math (Bracket)", "\\[ \\epsilon \\le 0.1 \\]")]
#[case::chapter("command \\chapter", "\\chapter{Findings and discussion}")]
fn test_incremental_replacement_matches_reparse(#[case] target: &str, #[case] new_text: &str) {
    let mut file = SourceFile::parse(RESULTS_FILE, RESULTS).unwrap();
    let id = find(&file, target);

    let replacement = file.replace_node_source(id, new_text).unwrap();
    let Replacement::Incremental(new) = replacement else {
        panic!("expected an incremental replacement, got {replacement:?}");
    };
    assert_eq!(file.node_text(new), Some(new_text));

    let reparsed = SourceFile::parse(RESULTS_FILE, file.text()).unwrap();
    assert_eq!(tree_shape(&file), tree_shape(&reparsed));
}

#[test]
fn test_chain_of_replacements_stays_equivalent() {
    let mut file = SourceFile::parse(MAIN_FILE, MAIN).unwrap();
    let edits = [
        ("math (DoubleDollar)", "$$g(x) = 0$$"),
        ("environment figure", "\\begin{figure}\n  \\centering\n  \\includegraphics{b.pdf}\n\\end{figure}"),
        ("math (DoubleDollar)", "$$g(x) = x$$"),
        ("command \\chapter", "\\chapter{Overview}"),
    ];
    for (target, new_text) in edits {
        let id = find(&file, target);
        file.replace_node_source(id, new_text).unwrap();
        let reparsed = SourceFile::parse(MAIN_FILE, file.text()).unwrap();
        assert_eq!(tree_shape(&file), tree_shape(&reparsed), "after replacing {target}");
    }
    assert!(file.free_detached() > 0);
}

#[rstest]
#[case::two_nodes("command \\chapter", "\\chapter{A} \\label{a}")]
#[case::kind_change("math (Bracket)", "\\begin{tabular}{l} x \\end{tabular}")]
#[case::plain_text("command \\chapter", "Results")]
fn test_fallback_reparse_is_equivalent(#[case] target: &str, #[case] new_text: &str) {
    let mut file = SourceFile::parse(RESULTS_FILE, RESULTS).unwrap();
    let id = find(&file, target);

    assert_eq!(file.replace_node_source(id, new_text).unwrap(), Replacement::Reparsed);
    let reparsed = SourceFile::parse(RESULTS_FILE, file.text()).unwrap();
    assert_eq!(tree_shape(&file), tree_shape(&reparsed));
}

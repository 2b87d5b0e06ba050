//! End-to-end: load a project, extract models, write back through a session.

use std::path::Path;

use ilatex::base::{SourceFilePosition, TextEdit};
use ilatex::config::Config;
use ilatex::tasks::TaskError;
use ilatex::{Session, VisualisationHost};

use crate::helpers::model_assertions::*;
use crate::helpers::source_fixtures::*;

fn thesis_host(config: Config) -> VisualisationHost {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(".ilatex-mappings"),
        to_json_lines(&thesis_mappings()),
    )
    .unwrap();

    let mut host = VisualisationHost::new(config);
    host.set_file_content(MAIN_FILE, MAIN).unwrap();
    host.set_file_content(RESULTS_FILE, RESULTS).unwrap();
    assert_eq!(host.load_code_mappings_in(dir.path()).unwrap(), 7);
    host.extract_models_for_all_source_files();
    host
}

#[test]
fn test_project_extraction() {
    let host = thesis_host(Config::default());
    let models = host.models();

    assert_eq!(
        kinds(models),
        vec![
            "includegraphics",
            "math",
            "includegraphics",
            "includegraphics",
            "tabular",
            "gridlayout",
            "math",
        ]
    );
    assert!(host.report().is_complete(), "{:?}", host.report());
    assert_models_on_mapping_lines(models);
    assert_eq!(host.report().files, 2);
}

#[test]
fn test_rebuilt_mappings_after_edit_pair_exactly_again() {
    let mut host = thesis_host(Config::default());
    let edit = TextEdit::insert(SourceFilePosition::new(1, 0), "\\section{Setup}\n\n");
    host.apply_edit(Path::new(RESULTS_FILE), &edit).unwrap();

    // A rebuild reports the new lines
    let rebuilt = thesis_mappings()
        .into_iter()
        .filter(|mapping| mapping.source_file == Path::new(RESULTS_FILE))
        .map(|mut mapping| {
            if mapping.line >= 2 {
                mapping.line += 2;
            }
            mapping
        });
    host.set_code_mappings(RESULTS_FILE, rebuilt);

    let models = host.extract_models_for_all_source_files().to_vec();
    assert_eq!(models.len(), 7);
    assert_models_on_mapping_lines(&models);
}

#[tokio::test]
async fn test_table_edit_round_trip() {
    let session = Session::current(thesis_host(Config::default())).unwrap();
    let table = of_kind(&session.models(), "tabular")[0].clone();
    let others: Vec<_> = session
        .models()
        .iter()
        .filter(|model| model.kind != "tabular")
        .map(|model| (model.kind, model.mapping.id, model.range))
        .collect();

    session.submit_model_edit(
        table.uid,
        "\\begin{tabular}{lrr}\n  Run & Time & Error \\\\\n  1 & 0.45 & 0.01 \\\\\n  2 & 0.4 & 0.02\n\\end{tabular}",
    );
    session.wait_idle().await;

    let models = session.models();
    let table = of_kind(&models, "tabular")[0];
    assert_eq!(tabular_rows(table)[1], vec!["1", "0.45", "0.01"]);

    // One more character on an inner line leaves every other model in place
    let after: Vec<_> = models
        .iter()
        .filter(|model| model.kind != "tabular")
        .map(|model| (model.kind, model.mapping.id, model.range))
        .collect();
    assert_eq!(after, others);
    assert!(session.take_failures().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_submitters_serialise() {
    let session = Session::current(thesis_host(Config::default())).unwrap();

    let mut submitters = Vec::new();
    for i in 0..8 {
        let session = session.clone();
        submitters.push(tokio::spawn(async move {
            session.submit_edit(
                MAIN_FILE,
                TextEdit::insert(SourceFilePosition::new(0, 0), format!("% note {i}\n")),
            );
        }));
    }
    for submitter in submitters {
        submitter.await.unwrap();
    }
    session.wait_idle().await;

    let text = session.read(|host| host.file(Path::new(MAIN_FILE)).unwrap().text().to_string());
    assert_eq!(text.lines().filter(|line| line.starts_with("% note")).count(), 8);
    assert!(text.ends_with(MAIN));

    let math = of_kind(&session.models(), "math")
        .into_iter()
        .find(|model| model.source_file == Path::new(MAIN_FILE))
        .map(math_source);
    assert_eq!(math.as_deref(), Some(r"f(x) = \sum_{i=0}^{n} a_i x^i"));
}

#[tokio::test]
async fn test_failed_write_back_keeps_session_usable() {
    let config = Config::from_json(r#"{ "tasks": { "failure_policy": "record" } }"#).unwrap();
    let session = Session::current(thesis_host(config)).unwrap();
    let math = of_kind(&session.models(), "math")[0].uid;

    // Unbalanced source parses neither alone nor in place
    session.submit_model_edit(math, "$$x");
    session.submit_file_update(RESULTS_FILE, "\\chapter{Results}\n$$y$$\n");
    session.wait_idle().await;

    let failures = session.take_failures();
    assert_eq!(failures.len(), 1);
    assert!(matches!(failures[0].error, TaskError::Failed(_)));

    let report = session.report();
    assert_eq!(report.files, 2);
    let results_math: Vec<_> = of_kind(&session.models(), "math")
        .into_iter()
        .filter(|model| model.source_file == Path::new(RESULTS_FILE))
        .map(math_source)
        .collect();
    assert_eq!(results_math, vec!["y"]);
}

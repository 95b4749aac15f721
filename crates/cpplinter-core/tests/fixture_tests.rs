//! Integration tests running the engine over tests/fixtures/cpp/

use std::fs;
use std::path::{Path, PathBuf};

use cpplinter_core::config::Config;
use cpplinter_core::{Diagnostic, LintEngine};
use insta::assert_json_snapshot;

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../tests/fixtures/cpp");

fn fixture(relative_path: &str) -> PathBuf {
    Path::new(FIXTURES_DIR).join(relative_path)
}

/// Serializes `diagnostics` with `file` reduced to the file name so
/// snapshots do not depend on the checkout location.
fn portable(diagnostics: &[Diagnostic]) -> serde_json::Value {
    let mut value = serde_json::to_value(diagnostics).unwrap();
    for entry in value.as_array_mut().unwrap() {
        if let Some(file) = entry.get("file").and_then(|f| f.as_str()) {
            let name = Path::new(file)
                .file_name()
                .unwrap()
                .to_string_lossy()
                .to_string();
            entry["file"] = serde_json::Value::String(name);
        }
    }
    value
}

fn summary(diagnostics: &[Diagnostic]) -> Vec<(String, String)> {
    diagnostics
        .iter()
        .map(|d| (d.rule_id.clone(), d.message.clone()))
        .collect()
}

#[test]
fn sample_program_reports_float_literal() {
    let mut engine = LintEngine::new();

    let diagnostics = engine.check_file(&fixture("sample/test01.cpp")).unwrap();

    assert_json_snapshot!(portable(&diagnostics), @r###"
    [
      {
        "ast_kind": "FLOATING_LITERAL",
        "column": 31,
        "err_code": "100.0",
        "file": "test01.cpp",
        "id": 0,
        "line": 14,
        "rule_id": "CPP-000003",
        "rule_name": "magic_number_usage",
        "rule_text": "magic number 100.0 should not be used",
        "severity": "warning"
      }
    ]
    "###);
}

#[test]
fn header_with_classes() {
    let mut engine = LintEngine::new();

    let diagnostics = engine.check_file(&fixture("sample/geometry.hpp")).unwrap();

    assert_eq!(diagnostics.len(), 2);
    let method = &diagnostics[0];
    assert_eq!(method.ast_kind, "CXX_METHOD");
    assert_eq!(
        method.message,
        "there are too many parameters in func: 5 params found"
    );
    assert_eq!((method.line, method.column), (Some(13), Some(5)));
    assert_eq!(
        method.snippet.as_deref(),
        Some("void fill(int x, int y, int w, i...")
    );

    let literal = &diagnostics[1];
    assert_eq!(literal.message, "magic number 12 should not be used");
    assert_eq!((literal.line, literal.column), (Some(14), Some(33)));
}

#[test]
fn sample_tree_keeps_file_order_and_numbering() {
    let mut engine = LintEngine::new();

    let report = engine.check_tree(&fixture("sample"));

    assert!(report.failures.is_empty());
    assert_eq!(report.files_checked, 2);
    assert_eq!(report.pass_rate(), 100.0);
    let files: Vec<String> = portable(&report.diagnostics)
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["file"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(files, vec!["geometry.hpp", "geometry.hpp", "test01.cpp"]);
    let ids: Vec<usize> = report.diagnostics.iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![0, 1, 2]);
}

#[test]
fn batch_skips_unparsable_file() {
    let mut engine = LintEngine::new();

    let report = engine.check_tree(&fixture("batch"));

    assert_eq!(report.files_checked, 4);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].path.ends_with("broken.cpp"));
    assert!(report.failures[0].parse_failure);
    assert_eq!(report.pass_rate(), 75.0);

    assert_eq!(
        summary(&report.diagnostics),
        vec![
            (
                "CPP-000001".to_string(),
                "there are too many parameters in func: 5 params found".to_string()
            ),
            (
                "CPP-000001".to_string(),
                "there are too many parameters in func: 5 params found".to_string()
            ),
            (
                "CPP-000003".to_string(),
                "magic number 503 should not be used".to_string()
            ),
            (
                "CPP-000003".to_string(),
                "magic number 42 should not be used".to_string()
            ),
        ]
    );
}

#[test]
fn three_files_one_broken() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.cpp"), "void a() { call(37); }\n").unwrap();
    fs::write(dir.path().join("b.cpp"), "}}\n))\n").unwrap();
    fs::write(dir.path().join("c.c"), "int c(void) { return 99; }\n").unwrap();

    let mut engine = LintEngine::new();
    let report = engine.check_tree(dir.path());

    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].path.ends_with("b.cpp"));
    assert_eq!(
        summary(&report.diagnostics),
        vec![
            (
                "CPP-000003".to_string(),
                "magic number 37 should not be used".to_string()
            ),
            (
                "CPP-000003".to_string(),
                "magic number 99 should not be used".to_string()
            ),
        ]
    );
}

#[test]
fn single_file_parse_failure_is_an_error() {
    let mut engine = LintEngine::new();

    let err = engine
        .check_file(&fixture("batch/src/broken.cpp"))
        .unwrap_err();

    assert!(err.is_parse_failure());
}

#[test]
fn config_file_changes_thresholds() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("cpplinter.toml"),
        r#"
[rules]
disabled = ["too_many_params_in_func"]

[rules.severity]
magic_number_usage = "error"

[rules.magic_numbers]
ignore = [503]
"#,
    )
    .unwrap();
    let source = dir.path().join("retry.cpp");
    fs::copy(fixture("batch/src/retry.cpp"), &source).unwrap();
    fs::write(
        dir.path().join("wide.cpp"),
        "void wide(int a, int b, int c, int d, int e) {}\n",
    )
    .unwrap();

    let config = cpplinter_core::config::load_config_or_default(dir.path());
    let mut engine = LintEngine::with_config(&config);
    let report = engine.check_tree(dir.path());

    assert_eq!(
        summary(&report.diagnostics),
        vec![(
            "CPP-000003".to_string(),
            "magic number 42 should not be used".to_string()
        )]
    );
    assert_eq!(
        report.diagnostics[0].severity,
        cpplinter_core::Severity::Error
    );
    assert_ne!(config, Config::default());
}

#[test]
fn dump_of_sample_program() {
    let mut engine = LintEngine::new();

    let dump = engine.dump_ast(&fixture("sample/test01.cpp")).unwrap();

    let kinds: Vec<&str> = dump.children.iter().map(|c| c.kind.as_str()).collect();
    assert_eq!(
        kinds,
        vec![
            "INCLUSION_DIRECTIVE",
            "VAR_DECL",
            "FUNCTION_DECL",
            "FUNCTION_DECL",
            "FUNCTION_DECL"
        ]
    );
    let add = &dump.children[3];
    assert_eq!(add.type_tag.as_deref(), Some("int"));
    assert_eq!(add.range.as_ref().map(|r| r.line), Some(11));
}

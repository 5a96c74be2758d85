//! Choice scripts against the built-in Python grammar, through the library and the binary

use blanks::formats::FormatRegistry;
use blanks::grammar::python::python_subset;
use blanks::{ScriptError, Session};
use std::process::Command;
use std::sync::Arc;

const DEMO: &str = "demos/hello.blanks";

fn python_session() -> Session {
    Session::new(Arc::new(python_subset().unwrap())).unwrap()
}

fn demo_session() -> Session {
    let script = std::fs::read_to_string(DEMO).unwrap();
    let mut session = python_session();
    session.run_script(&script).unwrap();
    session
}

#[test]
fn test_demo_renders_program() {
    let session = demo_session();
    insta::assert_snapshot!(session.render().trim_end(), @r###"
    greeting = "hello"
    if greeting == "hello" :
        print(greeting)
    for i in range(3):
        print(i)
    "###);
}

#[test]
fn test_demo_hints_include_assignment() {
    let mut session = demo_session();
    let hints: Vec<String> = session.hints().unwrap().into_iter().map(|h| h.text).collect();
    assert_eq!(hints[0], "greeting");
    assert_eq!(hints[1], "print");
}

#[test]
fn test_demo_offers_continuations() {
    let mut session = demo_session();
    let alternatives = session.display_alternatives().unwrap();
    let texts: Vec<String> = alternatives
        .iter()
        .map(|leaf| session.tree().display_text(*leaf))
        .collect();
    // values sort first, layout last
    assert_eq!(texts[0], "NAME");
    for keyword in ["if", "for", "while", "def", "pass", "return"] {
        assert!(texts.iter().any(|t| t == keyword), "{keyword} missing from {texts:?}");
    }
}

#[test]
fn test_statement_needs_newline_before_next() {
    let mut session = python_session();
    let err = session.run_script("NAME:x '=' NUMBER:1 'if'").unwrap_err();
    match err {
        ScriptError::Step { index, source, .. } => {
            assert_eq!(index, 3);
            assert!(source.is_recoverable());
        }
        other => panic!("expected step error, got {other:?}"),
    }
}

#[test]
fn test_graph_formats() {
    let session = demo_session();
    let registry = FormatRegistry::with_scope(true);
    let dot = registry.serialize(session.tree(), "dot").unwrap();
    assert!(dot.starts_with("digraph G {"));
    assert!(dot.contains("label=\"file_input\""));
    let json: serde_json::Value =
        serde_json::from_str(&registry.serialize(session.tree(), "json").unwrap()).unwrap();
    assert_eq!(json["label"], "file_input");
}

#[test]
fn test_binary_runs_demo() {
    let output = Command::new(env!("CARGO_BIN_EXE_blanks"))
        .args(["run", DEMO])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("greeting = \"hello\"\nif greeting == \"hello\" :\n"));
}

#[test]
fn test_binary_reports_bad_script() {
    let dir = std::env::temp_dir().join(format!("blanks-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("bad.blanks");
    std::fs::write(&path, "NAME:x '=' NUMBER:4a").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_blanks"))
        .arg("run")
        .arg(&path)
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("'4a' is not a valid NUMBER"), "{stderr}");
}

//! Ledger well-formedness and classification against a real repository.

use mandate::core::layout;
use mandate::core::ledger::{self, TraceRecord};
use mandate::core::session::Session;
use mandate::tools::broker::ToolBroker;
use mandate::tools::{ToolCall, TOOL_SELECT_INTENT, TOOL_WRITE_FILE};
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn write_manifest(root: &Path, content: &str) {
    let path = layout::manifest_path(root);
    std::fs::create_dir_all(path.parent().unwrap()).expect("mkdir");
    std::fs::write(path, content).expect("write manifest");
}

fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args(args)
        .current_dir(dir)
        .status()
        .expect("git");
    assert!(status.success(), "git {:?} failed", args);
}

fn init_repo(dir: &Path) {
    git(dir, &["init", "-q"]);
    git(dir, &["config", "user.email", "test@test.com"]);
    git(dir, &["config", "user.name", "Test"]);
}

fn commit_all(dir: &Path, message: &str) {
    git(dir, &["add", "."]);
    git(dir, &["commit", "-q", "-m", message]);
}

fn mediated_write(root: &Path, path: &str, content: &str) {
    let broker = ToolBroker::standard(None);
    let mut session = Session::new(root);
    let selected = broker
        .dispatch(
            &mut session,
            &ToolCall::new(TOOL_SELECT_INTENT, serde_json::json!({"intent_id": "INT-1"})),
        )
        .expect("select");
    assert!(selected.is_success());
    let outcome = broker
        .dispatch(
            &mut session,
            &ToolCall::new(
                TOOL_WRITE_FILE,
                serde_json::json!({"path": path, "content": content, "intent_id": "INT-1"}),
            ),
        )
        .expect("write");
    assert!(outcome.is_success(), "write denied: {:?}", outcome.denial());
}

#[test]
fn every_ledger_line_is_a_complete_record() {
    let tmp = TempDir::new().expect("tempdir");
    write_manifest(tmp.path(), "- id: INT-1\n");
    mediated_write(tmp.path(), "src/a.ts", "one\n");
    mediated_write(tmp.path(), "src/b.ts", "two\n");
    mediated_write(tmp.path(), "src/a.ts", "one more\n");

    let raw = std::fs::read_to_string(layout::trace_path(tmp.path())).expect("read ledger");
    assert!(raw.ends_with('\n'));
    let lines: Vec<&str> = raw.lines().collect();
    assert_eq!(lines.len(), 3);
    for line in lines {
        let record: TraceRecord = serde_json::from_str(line).expect("well-formed line");
        assert!(!record.req_id.is_empty());
        assert!(!record.intent_id.is_empty());
        assert!(!record.file.is_empty());
        assert!(!record.timestamp.is_empty());
        assert_eq!(record.content_hash.len(), 64);
        assert_eq!(record.content_hash, record.ranges.content_hash);
    }
}

#[test]
fn appends_never_rewrite_existing_lines() {
    let tmp = TempDir::new().expect("tempdir");
    write_manifest(tmp.path(), "- id: INT-1\n");
    mediated_write(tmp.path(), "src/a.ts", "one\n");
    let before = std::fs::read_to_string(layout::trace_path(tmp.path())).expect("read");

    mediated_write(tmp.path(), "src/b.ts", "two\n");
    let after = std::fs::read_to_string(layout::trace_path(tmp.path())).expect("read");
    assert!(after.starts_with(&before));
}

#[test]
fn committed_repo_write_carries_vcs_stamp() {
    let tmp = TempDir::new().expect("tempdir");
    init_repo(tmp.path());
    std::fs::write(tmp.path().join("README.md"), "# t\n").expect("seed");
    commit_all(tmp.path(), "init");
    write_manifest(tmp.path(), "- id: INT-1\n");

    mediated_write(tmp.path(), "src/a.ts", "hello\n");

    let records = ledger::read_all(tmp.path()).expect("read");
    let stamp = records[0].vcs.as_ref().expect("vcs stamp");
    assert_eq!(stamp.revision.len(), 40);
    assert!(stamp.branch.as_deref().map(|b| !b.is_empty()).unwrap_or(false));
}

#[test]
fn whitespace_touchup_of_committed_file_is_refactor() {
    let tmp = TempDir::new().expect("tempdir");
    init_repo(tmp.path());
    let original = "function foo() {\n  const a = 1;\n  const b = 2;\n  const c = 3;\n  const d = 4;\n  const e = 5;\n  const f = 6;\n  const g = 7;\n  return a;\n}\n";
    std::fs::create_dir_all(tmp.path().join("src")).expect("mkdir");
    std::fs::write(tmp.path().join("src/app.ts"), original).expect("seed");
    commit_all(tmp.path(), "add app");
    write_manifest(tmp.path(), "- id: INT-1\n");

    let touched = original.replace("return a;", "return b;");
    mediated_write(tmp.path(), "src/app.ts", &touched);

    let records = ledger::read_all(tmp.path()).expect("read");
    assert_eq!(records[0].mutation_class.as_str(), "AST_REFACTOR");
}

#[test]
fn added_function_in_committed_file_is_evolution() {
    let tmp = TempDir::new().expect("tempdir");
    init_repo(tmp.path());
    let original = "function foo() {\n  return 1;\n}\n";
    std::fs::create_dir_all(tmp.path().join("src")).expect("mkdir");
    std::fs::write(tmp.path().join("src/app.ts"), original).expect("seed");
    commit_all(tmp.path(), "add app");
    write_manifest(tmp.path(), "- id: INT-1\n");

    let grown = format!("{}\nfunction bar() {{\n  return 2;\n}}\n", original);
    mediated_write(tmp.path(), "src/app.ts", &grown);

    let records = ledger::read_all(tmp.path()).expect("read");
    assert_eq!(records[0].mutation_class.as_str(), "INTENT_EVOLUTION");
}

#[test]
fn uncommitted_file_classifies_as_new() {
    let tmp = TempDir::new().expect("tempdir");
    init_repo(tmp.path());
    std::fs::write(tmp.path().join("README.md"), "# t\n").expect("seed");
    commit_all(tmp.path(), "init");
    write_manifest(tmp.path(), "- id: INT-1\n");

    // Never committed; HEAD extraction comes back absent.
    mediated_write(tmp.path(), "src/fresh.ts", "let x = 1\n");

    let records = ledger::read_all(tmp.path()).expect("read");
    assert_eq!(records[0].mutation_class.as_str(), "INTENT_EVOLUTION");
}

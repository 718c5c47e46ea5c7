use predicates::prelude::*;

use crate::common::{FileAssert, TestProject, rendered_images};

/// An unknown mode is rejected and the document is left untouched
#[test]
fn test_invalid_mode() {
    let project = TestProject::new().unwrap();
    let text = "Intro\n\n```dot render {\"mode\":\"exploded\"}\ndigraph{}\n```\n";
    project.write_doc("doc.md", text).unwrap();

    let output = project.run_mdrender(&["render", "doc.md", "--languages", "dot"]).unwrap();
    output
        .assert_failure()
        .assert_stderr_contains("Invalid render options on line 3")
        .assert_stderr_contains("process file doc.md");

    FileAssert::equals(project.project_path().join("doc.md"), text);
    assert!(rendered_images(project.project_path()).is_empty());
}

/// A misspelled mode gets a suggestion
#[test]
fn test_misspelled_mode_suggestion() {
    let project = TestProject::new().unwrap();
    project.write_doc("doc.md", "```dot render {\"mode\":\"code-colapsed\"}\ndigraph{}\n```\n").unwrap();

    project
        .run_mdrender(&["render", "doc.md", "--languages", "dot"])
        .unwrap()
        .assert_failure()
        .assert_stderr_contains("code-collapsed");
}

/// Malformed JSON after the keyword is an error
#[test]
fn test_malformed_options() {
    let project = TestProject::new().unwrap();
    let text = "```dot render {\"mode\":}\ndigraph{}\n```\n";
    project.write_doc("doc.md", text).unwrap();

    project
        .run_mdrender(&["render", "doc.md", "--languages", "dot"])
        .unwrap()
        .assert_failure()
        .assert_stderr_contains("Invalid render options on line 1");
    FileAssert::equals(project.project_path().join("doc.md"), text);
}

/// An unsupported language fails before any file is read
#[test]
fn test_unknown_language() {
    let project = TestProject::new().unwrap();
    project.write_doc("doc.md", "```dto render\ndigraph{}\n```\n").unwrap();

    project
        .run_mdrender(&["render", "doc.md", "--languages", "dto"])
        .unwrap()
        .assert_failure()
        .assert_stderr_contains("did you mean 'dot'");
}

/// A backend that is not installed is reported with an install hint
#[test]
fn test_missing_backend() {
    let project = TestProject::with_config("[backends.dot]\ncommand = \"mdrender-no-such-renderer\"\n").unwrap();
    let text = "```dot render\ndigraph{}\n```\n";
    project.write_doc("doc.md", text).unwrap();

    project
        .run_mdrender(&["render", "doc.md", "--languages", "dot"])
        .unwrap()
        .assert_failure()
        .assert_stderr_contains("'mdrender-no-such-renderer' for dot not found")
        .assert_stderr_contains("Install 'mdrender-no-such-renderer'");
    FileAssert::equals(project.project_path().join("doc.md"), text);
}

/// A failing backend surfaces its stderr
#[test]
fn test_backend_failure_shows_stderr() {
    let project = TestProject::with_config(
        "[backends.dot]\ncommand = \"sh\"\nargs = [\"-c\", \"echo 'syntax error in line 1' >&2; exit 3\"]\n",
    )
    .unwrap();
    let text = "```dot render\ndigraph{\n```\n";
    project.write_doc("doc.md", text).unwrap();

    project
        .run_mdrender(&["render", "doc.md", "--languages", "dot"])
        .unwrap()
        .assert_failure()
        .assert_stderr_contains("Renderer for dot failed")
        .assert_stderr_contains("syntax error in line 1");
    FileAssert::equals(project.project_path().join("doc.md"), text);
}

/// An unclosed render block cannot be resolved
#[test]
fn test_unclosed_render_block() {
    let project = TestProject::new().unwrap();
    let text = "```dot render\ndigraph{}\n";
    project.write_doc("doc.md", text).unwrap();

    project
        .run_mdrender(&["render", "doc.md", "--languages", "dot"])
        .unwrap()
        .assert_failure()
        .assert_stderr_contains("line 1");
    FileAssert::equals(project.project_path().join("doc.md"), text);
}

/// A path that does not exist is named in the error
#[test]
fn test_missing_path() {
    let project = TestProject::new().unwrap();

    project
        .run_mdrender(&["render", "missing.md", "--languages", "dot"])
        .unwrap()
        .assert_failure()
        .assert_stderr_contains("missing.md");
}

/// An explicit config file must exist
#[test]
fn test_missing_config_file() {
    let project = TestProject::new().unwrap();
    project.write_doc("doc.md", "no blocks\n").unwrap();

    assert_cmd::Command::cargo_bin("mdrender")
        .unwrap()
        .current_dir(project.project_path())
        .env("NO_COLOR", "1")
        .args(["--config", "nope.toml", "render", "doc.md", "--languages", "dot"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("config file nope.toml does not exist"));
}

/// Config overrides for languages without a backend are rejected
#[test]
fn test_config_unknown_backend() {
    let project = TestProject::with_config("[backends.mermaid]\ncommand = \"mmdc\"\n").unwrap();
    project.write_doc("doc.md", "no blocks\n").unwrap();

    project
        .run_mdrender(&["render", "doc.md", "--languages", "dot"])
        .unwrap()
        .assert_failure()
        .assert_stderr_contains("mermaid");
}

/// Missing required arguments are usage errors
#[test]
fn test_languages_required() {
    assert_cmd::Command::cargo_bin("mdrender")
        .unwrap()
        .args(["render", "doc.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--languages"));
}

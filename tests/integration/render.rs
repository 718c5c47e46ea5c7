use mdrender::markdown::chunk::fingerprint;
use predicates::prelude::*;

use crate::common::{FileAssert, TestProject, rendered_images};

/// Rendering a plain block inserts the image line and writes the image
#[test]
fn test_render_inserts_image_line() {
    let project = TestProject::new().unwrap();
    project.write_doc("doc.md", "# Title\n\n```dot render\ndigraph{a->b}\n```\n\nAfter.\n").unwrap();

    let output = project.run_mdrender(&["render", "doc.md", "--languages", "dot"]).unwrap();
    output.assert_success();

    let hash = fingerprint(&["digraph{a->b}"]);
    let image = format!("render-{hash}.svg");
    output
        .assert_stdout_contains(&format!("[doc.md:3] Rendered {image}"))
        .assert_stdout_contains("Updated doc.md")
        .assert_stdout_contains("1 file(s) scanned, 1 updated, 1 image(s) rendered");

    FileAssert::equals(
        project.project_path().join("doc.md"),
        &format!("# Title\n\n```dot render\ndigraph{{a->b}}\n```\n![{image}]({image})\n\nAfter.\n"),
    );
    // The cat backend echoes the diagram source back as the image
    FileAssert::equals(project.project_path().join(&image), "digraph{a->b}");
}

/// A second run over rendered output renders nothing and leaves the file alone
#[test]
fn test_second_run_is_noop() {
    let project = TestProject::new().unwrap();
    project
        .write_doc(
            "doc.md",
            "```dot render\ndigraph{a->b}\n```\n\n```plantuml render {\"mode\":\"code-collapsed\"}\n@startuml\nA -> B\n@enduml\n```\n",
        )
        .unwrap();

    project.run_mdrender(&["render", "doc.md", "--languages", "dot,plantuml"]).unwrap().assert_success();
    let first = project.read("doc.md");
    let images = rendered_images(project.project_path());
    assert_eq!(images.len(), 2);

    let output = project.run_mdrender(&["render", "doc.md", "--languages", "dot,plantuml"]).unwrap();
    output.assert_success().assert_stdout_contains("1 file(s) scanned, 0 updated, 0 image(s) rendered");
    assert!(!output.stdout.contains("Rendered"));
    assert_eq!(project.read("doc.md"), first);
    assert_eq!(rendered_images(project.project_path()), images);
}

/// Editing the diagram source re-renders under the new fingerprint
#[test]
fn test_edited_source_is_rerendered() {
    let project = TestProject::new().unwrap();
    project.write_doc("doc.md", "```dot render\ndigraph{a->b}\n```\n").unwrap();
    project.run_mdrender(&["render", "doc.md", "--languages", "dot"]).unwrap().assert_success();

    let edited = project.read("doc.md").replace("digraph{a->b}", "digraph{a->c}");
    project.write_doc("doc.md", &edited).unwrap();
    project.run_mdrender(&["render", "doc.md", "--languages", "dot"]).unwrap().assert_success();

    let old = format!("render-{}.svg", fingerprint(&["digraph{a->b}"]));
    let new = format!("render-{}.svg", fingerprint(&["digraph{a->c}"]));
    FileAssert::equals(project.project_path().join("doc.md"), &format!("```dot render\ndigraph{{a->c}}\n```\n![{new}]({new})\n"));
    FileAssert::exists(project.project_path().join(&new));
    // Stale images are not cleaned up
    FileAssert::exists(project.project_path().join(&old));
}

/// An explicit filename is tracked through a hash comment
#[test]
fn test_explicit_filename_gets_hash_comment() {
    let project = TestProject::new().unwrap();
    project.write_doc("doc.md", "```dot render {\"filename\":\"diagram.svg\"}\ndigraph{a->b}\n```\n").unwrap();

    project.run_mdrender(&["render", "doc.md", "--languages", "dot"]).unwrap().assert_success();

    let short = &fingerprint(&["digraph{a->b}"])[..8];
    FileAssert::contains(
        project.project_path().join("doc.md"),
        &format!("![diagram.svg](diagram.svg) <!-- hash:{short} -->"),
    );
    FileAssert::exists(project.project_path().join("diagram.svg"));

    let before = project.read("doc.md");
    let output = project.run_mdrender(&["render", "doc.md", "--languages", "dot"]).unwrap();
    output.assert_success();
    assert!(!output.stdout.contains("Rendered"));
    assert_eq!(project.read("doc.md"), before);
}

/// Blocks in languages not passed to --languages are left alone
#[test]
fn test_unrequested_language_untouched() {
    let project = TestProject::new().unwrap();
    let text = "```pikchr render\nbox \"hi\"\n```\n\n```dot\ndigraph{}\n```\n";
    project.write_doc("doc.md", text).unwrap();

    project.run_mdrender(&["render", "doc.md", "--languages", "dot"]).unwrap().assert_success();
    FileAssert::equals(project.project_path().join("doc.md"), text);
    assert!(rendered_images(project.project_path()).is_empty());
}

/// --quiet suppresses progress and summary lines
#[test]
fn test_quiet_prints_nothing() {
    let project = TestProject::new().unwrap();
    project.write_doc("doc.md", "```dot render\ndigraph{}\n```\n").unwrap();

    assert_cmd::Command::cargo_bin("mdrender")
        .unwrap()
        .current_dir(project.project_path())
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .args(["--quiet", "--config"])
        .arg(project.config_path())
        .args(["render", "doc.md", "--languages", "dot"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    FileAssert::contains(project.project_path().join("doc.md"), "![render-");
}

/// CRLF documents keep their line endings around the inserted image line
#[test]
fn test_crlf_document_round_trips() {
    let project = TestProject::new().unwrap();
    project.write_doc("doc.md", "Intro\r\n```dot render\r\ndigraph{}\r\n```\r\nOutro\r\n").unwrap();

    project.run_mdrender(&["render", "doc.md", "--languages", "dot"]).unwrap().assert_success();
    let first = project.read("doc.md");
    assert!(first.starts_with("Intro\r\n```dot render\r\n"));
    assert!(first.ends_with("Outro\r\n"));

    project.run_mdrender(&["render", "doc.md", "--languages", "dot"]).unwrap().assert_success();
    assert_eq!(project.read("doc.md"), first);
}

/// Diagnostics from a succeeding backend are logged as warnings
#[test]
fn test_backend_warnings_are_logged() {
    let project = TestProject::with_config(
        "[backends.dot]\ncommand = \"sh\"\nargs = [\"-c\", \"echo 'warning: old syntax' >&2; cat\"]\n",
    )
    .unwrap();
    project.write_doc("doc.md", "```dot render\ndigraph{}\n```\n").unwrap();

    project
        .run_mdrender(&["render", "doc.md", "--languages", "dot"])
        .unwrap()
        .assert_success()
        .assert_stderr_contains("warning: old syntax");
    FileAssert::contains(project.project_path().join("doc.md"), "![render-");
}

/// Render directives shown inside a longer fence are left alone
#[test]
fn test_directive_inside_longer_fence_is_not_rendered() {
    let project = TestProject::new().unwrap();
    let text = "````markdown\n```dot render\ndigraph{example}\n```\n````\n\n```dot render\ndigraph{real}\n```\n";
    project.write_doc("doc.md", text).unwrap();

    project
        .run_mdrender(&["render", "doc.md", "--languages", "dot"])
        .unwrap()
        .assert_success()
        .assert_stdout_contains("1 image(s) rendered");

    let image = format!("render-{}.svg", fingerprint(&["digraph{real}"]));
    FileAssert::equals(
        project.project_path().join("doc.md"),
        &format!("````markdown\n```dot render\ndigraph{{example}}\n```\n````\n\n```dot render\ndigraph{{real}}\n```\n![{image}]({image})\n"),
    );
    assert_eq!(rendered_images(project.project_path()).len(), 1);
}

use mdrender::markdown::chunk::fingerprint;

use crate::common::{CAT_BACKENDS_CONFIG, FileAssert, TestProject, rendered_images};

/// A directory argument expands to every markdown file beneath it
#[test]
fn test_directory_argument() {
    let project = TestProject::new().unwrap();
    project.write_doc("docs/a.md", "```dot render\ndigraph{a}\n```\n").unwrap();
    project.write_doc("docs/guide/b.markdown", "```dot render\ndigraph{b}\n```\n").unwrap();
    project.write_doc("docs/notes.txt", "```dot render\ndigraph{c}\n```\n").unwrap();

    let output = project.run_mdrender(&["render", "docs", "--languages", "dot"]).unwrap();
    output
        .assert_success()
        .assert_stdout_contains("Updated docs/a.md")
        .assert_stdout_contains("Updated docs/guide/b.markdown")
        .assert_stdout_contains("2 file(s) scanned, 2 updated, 2 image(s) rendered");

    // Images land next to their documents
    assert_eq!(rendered_images(project.project_path().join("docs")).len(), 1);
    assert_eq!(rendered_images(project.project_path().join("docs/guide")).len(), 1);
    FileAssert::equals(project.project_path().join("docs/notes.txt"), "```dot render\ndigraph{c}\n```\n");
}

/// --output-dir collects images and --link-prefix shapes the references
#[test]
fn test_output_dir_and_link_prefix() {
    let project = TestProject::new().unwrap();
    project.write_doc("doc.md", "```dot render\ndigraph{a}\n```\n").unwrap();

    project
        .run_mdrender(&["render", "doc.md", "--languages", "dot", "--output-dir", "img", "--link-prefix", "img/"])
        .unwrap()
        .assert_success();

    let name = format!("render-{}.svg", fingerprint(&["digraph{a}"]));
    FileAssert::exists(project.project_path().join("img").join(&name));
    FileAssert::contains(project.project_path().join("doc.md"), &format!("![{name}](img/{name})"));
    assert!(rendered_images(project.project_path()).is_empty());
}

/// Config file values apply when the flags are absent
#[test]
fn test_config_file_defaults() {
    let config = format!("link_prefix = \"/assets/\"\noutput_dir = \"assets\"\n{CAT_BACKENDS_CONFIG}");
    let project = TestProject::with_config(&config).unwrap();
    project.write_doc("doc.md", "```dot render\ndigraph{a}\n```\n").unwrap();

    project.run_mdrender(&["render", "doc.md", "--languages", "dot"]).unwrap().assert_success();

    let name = format!("render-{}.svg", fingerprint(&["digraph{a}"]));
    FileAssert::exists(project.project_path().join("assets").join(&name));
    FileAssert::contains(project.project_path().join("doc.md"), &format!("![{name}](/assets/{name})"));
}

/// Files are processed in argument order; a failure keeps earlier files rewritten
#[test]
fn test_failure_keeps_earlier_files() {
    let project = TestProject::new().unwrap();
    project.write_doc("a.md", "```dot render\ndigraph{a}\n```\n").unwrap();
    let broken = "```dot render {\"mode\":\"sideways\"}\ndigraph{b}\n```\n";
    project.write_doc("b.md", broken).unwrap();

    project.run_mdrender(&["render", "a.md", "b.md", "--languages", "dot"]).unwrap().assert_failure();

    FileAssert::contains(project.project_path().join("a.md"), "![render-");
    FileAssert::equals(project.project_path().join("b.md"), broken);
}

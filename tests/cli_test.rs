//! End-to-end tests of the `rumdown` binary.
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn rumdown_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_rumdown"))
}

fn rumdown_in(dir: &TempDir) -> Command {
    let mut cmd = Command::new(rumdown_binary());
    cmd.current_dir(dir.path()).arg("--no-config");
    cmd
}

#[test]
fn test_converts_stdin() {
    let temp_dir = TempDir::new().unwrap();
    rumdown_in(&temp_dir)
        .write_stdin("# Hello\n\n*world*\n")
        .assert()
        .success()
        .stdout("<h1>Hello</h1>\n<p><em>world</em></p>\n");
}

#[test]
fn test_converts_file_to_output_file() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("doc.md"), "Some **bold** text.").unwrap();

    rumdown_in(&temp_dir)
        .args(["doc.md", "-o", "doc.html"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let html = fs::read_to_string(temp_dir.path().join("doc.html")).unwrap();
    assert_eq!(html, "<p>Some <strong>bold</strong> text.</p>\n");
}

#[test]
fn test_multiple_files_into_output_directory() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("a.md"), "A").unwrap();
    fs::write(temp_dir.path().join("b.md"), "B").unwrap();

    rumdown_in(&temp_dir)
        .args(["a.md", "b.md", "--output", "out"])
        .assert()
        .success();

    let out = temp_dir.path().join("out");
    assert_eq!(fs::read_to_string(out.join("a.html")).unwrap(), "<p>A</p>\n");
    assert_eq!(fs::read_to_string(out.join("b.html")).unwrap(), "<p>B</p>\n");
}

#[test]
fn test_safe_mode_flag() {
    let temp_dir = TempDir::new().unwrap();
    rumdown_in(&temp_dir)
        .args(["--safe-mode", "escape"])
        .write_stdin("<div>x</div>")
        .assert()
        .success()
        .stdout("<p>&lt;div&gt;x&lt;/div&gt;</p>\n");
}

#[test]
fn test_invalid_safe_mode_is_usage_error() {
    let temp_dir = TempDir::new().unwrap();
    rumdown_in(&temp_dir)
        .args(["--safe-mode", "paranoid"])
        .write_stdin("x")
        .assert()
        .failure()
        .stderr(predicate::str::contains("paranoid"));
}

#[test]
fn test_tables_extension_flag() {
    let temp_dir = TempDir::new().unwrap();
    rumdown_in(&temp_dir)
        .args(["-x", "tables"])
        .write_stdin("a | b\n--- | ---\n1 | 2\n")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("<table>"));
}

#[test]
fn test_unknown_extension_is_tool_error() {
    let temp_dir = TempDir::new().unwrap();
    rumdown_in(&temp_dir)
        .args(["-x", "footnotes"])
        .write_stdin("x")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unknown extension: footnotes"));
}

#[test]
fn test_tree_output_is_json() {
    let temp_dir = TempDir::new().unwrap();
    let output = rumdown_in(&temp_dir)
        .arg("--tree")
        .write_stdin("# T\n\npara")
        .output()
        .unwrap();
    assert!(output.status.success());

    let tree: serde_json::Value = serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(tree["tag"], "div");
    assert_eq!(tree["children"][0]["tag"], "h1");
    assert_eq!(tree["children"][0]["text"], "T");
    assert_eq!(tree["children"][1]["tag"], "p");
}

#[test]
fn test_tree_output_into_directory() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("a.md"), "# A").unwrap();
    fs::write(temp_dir.path().join("b.md"), "* b").unwrap();

    rumdown_in(&temp_dir)
        .args(["--tree", "a.md", "b.md", "-o", "trees"])
        .assert()
        .success();

    let a: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(temp_dir.path().join("trees/a.json")).unwrap()).unwrap();
    assert_eq!(a["children"][0]["tag"], "h1");
    let b: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(temp_dir.path().join("trees/b.json")).unwrap()).unwrap();
    assert_eq!(b["children"][0]["tag"], "ul");
}

#[test]
fn test_missing_file_exits_with_tool_error() {
    let temp_dir = TempDir::new().unwrap();
    rumdown_in(&temp_dir)
        .arg("nope.md")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Failed to read nope.md"));
}

#[test]
fn test_config_file_is_discovered() {
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir(temp_dir.path().join(".git")).unwrap();
    fs::write(temp_dir.path().join(".rumdown.toml"), "[global]\nsafe-mode = \"replace\"\n").unwrap();

    Command::new(rumdown_binary())
        .current_dir(temp_dir.path())
        .write_stdin("<div>x</div>")
        .assert()
        .success()
        .stdout("<p>[HTML_REMOVED]</p>\n");
}

#[test]
fn test_cli_flag_overrides_config_file() {
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir(temp_dir.path().join(".git")).unwrap();
    fs::write(temp_dir.path().join(".rumdown.toml"), "[global]\nsafe-mode = \"replace\"\n").unwrap();

    Command::new(rumdown_binary())
        .current_dir(temp_dir.path())
        .args(["--safe-mode", "remove"])
        .write_stdin("<div>x</div>")
        .assert()
        .success()
        .stdout("<p></p>\n");
}

#[test]
fn test_init_creates_config_once() {
    let temp_dir = TempDir::new().unwrap();
    Command::new(rumdown_binary())
        .current_dir(temp_dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created default configuration file"));
    assert!(temp_dir.path().join(".rumdown.toml").is_file());

    Command::new(rumdown_binary())
        .current_dir(temp_dir.path())
        .arg("init")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("already exists"));
}

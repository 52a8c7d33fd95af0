use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// Command running from an empty working directory with an empty home,
/// so no config file is picked up by accident.
fn r2c(home: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("r2c"));
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env_remove("RUST_LOG")
        .env_remove("R2C_CONFIG");
    cmd
}

fn sample_repo() -> TempDir {
    let temp = tempdir().unwrap();
    write_file(&temp.path().join("a.txt"), "hi\n");
    write_file(&temp.path().join(".gitignore"), "b.txt\n");
    write_file(&temp.path().join("b.txt"), "x\n");
    temp
}

#[test]
fn ignored_files_are_left_out() {
    let repo = sample_repo();
    let home = tempdir().unwrap();

    r2c(&home)
        .arg(repo.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("## Structure\n\n```\na.txt\n```"))
        .stdout(predicate::str::contains("### File: a.txt (3 bytes)"))
        .stdout(predicate::str::contains("### File: b.txt").not())
        .stdout(predicate::str::contains("- Total files: 1\n- Total lines: 1\n"))
        .stderr(predicate::str::contains("Warning:").not());
}

#[test]
fn no_gitignore_includes_everything() {
    let repo = sample_repo();
    let home = tempdir().unwrap();

    r2c(&home)
        .arg(repo.path())
        .arg("--no-gitignore")
        .assert()
        .success()
        .stdout(predicate::str::contains("### File: b.txt"))
        .stdout(predicate::str::contains("### File: .gitignore"))
        .stdout(predicate::str::contains("- Total files: 3\n"));
}

#[test]
fn line_numbers_prefix_content() {
    let repo = sample_repo();
    let home = tempdir().unwrap();

    r2c(&home)
        .arg(repo.path())
        .arg("-l")
        .assert()
        .success()
        .stdout(predicate::str::contains("```text\n1\thi\n```"));
}

#[test]
fn json_format_is_valid() {
    let repo = sample_repo();
    let home = tempdir().unwrap();

    let output = r2c(&home)
        .arg(repo.path())
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["scan"]["total_files"], 1);
    assert_eq!(value["scan"]["directory_tree"], "a.txt\n");
    assert_eq!(value["git"]["status"], "not_a_repository");
}

#[test]
fn output_file_is_written() {
    let repo = sample_repo();
    let home = tempdir().unwrap();
    let target = home.path().join("out/context.md");

    r2c(&home)
        .arg(repo.path())
        .arg("-o")
        .arg(&target)
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Output saved to:"));

    let written = fs::read_to_string(&target).unwrap();
    assert!(written.starts_with("# Repository Context\n"));
    assert!(written.contains("### File: a.txt"));
}

#[test]
fn token_counts_appear_in_tree_and_summary() {
    let repo = sample_repo();
    let home = tempdir().unwrap();

    r2c(&home)
        .arg(repo.path())
        .args(["-t", "--token-model", "heuristic"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"```\na\.txt \(\d+ tokens\)\n```").unwrap())
        .stdout(predicate::str::contains("- Total tokens: "));
}

#[test]
fn single_file_path() {
    let repo = sample_repo();
    let home = tempdir().unwrap();

    r2c(&home)
        .arg(repo.path().join("a.txt"))
        .assert()
        .success()
        .stdout(predicate::str::contains("```\na.txt\n```"))
        .stdout(predicate::str::contains("- Total files: 1\n"));
}

#[test]
fn missing_path_is_reported_and_others_continue() {
    let repo = sample_repo();
    let home = tempdir().unwrap();

    r2c(&home)
        .arg(home.path().join("does-not-exist"))
        .arg(repo.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("path does not exist"))
        .stdout(predicate::str::contains("### File: a.txt"));
}

#[test]
fn more_than_five_paths_fails() {
    let home = tempdir().unwrap();

    r2c(&home)
        .args(["a", "b", "c", "d", "e", "f"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("too many paths"));
}

#[test]
fn missing_ignore_file_warns_on_stderr() {
    let temp = tempdir().unwrap();
    write_file(&temp.path().join("a.txt"), "hi\n");
    let home = tempdir().unwrap();

    r2c(&home)
        .arg(temp.path())
        .arg("--no-color")
        .assert()
        .success()
        .stderr(predicate::str::contains("Warning: no .gitignore found"))
        .stdout(predicate::str::contains("- Errors encountered: 1\n"));
}

#[test]
fn config_file_in_working_directory_is_used() {
    let repo = sample_repo();
    let home = tempdir().unwrap();
    write_file(&home.path().join(".r2c.toml"), "no_gitignore = true\n");

    r2c(&home)
        .arg(repo.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("### File: b.txt"));
}

#[test]
fn explicit_bad_config_fails() {
    let repo = sample_repo();
    let home = tempdir().unwrap();
    let config = home.path().join("bad.toml");
    write_file(&config, "count_tokens = \"yes please\"\n");

    r2c(&home)
        .arg(repo.path())
        .arg("--config")
        .arg(&config)
        .assert()
        .failure();
}

#[test]
fn rust_log_overrides_default_level() {
    let repo = sample_repo();
    let home = tempdir().unwrap();

    r2c(&home)
        .arg(repo.path())
        .env("RUST_LOG", "debug")
        .assert()
        .success()
        .stderr(predicate::str::contains("DEBUG"))
        .stderr(predicate::str::contains("processing 1 path(s)"));
}

#[test]
fn no_color_disables_ansi_in_diagnostics() {
    let repo = sample_repo();
    let home = tempdir().unwrap();

    r2c(&home)
        .arg(repo.path())
        .args(["-v", "--no-color"])
        .assert()
        .success()
        .stderr(predicate::str::contains("DEBUG"))
        .stderr(predicate::str::contains("\u{1b}[").not());
}

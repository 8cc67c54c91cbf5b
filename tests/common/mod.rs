//! Shared test helpers for partial integration tests.
//!
//! Every test builds its own git repository in a temp directory with the
//! `git` CLI, so nothing touches the real checkout.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

/// Run git in `dir`, assert success, return trimmed stdout.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let out = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("failed to run git");
    assert!(
        out.status.success(),
        "git {} failed: {}",
        args.join(" "),
        String::from_utf8_lossy(&out.stderr)
    );
    String::from_utf8_lossy(&out.stdout).trim().to_owned()
}

pub fn write(dir: &Path, rel: &str, contents: &str) {
    let path = dir.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

pub fn commit_all(dir: &Path, message: &str) -> String {
    git(dir, &["add", "-A"]);
    git(dir, &["commit", "-q", "-m", message]);
    git(dir, &["rev-parse", "HEAD"])
}

fn configure_identity(dir: &Path) {
    git(dir, &["config", "user.email", "test@test.com"]);
    git(dir, &["config", "user.name", "Test User"]);
    git(dir, &["config", "commit.gpgsign", "false"]);
}

/// A repository on `main` with one commit containing `README.md`.
pub fn setup_repo() -> TempDir {
    let dir = TempDir::new().expect("failed to create temp dir");
    git(dir.path(), &["init", "-q", "-b", "main"]);
    configure_identity(dir.path());
    write(dir.path(), "README.md", "# test\n");
    commit_all(dir.path(), "initial commit");
    dir
}

/// Reactor used by the CLI tests: `core` ← `api` ← `app`, plus an
/// unrelated `tools` module.
pub const REACTOR: &str = r#"
[[module]]
id = "core"
root = "core"

[[module]]
id = "api"
root = "api"
dependencies = [{ id = "core", snapshot = true }]

[[module]]
id = "app"
root = "app"
dependencies = [{ id = "api" }]

[[module]]
id = "tools"
root = "tools"
"#;

/// [`setup_repo`] plus a committed reactor and one source file per module.
pub fn setup_reactor_repo() -> TempDir {
    let dir = setup_repo();
    write(dir.path(), "reactor.toml", REACTOR);
    for module in ["core", "api", "app", "tools"] {
        write(dir.path(), &format!("{module}/src/lib.rs"), "// v1\n");
    }
    commit_all(dir.path(), "add modules");
    dir
}

/// An "origin" repository with `main` and `develop`, and a clone of
/// it with `origin` configured. Returns `(origin, clone)`.
pub fn setup_with_remote() -> (TempDir, TempDir) {
    let origin = setup_repo();
    git(origin.path(), &["checkout", "-q", "-b", "develop"]);
    write(origin.path(), "dev.txt", "develop work\n");
    commit_all(origin.path(), "develop commit");
    git(origin.path(), &["checkout", "-q", "main"]);

    let clone = TempDir::new().expect("failed to create temp dir");
    let out = Command::new("git")
        .args(["clone", "-q"])
        .arg(origin.path())
        .arg(clone.path())
        .output()
        .expect("failed to run git clone");
    assert!(
        out.status.success(),
        "git clone failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    configure_identity(clone.path());
    (origin, clone)
}

/// Canonical absolute path of `rel` inside `dir`.
pub fn abs(dir: &Path, rel: &str) -> PathBuf {
    dir.canonicalize().unwrap().join(rel)
}

/// Run the `partial` binary in `dir` with colors and user env disabled.
pub fn partial_in(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_partial"))
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("PARTIAL_LOG_FORMAT")
        .env_remove("PARTIAL_BASE_BRANCH")
        .env_remove("PARTIAL_REFERENCE_BRANCH")
        .env_remove("PARTIAL_IGNORED_MODULES")
        .env_remove("PARTIAL_CONFIG")
        .env_remove("PARTIAL_REACTOR")
        .env_remove("PARTIAL_REMOTE")
        .output()
        .expect("failed to execute partial")
}

/// Run `partial` and assert it succeeds. Returns `(stdout, stderr)`.
pub fn partial_ok(dir: &Path, args: &[&str]) -> (String, String) {
    let out = partial_in(dir, args);
    let stdout = String::from_utf8_lossy(&out.stdout).to_string();
    let stderr = String::from_utf8_lossy(&out.stderr).to_string();
    assert!(
        out.status.success(),
        "partial {} failed:\nstdout: {stdout}\nstderr: {stderr}",
        args.join(" "),
    );
    (stdout, stderr)
}

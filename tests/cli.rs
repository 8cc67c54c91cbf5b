//! End-to-end runs of the `partial` binary.

mod common;

use common::{
    abs, commit_all, git, partial_in, partial_ok, setup_reactor_repo, setup_repo, setup_with_remote,
    write,
};

fn lines(stdout: &str) -> Vec<&str> {
    stdout.lines().collect()
}

#[test]
fn core_change_selects_dependents_in_reactor_order() {
    let dir = setup_reactor_repo();
    write(dir.path(), "core/src/lib.rs", "// v2\n");

    let (stdout, _) = partial_ok(dir.path(), &["--uncommitted"]);
    assert_eq!(lines(&stdout), ["core", "api", "app"]);
}

#[test]
fn plan_alias_and_no_impacted() {
    let dir = setup_reactor_repo();
    write(dir.path(), "core/src/lib.rs", "// v2\n");

    let (stdout, _) = partial_ok(dir.path(), &["plan", "--uncommitted", "--no-impacted"]);
    assert_eq!(lines(&stdout), ["core"]);
}

#[test]
fn snapshot_dependencies_are_added() {
    let dir = setup_reactor_repo();
    write(dir.path(), "api/src/lib.rs", "// v2\n");

    let (stdout, _) = partial_ok(
        dir.path(),
        &[
            "build-set",
            "--uncommitted",
            "--no-impacted",
            "--build-snapshot-dependencies",
        ],
    );
    assert_eq!(lines(&stdout), ["core", "api"]);
}

#[test]
fn ignored_modules_are_never_selected() {
    let dir = setup_reactor_repo();
    write(dir.path(), "core/src/lib.rs", "// v2\n");

    let (stdout, _) = partial_ok(dir.path(), &["--uncommitted", "--ignore", "api,tools"]);
    assert_eq!(lines(&stdout), ["core", "app"]);
}

#[test]
fn config_file_supplies_defaults() {
    let dir = setup_reactor_repo();
    write(
        dir.path(),
        ".partial/config.toml",
        "[changes]\nuntracked = true\nexclude_paths = [\"**/*.md\"]\n\n[impact]\nimpacted = false\n",
    );
    write(dir.path(), "tools/NOTES.md", "notes\n");
    write(dir.path(), "app/src/new.rs", "// new\n");

    let (stdout, _) = partial_ok(dir.path(), &[]);
    assert_eq!(lines(&stdout), ["app"]);
}

#[test]
fn json_report_includes_changed_files() {
    let dir = setup_reactor_repo();
    write(dir.path(), "api/src/lib.rs", "// v2\n");

    let (stdout, _) = partial_ok(dir.path(), &["--uncommitted", "--format", "json"]);
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["build_all"], false);
    assert_eq!(report["build_set"], serde_json::json!(["api", "app"]));
    assert_eq!(report["changed_modules"], serde_json::json!(["api"]));
    let expected = abs(dir.path(), "api/src/lib.rs").display().to_string();
    assert_eq!(report["changed_files"], serde_json::json!([expected]));
}

#[test]
fn build_all_lists_every_module() {
    let dir = setup_reactor_repo();
    let (stdout, _) = partial_ok(dir.path(), &["--build-all"]);
    assert_eq!(lines(&stdout), ["core", "api", "app", "tools"]);
}

#[test]
fn output_flag_writes_file() {
    let dir = setup_reactor_repo();
    write(dir.path(), "tools/src/lib.rs", "// v2\n");
    let out = dir.path().join("selected.txt");

    let (stdout, _) = partial_ok(
        dir.path(),
        &["--uncommitted", "--output", out.to_str().unwrap()],
    );
    assert!(stdout.is_empty());
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "tools\n");
}

#[test]
fn changes_subcommand_from_subdirectory_prints_absolute_paths() {
    let dir = setup_repo();
    write(dir.path(), "a/b/new.txt", "x\n");
    write(dir.path(), "top.txt", "x\n");

    let (stdout, _) = partial_ok(&dir.path().join("a/b"), &["changes", "--untracked"]);
    let expected = [
        abs(dir.path(), "a/b/new.txt").display().to_string(),
        abs(dir.path(), "top.txt").display().to_string(),
    ];
    assert_eq!(lines(&stdout), expected);
}

#[test]
fn base_branch_checkout_is_logged() {
    let dir = setup_reactor_repo();
    git(dir.path(), &["checkout", "-q", "-b", "feature"]);
    write(dir.path(), "app/src/lib.rs", "// feature\n");
    commit_all(dir.path(), "feature work");
    git(dir.path(), &["checkout", "-q", "main"]);
    write(dir.path(), "tools/src/lib.rs", "// main\n");
    commit_all(dir.path(), "main work");
    git(dir.path(), &["checkout", "-q", "feature"]);

    let (stdout, stderr) = partial_ok(dir.path(), &["--base-branch", "main"]);
    assert!(stderr.contains("Checking out base branch main"), "{stderr}");
    assert_eq!(lines(&stdout), ["app", "tools"]);
    assert_eq!(git(dir.path(), &["rev-parse", "--abbrev-ref", "HEAD"]), "main");
}

#[test]
fn merge_base_hash_is_logged() {
    let dir = setup_reactor_repo();
    let fork = git(dir.path(), &["rev-parse", "HEAD"]);
    git(dir.path(), &["checkout", "-q", "-b", "feature"]);
    write(dir.path(), "app/src/lib.rs", "// feature\n");
    commit_all(dir.path(), "feature work");
    git(dir.path(), &["checkout", "-q", "main"]);
    write(dir.path(), "tools/src/lib.rs", "// main\n");
    commit_all(dir.path(), "main work");
    git(dir.path(), &["checkout", "-q", "feature"]);

    let (stdout, stderr) = partial_ok(
        dir.path(),
        &["--base-branch", "main", "--compare-to-merge-base"],
    );
    assert!(stderr.contains("comparing against merge base"), "{stderr}");
    assert!(stderr.contains(&fork), "{stderr}");
    assert!(!stderr.contains("Checking out base branch"), "{stderr}");
    assert_eq!(lines(&stdout), ["app"]);
    assert_eq!(git(dir.path(), &["rev-parse", "--abbrev-ref", "HEAD"]), "feature");
}

#[test]
fn fetch_target_is_logged() {
    let (_origin, clone) = setup_with_remote();

    let (stdout, stderr) = partial_ok(
        clone.path(),
        &[
            "changes",
            "--fetch-reference-branch",
            "--reference-branch",
            "refs/remotes/origin/develop",
        ],
    );
    assert!(stderr.contains("fetching reference branch"), "{stderr}");
    assert!(stderr.contains("refs/remotes/origin/develop"), "{stderr}");
    assert!(
        stderr.contains("+refs/heads/develop:refs/remotes/origin/develop"),
        "{stderr}"
    );
    let expected = abs(clone.path(), "dev.txt").display().to_string();
    assert_eq!(lines(&stdout), [expected.as_str()]);
}

#[test]
fn json_logs_on_request() {
    let dir = setup_reactor_repo();
    let out = std::process::Command::new(env!("CARGO_BIN_EXE_partial"))
        .args(["--build-all"])
        .current_dir(dir.path())
        .env("PARTIAL_LOG_FORMAT", "json")
        .env_remove("RUST_LOG")
        .output()
        .unwrap();
    assert!(out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    let first = stderr.lines().next().unwrap();
    let event: serde_json::Value = serde_json::from_str(first).unwrap();
    assert_eq!(event["level"], "INFO");
}

#[test]
fn merge_base_without_base_fails_before_git() {
    let dir = setup_reactor_repo();
    let out = partial_in(dir.path(), &["--compare-to-merge-base"]);
    assert!(!out.status.success());
    assert!(out.stdout.is_empty(), "no modules may be selected on failure");
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("To fix:"), "{stderr}");
}

#[test]
fn nothing_selected_is_a_config_error() {
    let dir = setup_reactor_repo();
    let out = partial_in(dir.path(), &[]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("configuration error"));
}

#[test]
fn missing_reactor_is_reported() {
    let dir = setup_repo();
    let out = partial_in(dir.path(), &["--build-all"]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("reactor.toml"), "{stderr}");
}

#[test]
fn outside_a_repository_fails() {
    let dir = tempfile::TempDir::new().unwrap();
    let out = partial_in(dir.path(), &["--build-all"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("git repository"));
}

#[test]
fn completions_do_not_need_a_repository() {
    let dir = tempfile::TempDir::new().unwrap();
    let (stdout, _) = partial_ok(dir.path(), &["completions", "bash"]);
    assert!(stdout.contains("partial"));
}

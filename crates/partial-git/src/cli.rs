//! Helpers for running the `git` binary inside the working tree.

use std::path::Path;
use std::process::{Command, Output};

use crate::error::GitError;

/// Run `git <args>` in `dir` and return raw stdout bytes.
pub fn git_stdout(dir: &Path, args: &[&str]) -> Result<Vec<u8>, GitError> {
    let output = run(dir, args)?;
    if output.status.success() {
        Ok(output.stdout)
    } else {
        Err(command_failed(args, &output))
    }
}

/// Run `git <args>` in `dir`, returning the full output regardless of the
/// exit status.
pub fn run(dir: &Path, args: &[&str]) -> Result<Output, GitError> {
    tracing::debug!(dir = %dir.display(), args = ?args, "running git");
    Ok(Command::new("git")
        .args(args)
        .current_dir(dir)
        // Keep output machine-readable regardless of the user's locale.
        .env("LC_ALL", "C")
        .output()?)
}

pub fn command_failed(args: &[&str], output: &Output) -> GitError {
    GitError::CommandFailed {
        command: format!("git {}", args.join(" ")),
        stderr: stderr_of(output),
        exit_code: output.status.code(),
    }
}

pub fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).trim().to_owned()
}

/// Split NUL-terminated `-z` output into UTF-8 records.
///
/// Non-UTF-8 paths are decoded lossily; git only emits those for repositories
/// that already have mixed encodings.
pub fn nul_records(raw: &[u8]) -> Vec<String> {
    raw.split(|b| *b == 0)
        .filter(|rec| !rec.is_empty())
        .map(|rec| String::from_utf8_lossy(rec).into_owned())
        .collect()
}

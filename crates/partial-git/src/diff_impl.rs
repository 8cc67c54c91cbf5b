//! Commit-to-commit diff via `git diff --name-status -z`.

use crate::cli;
use crate::error::GitError;
use crate::gix_repo::GixRepo;
use crate::types::{ChangeType, DiffEntry, GitOid};

pub fn diff_commits(repo: &GixRepo, old: GitOid, new: GitOid) -> Result<Vec<DiffEntry>, GitError> {
    let old = old.to_string();
    let new = new.to_string();
    let args = [
        "diff",
        "--name-status",
        "-z",
        "--no-renames",
        "--no-ext-diff",
        old.as_str(),
        new.as_str(),
        "--",
    ];
    let raw = cli::git_stdout(&repo.workdir, &args)?;
    Ok(parse_name_status_z(&cli::nul_records(&raw)))
}

/// Parse alternating `<status>\0<path>\0` records.
fn parse_name_status_z(records: &[String]) -> Vec<DiffEntry> {
    records
        .chunks_exact(2)
        .map(|pair| DiffEntry {
            path: pair[1].clone(),
            change_type: match pair[0].chars().next() {
                Some('A') => ChangeType::Added,
                Some('D') => ChangeType::Deleted,
                Some('T') => ChangeType::TypeChanged,
                _ => ChangeType::Modified,
            },
        })
        .collect()
}

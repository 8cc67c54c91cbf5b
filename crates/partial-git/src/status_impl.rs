//! Working-tree status via `git status --porcelain -z`.

use crate::cli;
use crate::error::GitError;
use crate::gix_repo::GixRepo;
use crate::types::{FileStatus, StatusEntry};

const STATUS_ARGS: &[&str] = &[
    "status",
    "--porcelain=v1",
    "-z",
    "--untracked-files=all",
    "--ignored=no",
];

pub fn status(repo: &GixRepo) -> Result<Vec<StatusEntry>, GitError> {
    let raw = cli::git_stdout(&repo.workdir, STATUS_ARGS)?;
    Ok(parse_porcelain_z(&cli::nul_records(&raw)))
}

/// Parse `git status --porcelain=v1 -z` records.
///
/// Each record is `XY <path>`. Renames and copies are followed by an extra
/// record holding the original path, which is reported as deleted so both
/// sides of the move count as changed.
fn parse_porcelain_z(records: &[String]) -> Vec<StatusEntry> {
    let mut entries = Vec::new();
    let mut iter = records.iter();
    while let Some(record) = iter.next() {
        // Minimum valid record: "XY p"
        if record.len() < 4 || !record.is_char_boundary(3) {
            continue;
        }
        let (code, path) = record.split_at(3);
        let mut xy = code.chars();
        let x = xy.next().unwrap_or(' ');
        let y = xy.next().unwrap_or(' ');
        let status = classify(x, y);
        if status == FileStatus::Renamed
            && let Some(original) = iter.next()
        {
            entries.push(StatusEntry {
                path: original.clone(),
                status: FileStatus::Deleted,
            });
        }
        entries.push(StatusEntry {
            path: path.to_owned(),
            status,
        });
    }
    entries
}

const fn classify(x: char, y: char) -> FileStatus {
    match (x, y) {
        ('?', '?') => FileStatus::Untracked,
        ('U', _) | (_, 'U') | ('A', 'A') | ('D', 'D') => FileStatus::Conflicted,
        ('R' | 'C', _) => FileStatus::Renamed,
        ('D', _) | (_, 'D') => FileStatus::Deleted,
        ('A', _) => FileStatus::Added,
        _ => FileStatus::Modified,
    }
}

//! Core types for the partial-build git layer.
//!
//! These types form the vocabulary shared between the [`GitRepo`](crate::GitRepo) trait and
//! its callers. They intentionally contain no gix types: the backend is an
//! implementation detail.

use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// GitOid
// ---------------------------------------------------------------------------

/// A git object identifier (SHA-1, 20 bytes).
///
/// Stored as raw bytes for cheap comparison, hashing, and Copy semantics.
/// Displays as 40 lowercase hex characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GitOid([u8; 20]);

impl GitOid {
    /// Create a `GitOid` from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Return the raw bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for GitOid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for GitOid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GitOid({self})")
    }
}

// ---------------------------------------------------------------------------
// RefName
// ---------------------------------------------------------------------------

/// A validated, fully qualified git ref name.
///
/// Must start with `refs/` or be one of the well-known bare names (`HEAD`,
/// `FETCH_HEAD`, `ORIG_HEAD`).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RefName(String);

const BARE_REFS: &[&str] = &["HEAD", "FETCH_HEAD", "ORIG_HEAD"];

const HEADS_PREFIX: &str = "refs/heads/";

/// Characters and sequences `git check-ref-format` rejects. Most of them are
/// revision operators, so their presence means the input is an expression.
const FORBIDDEN: &[&str] = &["~", "^", ":", "?", "*", "[", "\\", " ", "..", "@{", "//"];

fn forbidden_sequence(name: &str) -> Option<&'static str> {
    FORBIDDEN
        .iter()
        .copied()
        .find(|seq| name.contains(seq))
        .or_else(|| name.chars().any(char::is_control).then_some("control character"))
        .or_else(|| name.ends_with(".lock").then_some(".lock"))
        .or_else(|| name.ends_with('/').then_some("trailing '/'"))
}
const REMOTES_PREFIX: &str = "refs/remotes/";

impl RefName {
    /// Create a new `RefName`, validating that it looks like a git ref.
    ///
    /// # Errors
    /// Returns an error if the name is empty, contains revision syntax
    /// (`~`, `^`, `:`, `..`, `@{`, ...), doesn't start with `refs/`, and
    /// isn't a well-known bare ref.
    pub fn new(name: &str) -> Result<Self, RefNameError> {
        if name.is_empty() {
            return Err(RefNameError {
                value: name.to_owned(),
                reason: "ref name must not be empty".to_owned(),
            });
        }
        if let Some(bad) = forbidden_sequence(name) {
            return Err(RefNameError {
                value: name.to_owned(),
                reason: format!("ref names cannot contain {bad:?}"),
            });
        }
        if name.starts_with("refs/") || BARE_REFS.contains(&name) {
            Ok(Self(name.to_owned()))
        } else {
            Err(RefNameError {
                value: name.to_owned(),
                reason: "ref name must start with 'refs/' or be a well-known ref (HEAD, etc.)"
                    .to_owned(),
            })
        }
    }

    /// Qualify a user-supplied branch name.
    ///
    /// Full ref names and bare refs pass through unchanged; anything else is
    /// treated as a local branch (`develop` → `refs/heads/develop`).
    ///
    /// # Errors
    /// Returns an error if `name` is empty or is a revision expression such
    /// as `main~1` rather than a name.
    pub fn qualify(name: &str) -> Result<Self, RefNameError> {
        if name.is_empty() || name.starts_with("refs/") || BARE_REFS.contains(&name) {
            Self::new(name)
        } else {
            Self::new(&format!("{HEADS_PREFIX}{name}"))
        }
    }

    /// Return the ref name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The branch name for a local branch ref (`refs/heads/feature/2` →
    /// `feature/2`), or `None` for any other kind of ref.
    #[must_use]
    pub fn local_branch(&self) -> Option<&str> {
        self.0.strip_prefix(HEADS_PREFIX)
    }

    /// Return `true` if this is `HEAD`.
    #[must_use]
    pub fn is_head(&self) -> bool {
        self.0 == "HEAD"
    }
}

impl fmt::Display for RefName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RefName {
    type Err = RefNameError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Error from validating a [`RefName`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefNameError {
    /// The invalid value.
    pub value: String,
    /// Why it was rejected.
    pub reason: String,
}

impl fmt::Display for RefNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid ref name {:?}: {}", self.value, self.reason)
    }
}

impl std::error::Error for RefNameError {}

// ---------------------------------------------------------------------------
// RemoteBranch
// ---------------------------------------------------------------------------

/// A branch on a remote together with the local remote-tracking ref that
/// mirrors it.
///
/// `refs/remotes/origin/develop` splits into remote `origin` and branch
/// `develop`. Branch names may themselves contain slashes; the remote is
/// always the first path segment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteBranch {
    /// The remote name (e.g. `"origin"`).
    pub remote: String,
    /// The branch name on the remote (e.g. `"develop"`).
    pub branch: String,
}

impl RemoteBranch {
    /// Interpret `reference` as a remote branch.
    ///
    /// Accepts `refs/remotes/<remote>/<branch>`, `<remote>/<branch>` when the
    /// first segment equals `default_remote`, `refs/heads/<branch>`, or a bare
    /// branch name. The latter forms use `default_remote`.
    #[must_use]
    pub fn parse(reference: &str, default_remote: &str) -> Option<Self> {
        if let Some(rest) = reference.strip_prefix(REMOTES_PREFIX) {
            let (remote, branch) = rest.split_once('/')?;
            if remote.is_empty() || branch.is_empty() {
                return None;
            }
            return Some(Self {
                remote: remote.to_owned(),
                branch: branch.to_owned(),
            });
        }
        let branch = reference
            .strip_prefix(HEADS_PREFIX)
            .or_else(|| {
                reference
                    .strip_prefix(default_remote)
                    .and_then(|rest| rest.strip_prefix('/'))
            })
            .unwrap_or(reference);
        if branch.is_empty() || branch.starts_with("refs/") {
            return None;
        }
        Some(Self {
            remote: default_remote.to_owned(),
            branch: branch.to_owned(),
        })
    }

    /// The remote-tracking ref this branch is fetched into.
    #[must_use]
    pub fn tracking_ref(&self) -> String {
        format!("{REMOTES_PREFIX}{}/{}", self.remote, self.branch)
    }

    /// A forced refspec that creates or updates [`tracking_ref`](Self::tracking_ref).
    #[must_use]
    pub fn refspec(&self) -> String {
        format!("+{HEADS_PREFIX}{}:{}", self.branch, self.tracking_ref())
    }
}

// ---------------------------------------------------------------------------
// Diff types
// ---------------------------------------------------------------------------

/// The kind of change detected between two commits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChangeType {
    /// File was added.
    Added,
    /// File content or mode was modified.
    Modified,
    /// File was deleted.
    Deleted,
    /// File type changed (e.g. regular file to symlink).
    TypeChanged,
}

/// A single file-level change between two commits.
///
/// Produced by [`GitRepo::diff_commits`](crate::GitRepo::diff_commits).
/// Renames are reported as a deletion plus an addition, so both paths show up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiffEntry {
    /// Path relative to the repository root.
    pub path: String,
    /// What kind of change occurred.
    pub change_type: ChangeType,
}

// ---------------------------------------------------------------------------
// Status types
// ---------------------------------------------------------------------------

/// The status of a single file in the working tree relative to HEAD.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FileStatus {
    /// File content differs from HEAD (staged or unstaged).
    Modified,
    /// File is tracked in the index but not in HEAD.
    Added,
    /// File is in HEAD but deleted from the index or the working tree.
    Deleted,
    /// File was renamed or copied in the index.
    Renamed,
    /// File has unresolved merge conflicts.
    Conflicted,
    /// File exists in the working tree but is not tracked.
    Untracked,
}

impl FileStatus {
    /// Return `true` for changes to tracked files, i.e. anything except
    /// [`FileStatus::Untracked`].
    #[must_use]
    pub const fn is_tracked_change(self) -> bool {
        !matches!(self, Self::Untracked)
    }
}

/// A single entry from `git status`, pairing a file path with its status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusEntry {
    /// Path relative to the repository root.
    pub path: String,
    /// The status of the file.
    pub status: FileStatus,
}

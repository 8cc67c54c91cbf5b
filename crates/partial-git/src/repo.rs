//! The [`GitRepo`] trait: the abstraction boundary between the change
//! detector and git.
//!
//! The trait is object-safe so callers can use `&dyn GitRepo` and tests can
//! swap in a double.
//!
//! | Group     | Methods                                        | Backend  |
//! |-----------|------------------------------------------------|----------|
//! | Location  | `workdir`                                      | gix      |
//! | Refs      | `head_ref`, `read_ref`, `rev_parse(_opt)`      | gix      |
//! | Ancestry  | `merge_base`                                   | gix      |
//! | Status    | `status`                                       | git CLI  |
//! | Diff      | `diff_commits`                                 | git CLI  |
//! | Checkout  | `checkout_branch`                              | git CLI  |
//! | Remote    | `fetch`                                        | git CLI  |

use std::path::Path;

use crate::error::GitError;
use crate::types::{DiffEntry, GitOid, RefName, StatusEntry};

/// The git interface used by the change detector.
pub trait GitRepo {
    // -----------------------------------------------------------------------
    // Location
    // -----------------------------------------------------------------------

    /// Root of the working tree (the directory containing `.git`).
    fn workdir(&self) -> &Path;

    // -----------------------------------------------------------------------
    // Refs
    //
    // Replaces: git symbolic-ref HEAD, git rev-parse <ref>
    // -----------------------------------------------------------------------

    /// The ref `HEAD` points at (e.g. `refs/heads/main`), or `None` when
    /// `HEAD` is detached.
    fn head_ref(&self) -> Result<Option<RefName>, GitError>;

    /// Resolve a ref to its OID, returning `None` if the ref does not exist.
    fn read_ref(&self, name: &RefName) -> Result<Option<GitOid>, GitError>;

    /// Resolve a revision specification to a commit OID.
    ///
    /// Returns [`GitError::NotFound`] if the spec cannot be resolved.
    fn rev_parse(&self, spec: &str) -> Result<GitOid, GitError>;

    /// Like [`rev_parse`](Self::rev_parse) but returns `None` instead of an
    /// error when the spec cannot be resolved.
    fn rev_parse_opt(&self, spec: &str) -> Result<Option<GitOid>, GitError>;

    // -----------------------------------------------------------------------
    // Ancestry
    //
    // Replaces: git merge-base <a> <b>
    // -----------------------------------------------------------------------

    /// Find the best common ancestor (merge base) of two commits.
    ///
    /// Returns `None` if the commits have no common ancestor.
    fn merge_base(&self, a: GitOid, b: GitOid) -> Result<Option<GitOid>, GitError>;

    // -----------------------------------------------------------------------
    // Status
    //
    // Replaces: git status --porcelain
    // -----------------------------------------------------------------------

    /// Every path that differs between `HEAD`, the index and the working
    /// tree, plus untracked files. Ignored files are not reported and
    /// untracked directories are expanded to the files inside them.
    fn status(&self) -> Result<Vec<StatusEntry>, GitError>;

    // -----------------------------------------------------------------------
    // Diff
    //
    // Replaces: git diff --name-status <old> <new>
    // -----------------------------------------------------------------------

    /// Files that differ between the trees of two commits.
    fn diff_commits(&self, old: GitOid, new: GitOid) -> Result<Vec<DiffEntry>, GitError>;

    // -----------------------------------------------------------------------
    // Checkout
    //
    // Replaces: git checkout <branch>
    // -----------------------------------------------------------------------

    /// Switch the working tree to `name`.
    ///
    /// Local branches are checked out as branches; any other ref detaches
    /// `HEAD`. Returns [`GitError::DirtyWorktree`] when local changes would
    /// be overwritten.
    fn checkout_branch(&self, name: &RefName) -> Result<(), GitError>;

    // -----------------------------------------------------------------------
    // Remote
    //
    // Replaces: git fetch <remote> <refspec>
    // -----------------------------------------------------------------------

    /// Fetch `refspec` from `remote`.
    fn fetch(&self, remote: &str, refspec: &str) -> Result<(), GitError>;
}

//! The gix-backed implementation of [`GitRepo`].

use std::path::{Path, PathBuf};

use crate::error::GitError;
use crate::repo::GitRepo;
use crate::types::{DiffEntry, GitOid, RefName, StatusEntry};

/// A [`GitRepo`] implementation backed by [gix](https://github.com/GitoxideLabs/gitoxide)
/// for ref and history reads, and by the `git` binary for working-tree and
/// network operations.
///
/// Construct via [`GixRepo::discover`].
pub struct GixRepo {
    pub(crate) repo: gix::Repository,
    pub(crate) workdir: PathBuf,
}

impl GixRepo {
    /// Open the git repository containing `path`, walking upward through
    /// parent directories until a `.git` is found. The working-tree root is
    /// canonicalized.
    ///
    /// # Errors
    /// Returns [`GitError::RepositoryNotFound`] when no repository encloses
    /// `path`, and [`GitError::BackendError`] for bare repositories.
    pub fn discover(path: &Path) -> Result<Self, GitError> {
        let start = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()?.join(path)
        };
        let repo = gix::discover(&start).map_err(|e| GitError::RepositoryNotFound {
            path: start.clone(),
            message: e.to_string(),
        })?;
        let workdir = repo
            .workdir()
            .map(Path::to_path_buf)
            .ok_or_else(|| GitError::BackendError {
                message: format!("repository at {} has no working tree", repo.git_dir().display()),
            })?;
        // Changed paths are reported as `workdir.join(rel)`, so the root
        // must be absolute and free of `..` segments.
        let workdir = std::fs::canonicalize(start.join(workdir))?;
        tracing::debug!(workdir = %workdir.display(), "discovered repository");
        Ok(Self { repo, workdir })
    }
}

impl GitRepo for GixRepo {
    fn workdir(&self) -> &Path {
        &self.workdir
    }

    // === Refs ===
    fn head_ref(&self) -> Result<Option<RefName>, GitError> {
        crate::refs_impl::head_ref(self)
    }

    fn read_ref(&self, name: &RefName) -> Result<Option<GitOid>, GitError> {
        crate::refs_impl::read_ref(self, name)
    }

    fn rev_parse(&self, spec: &str) -> Result<GitOid, GitError> {
        crate::refs_impl::rev_parse(self, spec)
    }

    fn rev_parse_opt(&self, spec: &str) -> Result<Option<GitOid>, GitError> {
        crate::refs_impl::rev_parse_opt(self, spec)
    }

    // === Ancestry ===
    fn merge_base(&self, a: GitOid, b: GitOid) -> Result<Option<GitOid>, GitError> {
        crate::refs_impl::merge_base(self, a, b)
    }

    // === Status ===
    fn status(&self) -> Result<Vec<StatusEntry>, GitError> {
        crate::status_impl::status(self)
    }

    // === Diff ===
    fn diff_commits(&self, old: GitOid, new: GitOid) -> Result<Vec<DiffEntry>, GitError> {
        crate::diff_impl::diff_commits(self, old, new)
    }

    // === Checkout ===
    fn checkout_branch(&self, name: &RefName) -> Result<(), GitError> {
        crate::checkout_impl::checkout_branch(self, name)
    }

    // === Remote ===
    fn fetch(&self, remote: &str, refspec: &str) -> Result<(), GitError> {
        crate::remote_impl::fetch(self, remote, refspec)
    }
}

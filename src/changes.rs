//! Change detection: which files differ between the working state and a
//! reference state.
//!
//! The detector runs exactly one [`ComparisonMode`]. Side effects (base
//! branch checkout, fetch) are logged at `info` so callers can tell the
//! working tree or the local refs were touched.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use partial_core::path::normalize;
use partial_git::{GitError, GitOid, GitRepo, RefName, RemoteBranch};

use crate::config::ComparisonMode;

// ---------------------------------------------------------------------------
// ChangedFiles
// ---------------------------------------------------------------------------

/// A deduplicated set of absolute, normalized paths under a repository root.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChangedFiles {
    root: PathBuf,
    paths: BTreeSet<PathBuf>,
}

impl ChangedFiles {
    /// An empty set rooted at `root`.
    #[must_use]
    pub fn new(root: &Path) -> Self {
        Self {
            root: normalize(root),
            paths: BTreeSet::new(),
        }
    }

    /// Add a path given relative to the repository root.
    pub fn insert_relative(&mut self, rel: &str) {
        self.paths.insert(normalize(&self.root.join(rel)));
    }

    /// The repository root every path lives under.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute paths in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }

    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.paths.contains(&normalize(path))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Drop every path whose root-relative form matches one of `patterns`.
    #[must_use]
    pub fn excluding(mut self, patterns: &[glob::Pattern]) -> Self {
        if patterns.is_empty() {
            return self;
        }
        let options = glob::MatchOptions {
            require_literal_separator: true,
            ..glob::MatchOptions::new()
        };
        let root = self.root.clone();
        self.paths.retain(|path| {
            let rel = path.strip_prefix(&root).unwrap_or(path);
            let excluded = patterns.iter().any(|p| p.matches_path_with(rel, options));
            if excluded {
                tracing::debug!(path = %rel.display(), "excluded changed file");
            }
            !excluded
        });
        self
    }
}

// ---------------------------------------------------------------------------
// ChangeError
// ---------------------------------------------------------------------------

/// Errors from change detection. All are fatal for the invocation.
#[derive(Debug)]
pub enum ChangeError {
    /// A git operation failed.
    Git(GitError),

    /// The comparison base does not resolve to a commit.
    BaseNotFound {
        /// The revision that was looked up.
        base: String,
    },

    /// `HEAD` and the base share no history.
    NoMergeBase {
        /// The base revision.
        base: String,
    },

    /// Fetching the reference branch failed and no local copy exists.
    FetchFailed {
        /// The tracking ref that was to be fetched.
        reference: String,
        /// The underlying fetch failure.
        source: GitError,
    },
}

impl fmt::Display for ChangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Git(e) => write!(f, "{e}"),
            Self::BaseNotFound { base } => write!(f, "base revision '{base}' not found"),
            Self::NoMergeBase { base } => {
                write!(f, "HEAD and '{base}' have no common ancestor")
            }
            Self::FetchFailed { reference, source } => {
                write!(f, "could not fetch '{reference}' and no local copy exists: {source}")
            }
        }
    }
}

impl std::error::Error for ChangeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Git(e) | Self::FetchFailed { source: e, .. } => Some(e),
            _ => None,
        }
    }
}

impl From<GitError> for ChangeError {
    fn from(e: GitError) -> Self {
        Self::Git(e)
    }
}

// ---------------------------------------------------------------------------
// ChangeDetector
// ---------------------------------------------------------------------------

/// Computes [`ChangedFiles`] for one [`ComparisonMode`].
pub struct ChangeDetector<'a, R: GitRepo + ?Sized> {
    repo: &'a R,
    mode: &'a ComparisonMode,
}

impl<'a, R: GitRepo + ?Sized> ChangeDetector<'a, R> {
    pub const fn new(repo: &'a R, mode: &'a ComparisonMode) -> Self {
        Self { repo, mode }
    }

    /// Run detection.
    ///
    /// # Errors
    /// Returns [`ChangeError`] on any git failure, a missing base, or a
    /// failed fetch without a usable local reference.
    pub fn detect(&self) -> Result<ChangedFiles, ChangeError> {
        let files = match self.mode {
            ComparisonMode::WorkingTree {
                uncommitted,
                untracked,
            } => self.working_tree(*uncommitted, *untracked)?,
            ComparisonMode::Branch { base, merge_base } => self.against_branch(base, *merge_base)?,
            ComparisonMode::FetchedReference {
                reference,
                merge_base,
            } => self.against_fetched(reference, *merge_base)?,
        };
        tracing::info!(count = files.len(), "detected changed files");
        Ok(files)
    }

    fn working_tree(&self, uncommitted: bool, untracked: bool) -> Result<ChangedFiles, ChangeError> {
        let mut files = ChangedFiles::new(self.repo.workdir());
        for entry in self.repo.status()? {
            let wanted = if entry.status.is_tracked_change() {
                uncommitted
            } else {
                untracked
            };
            if wanted {
                files.insert_relative(&entry.path);
            }
        }
        Ok(files)
    }

    fn against_branch(&self, base: &str, merge_base: bool) -> Result<ChangedFiles, ChangeError> {
        let head = self.repo.rev_parse("HEAD")?;
        let base_oid = self.resolve_base(base)?;
        if merge_base {
            return self.against_merge_base(head, base_oid, base);
        }
        self.checkout_base(base)?;
        self.diff(base_oid, head)
    }

    fn against_fetched(
        &self,
        reference: &RemoteBranch,
        merge_base: bool,
    ) -> Result<ChangedFiles, ChangeError> {
        let tracking = reference.tracking_ref();
        let refspec = reference.refspec();
        tracing::info!(
            remote = %reference.remote,
            refspec = %refspec,
            "fetching reference branch {tracking}"
        );
        if let Err(e) = self.repo.fetch(&reference.remote, &refspec) {
            if self.repo.rev_parse_opt(&tracking)?.is_some() {
                tracing::warn!(error = %e, reference = %tracking, "fetch failed, using local copy");
            } else {
                return Err(ChangeError::FetchFailed {
                    reference: tracking,
                    source: e,
                });
            }
        }

        let head = self.repo.rev_parse("HEAD")?;
        let base_oid = self.resolve_base(&tracking)?;
        if merge_base {
            self.against_merge_base(head, base_oid, &tracking)
        } else {
            self.diff(base_oid, head)
        }
    }

    fn against_merge_base(
        &self,
        head: GitOid,
        base_oid: GitOid,
        base: &str,
    ) -> Result<ChangedFiles, ChangeError> {
        let fork = self
            .repo
            .merge_base(head, base_oid)?
            .ok_or_else(|| ChangeError::NoMergeBase {
                base: base.to_owned(),
            })?;
        tracing::info!(merge_base = %fork, base = %base, "comparing against merge base {fork}");
        self.diff(fork, head)
    }

    fn resolve_base(&self, base: &str) -> Result<GitOid, ChangeError> {
        self.repo
            .rev_parse_opt(base)?
            .ok_or_else(|| ChangeError::BaseNotFound {
                base: base.to_owned(),
            })
    }

    /// Check out `base` unless it is already the current branch.
    ///
    /// Only names that resolve as refs are checked out. A raw commit id or a
    /// revision expression (`HEAD~1`, `main^`) is compared without touching
    /// the working tree.
    fn checkout_base(&self, base: &str) -> Result<(), ChangeError> {
        let Ok(target) = RefName::qualify(base) else {
            return Ok(());
        };
        if target.is_head() || self.repo.read_ref(&target)?.is_none() {
            return Ok(());
        }
        if self.repo.head_ref()?.as_ref() == Some(&target) {
            return Ok(());
        }
        tracing::info!(base = %target, "Checking out base branch {base}");
        self.repo.checkout_branch(&target)?;
        tracing::info!(base = %target, "Checked out base branch {base}");
        Ok(())
    }

    fn diff(&self, old: GitOid, new: GitOid) -> Result<ChangedFiles, ChangeError> {
        let mut files = ChangedFiles::new(self.repo.workdir());
        for entry in self.repo.diff_commits(old, new)? {
            files.insert_relative(&entry.path);
        }
        Ok(files)
    }
}

//! Top-level error type for a `partial` invocation.
//!
//! Every variant renders with a `To fix:` hint so the message is actionable
//! when it surfaces in CI logs.

use std::fmt;
use std::path::PathBuf;

use partial_git::GitError;

use crate::changes::ChangeError;
use crate::config::{CONFIG_PATH, ConfigError};
use crate::reactor::ReactorError;

// ---------------------------------------------------------------------------
// PartialError
// ---------------------------------------------------------------------------

/// Any failure that aborts the computation. No modules are selected when one
/// of these is returned.
#[derive(Debug)]
pub enum PartialError {
    /// Options are malformed or contradictory.
    Config(ConfigError),

    /// The reactor manifest could not be loaded.
    Reactor(ReactorError),

    /// The repository could not be opened.
    Repository(GitError),

    /// Change detection failed.
    Changes(ChangeError),

    /// Writing the result failed.
    Output {
        /// Destination that could not be written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

impl fmt::Display for PartialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(
                f,
                "configuration error: {e}\n  To fix: correct {CONFIG_PATH} or the command-line flags.\n  Exactly one comparison mode is needed: --uncommitted/--untracked, --base-branch, or --fetch-reference-branch with --reference-branch."
            ),
            Self::Reactor(e) => write!(
                f,
                "reactor error: {e}\n  To fix: check the [[module]] entries of the reactor manifest (or pass --reactor <path>)."
            ),
            Self::Repository(e) => write!(
                f,
                "not a usable git repository: {e}\n  To fix: run partial from inside a non-bare git working tree."
            ),
            Self::Changes(e) => {
                write!(f, "change detection failed: {e}")?;
                let hint = match e {
                    ChangeError::BaseNotFound { .. } => {
                        "check the base branch name, or fetch it first:\n    git fetch origin"
                    }
                    ChangeError::NoMergeBase { .. } => {
                        "the branches share no history; compare without --compare-to-merge-base."
                    }
                    ChangeError::FetchFailed { .. } => {
                        "check network access and the remote name:\n    git remote -v"
                    }
                    ChangeError::Git(GitError::DirtyWorktree { .. }) => {
                        "commit or stash local changes before comparing against a base branch:\n    git stash"
                    }
                    ChangeError::Git(_) => "check git state and retry. Run `git status` for details.",
                };
                write!(f, "\n  To fix: {hint}")
            }
            Self::Output { path, source } => write!(
                f,
                "could not write '{}': {source}\n  To fix: check that the directory exists and is writable.",
                path.display()
            ),
        }
    }
}

impl std::error::Error for PartialError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Reactor(e) => Some(e),
            Self::Repository(e) => Some(e),
            Self::Changes(e) => Some(e),
            Self::Output { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// From impls
// ---------------------------------------------------------------------------

impl From<ConfigError> for PartialError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<ReactorError> for PartialError {
    fn from(e: ReactorError) -> Self {
        Self::Reactor(e)
    }
}

impl From<ChangeError> for PartialError {
    fn from(e: ChangeError) -> Self {
        Self::Changes(e)
    }
}

//! Git read layer for partial-build.
//!
//! This crate defines the [`GitRepo`] trait: the single interface through
//! which the change detector talks to version control. Nothing outside this
//! crate imports gix or spawns `git` directly; callers program against the
//! trait and can substitute a test double.
//!
//! # Crate layout
//!
//! - [`repo`]: the [`GitRepo`] trait definition.
//! - [`types`]: value types used in trait signatures ([`GitOid`], [`RefName`],
//!   [`StatusEntry`], [`DiffEntry`], etc.).
//! - [`error`]: the [`GitError`] enum returned by all trait methods.
//!
//! Ref resolution and ancestry go through gix. Operations that touch the
//! working tree or the network (status, diff, checkout, fetch) shell out to
//! the `git` binary so they honour the user's git configuration.

pub mod error;
pub mod repo;
pub mod types;

mod checkout_impl;
mod cli;
mod diff_impl;
mod gix_repo;
mod refs_impl;
mod remote_impl;
mod status_impl;

pub use gix_repo::GixRepo;

pub use error::GitError;
pub use repo::GitRepo;
pub use types::{
    ChangeType, DiffEntry, FileStatus, GitOid, RefName, RefNameError,
    RemoteBranch, StatusEntry,
};

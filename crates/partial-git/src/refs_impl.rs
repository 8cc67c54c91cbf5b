//! gix-backed ref, rev-parse, and ancestry operations.

use crate::error::GitError;
use crate::gix_repo::GixRepo;
use crate::types::{GitOid, RefName};

fn backend(e: impl std::fmt::Display) -> GitError {
    GitError::BackendError {
        message: e.to_string(),
    }
}

/// Convert a `GitOid` to a `gix::ObjectId`.
fn to_gix_oid(oid: GitOid) -> gix::ObjectId {
    gix::ObjectId::from_bytes_or_panic(oid.as_bytes())
}

/// Convert a `gix::ObjectId` (or `&gix::oid`) to a `GitOid`.
fn from_gix_oid(oid: &gix::oid) -> Result<GitOid, GitError> {
    let bytes: [u8; 20] = oid.as_bytes().try_into().map_err(|_| GitError::InvalidOid {
        value: oid.to_string(),
        reason: "only SHA-1 object ids are supported".to_owned(),
    })?;
    Ok(GitOid::from_bytes(bytes))
}

pub fn head_ref(repo: &GixRepo) -> Result<Option<RefName>, GitError> {
    let name = repo.repo.head_name().map_err(backend)?;
    Ok(name.and_then(|full| RefName::new(&full.as_bstr().to_string()).ok()))
}

pub fn read_ref(repo: &GixRepo, name: &RefName) -> Result<Option<GitOid>, GitError> {
    // A name gix refuses as a ref cannot exist in the ref store.
    if gix::refs::FullName::try_from(name.as_str()).is_err() {
        return Ok(None);
    }
    match repo.repo.try_find_reference(name.as_str()) {
        Ok(Some(mut r)) => {
            let id = r.peel_to_id_in_place().map_err(backend)?.detach();
            Ok(Some(from_gix_oid(&id)?))
        }
        Ok(None) => Ok(None),
        Err(e) => Err(backend(e)),
    }
}

/// Specs are peeled to the commit they name, so annotated tags resolve to
/// the tagged commit rather than the tag object.
fn commit_spec(spec: &str) -> String {
    format!("{spec}^{{commit}}")
}

pub fn rev_parse(repo: &GixRepo, spec: &str) -> Result<GitOid, GitError> {
    let id = repo
        .repo
        .rev_parse_single(commit_spec(spec).as_str())
        .map_err(|e| GitError::NotFound {
            message: format!("rev-parse '{spec}': {e}"),
        })?
        .detach();
    from_gix_oid(&id)
}

pub fn rev_parse_opt(repo: &GixRepo, spec: &str) -> Result<Option<GitOid>, GitError> {
    // Every rev-parse failure is a resolution failure: malformed spec,
    // missing ref, unborn HEAD.
    match repo.repo.rev_parse_single(commit_spec(spec).as_str()) {
        Ok(id) => Ok(Some(from_gix_oid(&id.detach())?)),
        Err(_) => Ok(None),
    }
}

pub fn merge_base(repo: &GixRepo, a: GitOid, b: GitOid) -> Result<Option<GitOid>, GitError> {
    match repo.repo.merge_base(to_gix_oid(a), to_gix_oid(b)) {
        Ok(id) => Ok(Some(from_gix_oid(&id.detach())?)),
        Err(gix::repository::merge_base::Error::NotFound { .. }) => Ok(None),
        Err(e) => Err(backend(e)),
    }
}

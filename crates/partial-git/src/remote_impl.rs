//! Fetch via `git fetch`.

use crate::cli;
use crate::error::GitError;
use crate::gix_repo::GixRepo;

pub fn fetch(repo: &GixRepo, remote: &str, refspec: &str) -> Result<(), GitError> {
    let args = ["fetch", "--quiet", "--no-tags", remote, refspec];
    let output = cli::run(&repo.workdir, &args)?;
    if output.status.success() {
        Ok(())
    } else {
        Err(GitError::FetchFailed {
            remote: remote.to_owned(),
            message: cli::stderr_of(&output),
        })
    }
}

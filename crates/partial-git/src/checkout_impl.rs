//! Branch checkout via `git checkout`.

use crate::cli;
use crate::error::GitError;
use crate::gix_repo::GixRepo;
use crate::types::RefName;

pub fn checkout_branch(repo: &GixRepo, name: &RefName) -> Result<(), GitError> {
    let args: Vec<&str> = match name.local_branch() {
        Some(branch) => vec!["checkout", "--quiet", branch],
        None => vec!["checkout", "--quiet", "--detach", name.as_str()],
    };
    let output = cli::run(&repo.workdir, &args)?;
    if output.status.success() {
        return Ok(());
    }

    let stderr = cli::stderr_of(&output);
    if stderr.contains("would be overwritten") || stderr.contains("Please commit your changes") {
        return Err(GitError::DirtyWorktree {
            path: repo.workdir.clone(),
            message: stderr,
        });
    }
    if stderr.contains("did not match any") || stderr.contains("invalid reference") {
        return Err(GitError::NotFound {
            message: format!("branch '{name}': {stderr}"),
        });
    }
    Err(cli::command_failed(&args, &output))
}

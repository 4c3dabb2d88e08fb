//! Decides whether a path may be created on a branch by looking at both the
//! working copy and the remote branch.

use tracing::{info, warn};

use crate::error::AppError;
use crate::git::GitRepo;
use crate::workspace::branches::ensure_local_branch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    AlreadyExists,
    WasMissingLocally,
    LocalOnlyUnsynced,
    Eligible,
}

impl Reconciliation {
    pub fn decide(in_local: bool, in_remote: bool) -> Self {
        match (in_local, in_remote) {
            (true, true) => Self::AlreadyExists,
            (false, true) => Self::WasMissingLocally,
            (true, false) => Self::LocalOnlyUnsynced,
            (false, false) => Self::Eligible,
        }
    }

    /// The conflict reported for this outcome, `None` when creation may proceed
    pub fn rejection(self, branch: &str, file_path: &str) -> Option<AppError> {
        let message = match self {
            Self::AlreadyExists => {
                format!("File '{file_path}' already exists in branch '{branch}'")
            }
            Self::WasMissingLocally => format!(
                "File '{file_path}' exists in remote but was missing locally. Fetched from remote."
            ),
            Self::LocalOnlyUnsynced => format!(
                "File '{file_path}' exists locally but not in remote. Please sync first."
            ),
            Self::Eligible => return None,
        };
        Some(AppError::conflict(message))
    }
}

/// Check that `file_path` exists neither locally nor on `<remote>/<branch>`.
///
/// A file found only on the remote is brought into the working copy by
/// checking out and pulling `branch` before the conflict is reported.
pub fn check_file_existence(
    repo: &GitRepo,
    remote_name: &str,
    branch: &str,
    file_path: &str,
) -> Result<(), AppError> {
    repo.fetch(remote_name, Some(branch)).map_err(AppError::git)?;

    let remote_tip = repo
        .remote_branch_tip(remote_name, branch)
        .map_err(AppError::git)?;
    let in_remote = repo
        .list_tree_files(&remote_tip)
        .map_err(|e| AppError::conflict(format!("Error checking remote files: {e:#}")))?
        .iter()
        .any(|path| path == file_path);
    let in_local = repo.path().join(file_path).exists();

    let outcome = Reconciliation::decide(in_local, in_remote);
    info!(branch, file_path, in_local, in_remote, ?outcome, "checked file existence");

    if outcome == Reconciliation::WasMissingLocally {
        ensure_local_branch(repo, remote_name, branch)?;
        repo.checkout_branch(branch).map_err(AppError::git)?;
        repo.pull(remote_name, Some(branch)).map_err(AppError::git)?;
        warn!(branch, file_path, "file was missing locally, pulled from remote");
    }

    match outcome.rejection(branch, file_path) {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

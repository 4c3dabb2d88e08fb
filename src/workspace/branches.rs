use tracing::info;

use crate::error::AppError;
use crate::git::{CommitInfo, FileChange, GitRepo};
use crate::workspace::branch::{check_format, validate_branch_name, NEW_BRANCH_PREFIX};

/// Make sure `branch` exists locally, creating it from `<remote>/<branch>` if needed
pub(crate) fn ensure_local_branch(
    repo: &GitRepo,
    remote_name: &str,
    branch: &str,
) -> Result<(), AppError> {
    if repo.branch_exists_local(branch) {
        return Ok(());
    }

    if !repo.branch_exists_remote(remote_name, branch) {
        return Err(AppError::not_found(format!(
            "Branch '{branch}' not found locally or on '{remote_name}'"
        )));
    }

    repo.fetch(remote_name, Some(branch)).map_err(AppError::git)?;
    repo.create_tracking_branch(remote_name, branch)
        .map_err(AppError::git)?;
    info!(branch, remote = remote_name, "created local branch from remote");

    Ok(())
}

pub fn list_branches(repo: &GitRepo) -> Result<Vec<String>, AppError> {
    let branches = repo.get_all_branches().map_err(AppError::git)?;
    if branches.is_empty() {
        return Err(AppError::not_found("No branches found in the repository"));
    }
    Ok(branches)
}

/// Every commit reachable from the tip of `branch`, newest first
pub fn branch_commits(
    repo: &GitRepo,
    remote_name: &str,
    branch: &str,
) -> Result<Vec<CommitInfo>, AppError> {
    let tip = repo
        .branch_or_remote_tip(remote_name, branch)
        .map_err(AppError::git)?;
    let commits = repo.list_commits_from(tip.id()).map_err(AppError::git)?;

    if commits.is_empty() {
        return Err(AppError::not_found(format!(
            "No commits found for branch '{branch}'"
        )));
    }
    Ok(commits)
}

/// Files that differ between the tips of `old_branch` and `new_branch`
pub fn compare_branches(
    repo: &GitRepo,
    remote_name: &str,
    old_branch: &str,
    new_branch: &str,
) -> Result<Vec<FileChange>, AppError> {
    let old_tip = repo
        .branch_or_remote_tip(remote_name, old_branch)
        .map_err(AppError::git)?;
    let new_tip = repo
        .branch_or_remote_tip(remote_name, new_branch)
        .map_err(AppError::git)?;

    let changes = repo
        .compare_commits(&old_tip, &new_tip)
        .map_err(AppError::git)?;
    if changes.is_empty() {
        return Err(AppError::not_found(
            "No changes found between the specified branches",
        ));
    }
    Ok(changes)
}

/// Result of [`create_branch`]
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedBranch {
    pub new_branch: String,
    pub source_branch: String,
}

/// Create `v_/<new_version>` from the branch `source_version` resolves to and
/// check it out.
pub fn create_branch(
    repo: &GitRepo,
    remote_name: &str,
    new_version: &str,
    source_version: &str,
) -> Result<CreatedBranch, AppError> {
    check_format(new_version)?;
    let new_branch = format!("{NEW_BRANCH_PREFIX}{new_version}");

    let source_branch = validate_branch_name(repo, remote_name, source_version)?;
    ensure_local_branch(repo, remote_name, &source_branch)?;

    if repo.branch_exists_local(&new_branch) || repo.branch_exists_remote(remote_name, &new_branch)
    {
        return Err(AppError::conflict(format!(
            "Branch '{new_branch}' already exists locally or remotely."
        )));
    }

    repo.checkout_branch(&source_branch)
        .map_err(AppError::git)?;
    repo.create_branch_from(&new_branch, &source_branch)
        .map_err(AppError::git)?;
    repo.checkout_branch(&new_branch).map_err(AppError::git)?;

    info!(%new_branch, %source_branch, "created branch");

    Ok(CreatedBranch {
        new_branch,
        source_branch,
    })
}

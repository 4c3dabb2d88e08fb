use anyhow::{Context, Error};
use git2::{BranchType, Commit};

use crate::git::repository::core::GitRepo;

impl GitRepo {
    pub fn get_all_branches(&self) -> Result<Vec<String>, Error> {
        let mut branches = Vec::new();

        let branch_iter = self.repo().branches(Some(BranchType::Local))?;

        for branch in branch_iter {
            let (branch, _) = branch?;
            if let Some(name) = branch.name()? {
                branches.push(name.to_string());
            }
        }

        Ok(branches)
    }

    /// Remote-tracking branches of `remote_name`, without the `<remote>/` prefix
    pub fn get_remote_branches(&self, remote_name: &str) -> Result<Vec<String>, Error> {
        let prefix = format!("{remote_name}/");
        let mut branches = Vec::new();

        let branch_iter = self
            .repo()
            .branches(Some(BranchType::Remote))
            .context("Failed to list remote branches")?;

        for branch in branch_iter {
            let (branch, _) = branch?;
            let Some(name) = branch.name()? else {
                continue;
            };
            if let Some(short) = name.strip_prefix(&prefix) {
                // origin/HEAD is a symbolic pointer, not a branch
                if short != "HEAD" {
                    branches.push(short.to_string());
                }
            }
        }

        Ok(branches)
    }

    pub fn branch_exists_local(&self, branch_name: &str) -> bool {
        self.repo()
            .find_branch(branch_name, BranchType::Local)
            .is_ok()
    }

    pub fn branch_exists_remote(&self, remote_name: &str, branch_name: &str) -> bool {
        self.repo()
            .find_branch(&format!("{remote_name}/{branch_name}"), BranchType::Remote)
            .is_ok()
    }

    /// Resolve the tip commit of a local branch
    pub(crate) fn branch_tip(&self, branch_name: &str) -> Result<Commit<'_>, Error> {
        let branch_ref = format!("refs/heads/{branch_name}");
        self.repo()
            .revparse_single(&branch_ref)
            .context(format!("Failed to find branch '{branch_name}'"))?
            .peel_to_commit()
            .context(format!("Branch '{branch_name}' does not point to a commit"))
    }

    /// Resolve the tip of a local branch, falling back to `<remote>/<branch>`
    pub(crate) fn branch_or_remote_tip(
        &self,
        remote_name: &str,
        branch_name: &str,
    ) -> Result<Commit<'_>, Error> {
        if self.branch_exists_local(branch_name) {
            return self.branch_tip(branch_name);
        }

        self.remote_branch_tip(remote_name, branch_name)
    }

    /// Resolve the tip of the remote-tracking branch `<remote>/<branch>`
    pub(crate) fn remote_branch_tip(
        &self,
        remote_name: &str,
        branch_name: &str,
    ) -> Result<Commit<'_>, Error> {
        let remote_ref = format!("refs/remotes/{remote_name}/{branch_name}");
        self.repo()
            .revparse_single(&remote_ref)
            .context(format!(
                "Branch '{branch_name}' not found on '{remote_name}'"
            ))?
            .peel_to_commit()
            .context("Failed to get remote branch commit")
    }

    /// Create a new branch from the current HEAD and switch to it
    pub fn create_and_checkout_branch(&self, branch_name: &str) -> Result<(), Error> {
        match self.repo().head() {
            Ok(head) => {
                let target_commit = head.target().context("Failed to get HEAD target")?;

                let commit = self
                    .repo()
                    .find_commit(target_commit)
                    .context("Failed to find HEAD commit")?;

                self.repo()
                    .branch(branch_name, &commit, false)
                    .context("Failed to create branch")?;

                self.repo()
                    .set_head(&format!("refs/heads/{branch_name}"))
                    .context("Failed to set HEAD to new branch")?;
            }
            Err(_) => {
                // No commits yet: HEAD becomes an unborn branch
                self.repo()
                    .set_head(&format!("refs/heads/{branch_name}"))
                    .context("Failed to set HEAD to new branch")?;
            }
        }

        Ok(())
    }

    /// Create `new_branch` pointing at the tip of the local branch `source_branch`
    pub fn create_branch_from(&self, new_branch: &str, source_branch: &str) -> Result<(), Error> {
        let source_commit = self.branch_tip(source_branch)?;

        self.repo()
            .branch(new_branch, &source_commit, false)
            .context(format!(
                "Failed to create branch '{new_branch}' from '{source_branch}'"
            ))?;

        Ok(())
    }

    /// Create a local branch from `<remote>/<branch>` and make it track the remote
    pub fn create_tracking_branch(&self, remote_name: &str, branch_name: &str) -> Result<(), Error> {
        let remote_ref = format!("refs/remotes/{remote_name}/{branch_name}");
        let commit = self
            .repo()
            .revparse_single(&remote_ref)
            .context(format!("Remote branch '{remote_name}/{branch_name}' not found"))?
            .peel_to_commit()
            .context("Failed to get remote branch commit")?;

        let mut branch = self
            .repo()
            .branch(branch_name, &commit, false)
            .context(format!("Failed to create local branch '{branch_name}'"))?;

        branch
            .set_upstream(Some(&format!("{remote_name}/{branch_name}")))
            .context("Failed to set upstream")?;

        Ok(())
    }

    pub fn checkout_branch(&self, branch_name: &str) -> Result<(), Error> {
        let branch_ref = format!("refs/heads/{branch_name}");
        let obj = self
            .repo()
            .revparse_single(&branch_ref)
            .context(format!("Failed to find branch '{branch_name}'"))?;

        if !self.is_bare() {
            self.repo()
                .checkout_tree(&obj, None)
                .context(format!("Failed to checkout branch '{branch_name}'"))?;
        }

        self.repo()
            .set_head(&branch_ref)
            .context("Failed to set HEAD to branch")?;

        Ok(())
    }

    pub fn get_head_symbolic_target(&self) -> Result<String, Error> {
        let head_ref = self
            .repo()
            .find_reference("HEAD")
            .context("Failed to find HEAD reference")?;

        match head_ref.symbolic_target() {
            Some(target) => Ok(target.to_string()),
            None => Err(anyhow::anyhow!("HEAD is not a symbolic reference")),
        }
    }

    /// Get the current branch name
    pub fn get_current_branch(&self) -> Result<String, Error> {
        let head_target = self
            .get_head_symbolic_target()
            .context("Failed to get current branch from HEAD")?;

        let branch_name = head_target
            .strip_prefix("refs/heads/")
            .ok_or_else(|| anyhow::anyhow!("HEAD is not pointing to a branch"))?;

        Ok(branch_name.to_string())
    }
}

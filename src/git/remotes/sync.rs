use anyhow::{Context, Error};
use git2::FetchOptions;

use crate::git::repository::core::GitRepo;

impl GitRepo {
    /// Fetch changes from a remote repository
    pub fn fetch(&self, remote_name: &str, branch_name: Option<&str>) -> Result<String, Error> {
        let mut remote = self
            .repo()
            .find_remote(remote_name)
            .context(format!("Remote '{remote_name}' not found"))?;

        let refspecs = match branch_name {
            Some(branch) => {
                vec![format!(
                    "refs/heads/{branch}:refs/remotes/{remote_name}/{branch}"
                )]
            }
            None => {
                // Remote's default refspecs
                let refspecs = remote
                    .fetch_refspecs()
                    .context("Failed to get remote refspecs")?;

                refspecs.iter().flatten().map(str::to_string).collect()
            }
        };

        let refspecs: Vec<&str> = refspecs.iter().map(|s| s.as_str()).collect();

        let mut fetch_options = FetchOptions::new();
        fetch_options.remote_callbacks(self.remote_callbacks()?);

        remote
            .fetch(&refspecs, Some(&mut fetch_options), None)
            .context(format!("Failed to fetch from remote '{remote_name}'"))?;

        let stats = remote.stats();
        let received_objects = stats.received_objects();
        let total_objects = stats.total_objects();

        if received_objects > 0 {
            Ok(format!(
                "Fetched {received_objects}/{total_objects} objects from {remote_name}"
            ))
        } else {
            Ok("Already up-to-date".to_string())
        }
    }

    /// Fetch `branch_name` and fast-forward the checked-out branch to it.
    ///
    /// Diverged histories are reported as an error; nothing is merged.
    pub fn pull(&self, remote_name: &str, branch_name: Option<&str>) -> Result<String, Error> {
        let target_branch = match branch_name {
            Some(branch) => branch.to_string(),
            None => self
                .get_current_branch()
                .context("Failed to get current branch")?,
        };

        self.fetch(remote_name, Some(&target_branch))
            .context("Failed to fetch from remote")?;

        let remote_branch = format!("{remote_name}/{target_branch}");
        let remote_ref = format!("refs/remotes/{remote_branch}");
        let remote_commit = self
            .repo()
            .revparse_single(&remote_ref)
            .context(format!(
                "Remote branch '{remote_branch}' not found after fetch"
            ))?
            .peel_to_commit()
            .context("Failed to get remote commit")?;

        let head_commit = self
            .repo()
            .head()
            .context("Failed to get HEAD")?
            .peel_to_commit()
            .context("Failed to get current commit")?;

        if head_commit.id() == remote_commit.id() {
            return Ok("Already up-to-date".to_string());
        }

        let merge_base = self
            .repo()
            .merge_base(head_commit.id(), remote_commit.id())
            .context("Failed to find merge base")?;

        if merge_base == remote_commit.id() {
            // Local branch is ahead of remote
            return Ok("Already up-to-date".to_string());
        }

        if merge_base != head_commit.id() {
            return Err(anyhow::anyhow!(
                "Local branch has diverged from '{remote_branch}'; resolve manually"
            ));
        }

        let current_branch_name = self
            .get_current_branch()
            .context("Failed to get current branch")?;

        self.repo()
            .reference(
                &format!("refs/heads/{current_branch_name}"),
                remote_commit.id(),
                true,
                "Fast-forward pull",
            )
            .context("Failed to update branch reference")?;

        if !self.is_bare() {
            let remote_tree = remote_commit.tree().context("Failed to get remote tree")?;
            let mut checkout_opts = git2::build::CheckoutBuilder::new();
            checkout_opts.force();
            self.repo()
                .checkout_tree(remote_tree.as_object(), Some(&mut checkout_opts))
                .context("Failed to checkout remote tree")?;
        }

        Ok(format!(
            "Fast-forward pull: {remote_commit_id}",
            remote_commit_id = remote_commit.id()
        ))
    }
}

use anyhow::{Context, Error};
use git2::{Cred, CredentialType, PushOptions, RemoteCallbacks};

use crate::git::repository::core::GitRepo;

impl GitRepo {
    /// Add a remote repository
    #[cfg(test)]
    pub fn add_remote(&self, name: &str, url: &str) -> Result<(), Error> {
        self.repo()
            .remote(name, url)
            .context(format!("Failed to add remote '{name}' with URL '{url}'"))?;

        Ok(())
    }

    /// Credentials come from the ssh agent or the configured git credential helper
    pub(crate) fn remote_callbacks(&self) -> Result<RemoteCallbacks<'static>, Error> {
        let config = self
            .repo()
            .config()
            .context("Failed to get repository config")?;

        let mut callbacks = RemoteCallbacks::new();
        callbacks.credentials(move |url, username_from_url, allowed| {
            if allowed.contains(CredentialType::SSH_KEY) {
                if let Some(username) = username_from_url {
                    return Cred::ssh_key_from_agent(username);
                }
            }
            if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) {
                return Cred::credential_helper(&config, url, username_from_url);
            }
            Cred::default()
        });

        Ok(callbacks)
    }

    /// Push a branch to remote (equivalent to `git push <remote> <branch>`)
    ///
    /// # Arguments
    /// * `remote_name` - The name of the remote (e.g., "origin")
    /// * `branch_name` - The name of the branch to push (e.g., "v/1.2")
    pub fn push(&self, remote_name: &str, branch_name: &str) -> Result<(), Error> {
        let mut remote = self
            .repo()
            .find_remote(remote_name)
            .context(format!("Failed to find remote '{remote_name}'"))?;

        let refspec = format!("refs/heads/{branch_name}:refs/heads/{branch_name}");

        let mut callbacks = self.remote_callbacks()?;
        // A rejected ref is reported here rather than as an error from push()
        callbacks.push_update_reference(|refname, status| match status {
            Some(message) => Err(git2::Error::from_str(&format!(
                "remote rejected '{refname}': {message}"
            ))),
            None => Ok(()),
        });

        let mut push_options = PushOptions::new();
        push_options.remote_callbacks(callbacks);

        remote
            .push(&[&refspec], Some(&mut push_options))
            .context(format!(
                "Failed to push branch '{branch_name}' to remote '{remote_name}'"
            ))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        git::GitRepo,
        test_utils::{create_test_bare_repo, create_test_repo, RepoTestOperations},
    };

    #[test]
    fn add_remote_works() {
        let temp_dir = assert_fs::TempDir::new().unwrap();
        let repo = GitRepo::init(temp_dir.path()).unwrap();

        repo.add_remote("origin", "https://url1").unwrap();

        let remote = repo.repo().find_remote("origin").unwrap();
        assert_eq!(remote.url(), Some("https://url1"));
        assert!(repo.add_remote("origin", "https://url2").is_err());
    }

    #[test]
    #[cfg(all(feature = "https", feature = "ssh"))]
    fn network_transports_are_built_in() {
        let version = git2::Version::get();

        assert!(version.https());
        assert!(version.ssh());
    }

    #[test]
    fn push_works() {
        let (_remote_dir, remote_repo) = create_test_bare_repo();
        assert_eq!(remote_repo.get_all_branches().unwrap().len(), 0);

        let (_local_dir, local_repo) = create_test_repo();
        local_repo
            .add_file_and_commit("test.txt", "content", "Initial commit")
            .unwrap();
        local_repo.add_local_remote("origin", &remote_repo).unwrap();

        local_repo.push("origin", "master").unwrap();

        assert_eq!(remote_repo.get_all_branches().unwrap(), vec!["master"]);
    }

    #[test]
    fn push_branch_with_slash_works() {
        let (_remote_dir, remote_repo) = create_test_bare_repo();
        let (_local_dir, local_repo) = create_test_repo();
        local_repo
            .add_file_and_commit("test.txt", "content", "Initial commit")
            .unwrap();
        local_repo.create_and_checkout_branch("v_/2.1.0").unwrap();
        local_repo.add_local_remote("origin", &remote_repo).unwrap();

        local_repo.push("origin", "v_/2.1.0").unwrap();

        assert_eq!(remote_repo.get_all_branches().unwrap(), vec!["v_/2.1.0"]);
    }

    #[test]
    fn push_to_unknown_remote_fails() {
        let (_local_dir, local_repo) = create_test_repo();
        local_repo
            .add_file_and_commit("test.txt", "content", "Initial commit")
            .unwrap();

        assert!(local_repo.push("nonexistent", "master").is_err());
    }
}

use crate::git::GitRepo;
use anyhow::{Context, Error};

/// Create a new temporary repository for testing with user config set up
#[cfg(test)]
pub fn create_test_repo() -> (assert_fs::TempDir, GitRepo) {
    let temp_dir = assert_fs::TempDir::new().unwrap();
    let path = temp_dir.path();
    let repo = GitRepo::init(path).unwrap();
    repo.set_user_config("Test User", "test@example.com")
        .unwrap();
    (temp_dir, repo)
}

/// Create a new temporary bare repository for testing
#[cfg(test)]
pub fn create_test_bare_repo() -> (assert_fs::TempDir, GitRepo) {
    let temp_dir = assert_fs::TempDir::new().unwrap();
    let path = temp_dir.path();
    let repo = GitRepo::init_bare(path).unwrap();
    repo.set_user_config("Test User", "test@example.com")
        .unwrap();
    (temp_dir, repo)
}

/// A working repository wired to a bare `origin`, with `branches` created from
/// an initial commit and pushed. HEAD is left on `master`.
#[cfg(test)]
pub fn create_test_repo_with_origin(
    branches: &[&str],
) -> (assert_fs::TempDir, assert_fs::TempDir, GitRepo) {
    let (remote_dir, remote_repo) = create_test_bare_repo();
    let (local_dir, local_repo) = create_test_repo();

    local_repo
        .add_file_and_commit("README.md", "records", "Initial commit")
        .unwrap();
    local_repo.add_local_remote("origin", &remote_repo).unwrap();
    local_repo.push("origin", "master").unwrap();

    for branch in branches {
        local_repo.create_branch_from(branch, "master").unwrap();
        local_repo.push("origin", branch).unwrap();
    }
    local_repo.fetch("origin", None).unwrap();

    (local_dir, remote_dir, local_repo)
}

/// Test-only trait that adds assertion methods to GitRepo
#[cfg(test)]
pub trait RepoAssertions {
    /// Assert that HEAD's symbolic target matches the expected value
    fn assert_head_symbolic_target(&self, expected_target: &str) -> &Self;

    /// Assert that the current branch matches the expected branch name
    fn assert_current_branch(&self, branch_name: &str) -> &Self;

    /// Assert that a file exists in the repository
    fn assert_file_exists(&self, filename: &str) -> &Self;

    /// Assert that a file does not exist in the repository
    fn assert_file_not_exists(&self, filename: &str) -> &Self;

    /// Assert that commit messages match the expected order (newest first)
    fn assert_commit_messages(&self, expected_messages: &[&str]) -> &Self;
}

/// Test-only trait that adds test helper operations to GitRepo
#[cfg(test)]
pub trait RepoTestOperations {
    /// Write a file (creating parent folders) with content (fluent)
    fn add_file(&self, filename: &str, content: &str) -> Result<&Self, Error>;

    /// Add a file and commit in one operation (fluent)
    fn add_file_and_commit(
        &self,
        filename: &str,
        content: &str,
        commit_message: &str,
    ) -> Result<&Self, Error>;

    /// Add a remote pointing to another local GitRepo
    fn add_local_remote(&self, name: &str, other_repo: &GitRepo) -> Result<(), Error>;

    /// Commit staged changes (fluent wrapper that ignores return value)
    fn commit_fluent(&self, message: &str) -> Result<&Self, Error>;

    /// Create and checkout a branch (fluent wrapper)
    fn create_and_checkout_branch_fluent(&self, branch_name: &str) -> Result<&Self, Error>;

    /// Checkout a branch (fluent wrapper)
    fn checkout_branch_fluent(&self, branch_name: &str) -> Result<&Self, Error>;

    /// Delete a local branch
    fn delete_local_branch(&self, branch_name: &str) -> Result<(), Error>;
}

#[cfg(test)]
impl RepoAssertions for GitRepo {
    fn assert_head_symbolic_target(&self, expected_target: &str) -> &Self {
        match self.get_head_symbolic_target() {
            Ok(actual_target) => {
                if actual_target != expected_target {
                    panic!(
                        "HEAD symbolic target mismatch. Expected: '{expected_target}', Found: '{actual_target}'"
                    );
                }
            }
            Err(e) => {
                panic!("Failed to get HEAD symbolic target: {e}");
            }
        }
        self
    }

    fn assert_current_branch(&self, branch_name: &str) -> &Self {
        let expected_target = format!("refs/heads/{branch_name}");
        self.assert_head_symbolic_target(&expected_target);
        self
    }

    fn assert_file_exists(&self, filename: &str) -> &Self {
        let file_path = self.path().join(filename);
        if !file_path.exists() {
            panic!("Expected file '{filename}' to exist at path: {file_path:?}");
        }
        self
    }

    fn assert_file_not_exists(&self, filename: &str) -> &Self {
        let file_path = self.path().join(filename);
        if file_path.exists() {
            panic!("Expected file '{filename}' to not exist at path: {file_path:?}");
        }
        self
    }

    fn assert_commit_messages(&self, expected_messages: &[&str]) -> &Self {
        let commits = self.list_commits().unwrap_or_else(|_| Vec::new());

        if commits.len() != expected_messages.len() {
            panic!(
                "Expected {} commits, but found {}. Commits: {:?}",
                expected_messages.len(),
                commits.len(),
                commits.iter().map(|c| &c.message).collect::<Vec<_>>()
            );
        }

        for (i, (commit, expected)) in commits.iter().zip(expected_messages.iter()).enumerate() {
            if commit.message != *expected {
                panic!(
                    "Commit {} message mismatch. Expected: '{}', Found: '{}'",
                    i, expected, commit.message
                );
            }
        }

        self
    }
}

#[cfg(test)]
impl RepoTestOperations for GitRepo {
    fn add_file(&self, filename: &str, content: &str) -> Result<&Self, Error> {
        let file_path = self.path().join(filename);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)
                .context(format!("Failed to create parent folder for '{filename}'"))?;
        }
        std::fs::write(file_path, content)?;
        Ok(self)
    }

    fn add_file_and_commit(
        &self,
        filename: &str,
        content: &str,
        commit_message: &str,
    ) -> Result<&Self, Error> {
        self.add_file(filename, content)?
            .add(&[filename])?
            .commit_fluent(commit_message)?;

        Ok(self)
    }

    fn add_local_remote(&self, name: &str, other_repo: &GitRepo) -> Result<(), Error> {
        let remote_path = other_repo
            .path()
            .to_str()
            .context("Failed to convert remote repository path to string")?;

        self.add_remote(name, remote_path)
    }

    fn commit_fluent(&self, message: &str) -> Result<&Self, Error> {
        self.commit(message)?;
        Ok(self)
    }

    fn create_and_checkout_branch_fluent(&self, branch_name: &str) -> Result<&Self, Error> {
        self.create_and_checkout_branch(branch_name)?;
        Ok(self)
    }

    fn checkout_branch_fluent(&self, branch_name: &str) -> Result<&Self, Error> {
        self.checkout_branch(branch_name)?;
        Ok(self)
    }

    fn delete_local_branch(&self, branch_name: &str) -> Result<(), Error> {
        let mut branch = self
            .repo()
            .find_branch(branch_name, git2::BranchType::Local)
            .context(format!("Failed to find branch '{branch_name}'"))?;
        branch
            .delete()
            .context(format!("Failed to delete branch '{branch_name}'"))
    }
}

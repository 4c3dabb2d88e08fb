use std::path::Path;

use anyhow::{Context, Error};
use chrono::{DateTime, FixedOffset};
use git2::{
    Commit, ErrorCode, Index, IndexEntry, IndexTime, ObjectType, Oid, Sort, TreeWalkMode,
    TreeWalkResult,
};

use crate::git::repository::core::{CommitInfo, GitRepo};

/// Render a commit time the way `git log --date=iso` does
fn format_git_time(time: git2::Time) -> String {
    let offset = FixedOffset::east_opt(time.offset_minutes() * 60);
    let utc = DateTime::from_timestamp(time.seconds(), 0);

    match (offset, utc) {
        (Some(offset), Some(utc)) => utc
            .with_timezone(&offset)
            .format("%Y-%m-%d %H:%M:%S %z")
            .to_string(),
        _ => time.seconds().to_string(),
    }
}

impl GitRepo {
    fn commit_info(commit: &Commit<'_>) -> CommitInfo {
        CommitInfo {
            hash: commit.id().to_string(),
            author: commit.author().name().unwrap_or("").to_string(),
            date: format_git_time(commit.time()),
            message: commit.summary().unwrap_or("").to_string(),
        }
    }

    /// History reachable from HEAD, newest first
    #[cfg(test)]
    pub fn list_commits(&self) -> Result<Vec<CommitInfo>, Error> {
        match self.repo().head() {
            Ok(head) => {
                let target = head.target().context("Failed to get HEAD target")?;
                self.list_commits_from(target)
            }
            // No commits in repository
            Err(_) => Ok(Vec::new()),
        }
    }

    /// History reachable from `tip`, newest first
    pub fn list_commits_from(&self, tip: Oid) -> Result<Vec<CommitInfo>, Error> {
        let mut revwalk = self.repo().revwalk().context("Failed to create revwalk")?;

        revwalk
            .set_sorting(Sort::TOPOLOGICAL | Sort::TIME)
            .context("Failed to set sorting")?;
        revwalk.push(tip).context("Failed to push tip commit")?;

        let mut commits = Vec::new();

        for oid in revwalk {
            let oid = oid.context("Failed to get commit OID")?;
            let commit = self
                .repo()
                .find_commit(oid)
                .context("Failed to find commit")?;

            commits.push(Self::commit_info(&commit));
        }

        Ok(commits)
    }

    pub fn add(&self, pathspecs: &[&str]) -> Result<&Self, Error> {
        let mut index = self
            .repo()
            .index()
            .context("Failed to get repository index")?;

        index
            .add_all(pathspecs, git2::IndexAddOption::DEFAULT, None)
            .context("Failed to add files to index")?;

        index.write().context("Failed to write index")?;

        Ok(self)
    }

    /// Commit the index on top of HEAD and advance HEAD
    pub fn commit(&self, message: &str) -> Result<String, Error> {
        let signature = self
            .create_signature()
            .context("Failed to create signature")?;

        let mut index = self
            .repo()
            .index()
            .context("Failed to get repository index")?;

        let tree_id = index
            .write_tree()
            .context("Failed to write tree from index")?;

        let tree = self
            .repo()
            .find_tree(tree_id)
            .context("Failed to find tree")?;

        let parent_commit = match self.repo().head() {
            Ok(head) => {
                let target = head.target().context("Failed to get HEAD target")?;
                Some(
                    self.repo()
                        .find_commit(target)
                        .context("Failed to find parent commit")?,
                )
            }
            Err(_) => None, // First commit, no parent
        };

        let parents: Vec<_> = parent_commit.iter().collect();

        let commit_id = self
            .repo()
            .commit(
                Some("HEAD"),
                &signature,
                &signature,
                message,
                &tree,
                &parents,
            )
            .context("Failed to create commit")?;

        Ok(commit_id.to_string())
    }

    /// Commit `contents` as `relative_path` onto `branch_name` without
    /// checking the branch out or touching the working tree.
    ///
    /// The tree is built in a scratch index seeded from the branch tip, so
    /// the new commit differs from the tip by exactly that one path and
    /// nothing is left staged if any step fails. Returns the new commit hash.
    pub fn commit_file_on_branch(
        &self,
        branch_name: &str,
        relative_path: &str,
        contents: &[u8],
        message: &str,
    ) -> Result<String, Error> {
        let tip = self.branch_tip(branch_name)?;
        let tip_tree = tip.tree().context("Failed to get branch tree")?;

        let blob_id = self
            .repo()
            .blob(contents)
            .context(format!("Failed to write blob for '{relative_path}'"))?;

        let mut index = Index::new().context("Failed to create scratch index")?;
        index
            .read_tree(&tip_tree)
            .context("Failed to seed index from branch tree")?;
        index
            .add(&IndexEntry {
                ctime: IndexTime::new(0, 0),
                mtime: IndexTime::new(0, 0),
                dev: 0,
                ino: 0,
                mode: 0o100644,
                uid: 0,
                gid: 0,
                file_size: u32::try_from(contents.len()).unwrap_or(u32::MAX),
                id: blob_id,
                flags: 0,
                flags_extended: 0,
                path: relative_path.as_bytes().to_vec(),
            })
            .context(format!("Failed to stage '{relative_path}'"))?;

        let tree_id = index
            .write_tree_to(self.repo())
            .context("Failed to write tree from index")?;
        let tree = self
            .repo()
            .find_tree(tree_id)
            .context("Failed to find tree")?;

        let signature = self
            .create_signature()
            .context("Failed to create signature")?;

        let commit_id = self
            .repo()
            .commit(
                Some(&format!("refs/heads/{branch_name}")),
                &signature,
                &signature,
                message,
                &tree,
                &[&tip],
            )
            .context(format!("Failed to commit onto '{branch_name}'"))?;

        Ok(commit_id.to_string())
    }

    /// Every blob path in the tree of `commit`, relative to the repository root
    pub fn list_tree_files(&self, commit: &Commit<'_>) -> Result<Vec<String>, Error> {
        let tree = commit.tree().context("Failed to get commit tree")?;
        let mut files = Vec::new();

        tree.walk(TreeWalkMode::PreOrder, |root, entry| {
            if entry.kind() == Some(ObjectType::Blob) {
                if let Some(name) = entry.name() {
                    files.push(format!("{root}{name}"));
                }
            }
            TreeWalkResult::Ok
        })
        .context("Failed to walk commit tree")?;

        Ok(files)
    }

    /// Raw bytes of `relative_path` at `commit`, or `None` if the path is absent
    pub fn read_file_at(
        &self,
        commit: &Commit<'_>,
        relative_path: &str,
    ) -> Result<Option<Vec<u8>>, Error> {
        let tree = commit.tree().context("Failed to get commit tree")?;

        let entry = match tree.get_path(Path::new(relative_path)) {
            Ok(entry) => entry,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(e).context(format!("Failed to look up '{relative_path}'")),
        };

        let blob = entry
            .to_object(self.repo())
            .context("Failed to load tree entry")?
            .peel_to_blob()
            .context(format!("'{relative_path}' is not a file"))?;

        Ok(Some(blob.content().to_vec()))
    }
}

use anyhow::{Context, Error};
use git2::{Commit, Patch};
use serde::Serialize;

use crate::git::repository::core::GitRepo;

/// One file that differs between two commits
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileChange {
    pub file_path: String,
    pub old_text: String,
    pub new_text: String,
    /// 1-based line numbers in `new_text`
    pub added_lines: Vec<u32>,
    /// 1-based line numbers in `old_text`
    pub removed_lines: Vec<u32>,
}

/// Line numbers added to `new` and removed from `old`
fn changed_lines(old: &[u8], new: &[u8]) -> Result<(Vec<u32>, Vec<u32>), Error> {
    let patch =
        Patch::from_buffers(old, None, new, None, None).context("Failed to diff file contents")?;

    let mut added = Vec::new();
    let mut removed = Vec::new();

    for hunk in 0..patch.num_hunks() {
        let lines = patch
            .num_lines_in_hunk(hunk)
            .context("Failed to read diff hunk")?;
        for index in 0..lines {
            let line = patch
                .line_in_hunk(hunk, index)
                .context("Failed to read diff line")?;
            match line.origin() {
                '+' => added.extend(line.new_lineno()),
                '-' => removed.extend(line.old_lineno()),
                _ => {}
            }
        }
    }

    Ok((added, removed))
}

impl GitRepo {
    /// Files that differ between the trees of `old` and `new`, with both versions
    /// of each file. A side on which the file does not exist reads as empty.
    pub fn compare_commits(
        &self,
        old: &Commit<'_>,
        new: &Commit<'_>,
    ) -> Result<Vec<FileChange>, Error> {
        let old_tree = old.tree().context("Failed to get old tree")?;
        let new_tree = new.tree().context("Failed to get new tree")?;

        let diff = self
            .repo()
            .diff_tree_to_tree(Some(&old_tree), Some(&new_tree), None)
            .context("Failed to diff trees")?;

        let paths: Vec<String> = diff
            .deltas()
            .filter_map(|delta| {
                delta
                    .new_file()
                    .path()
                    .or_else(|| delta.old_file().path())
                    .and_then(|p| p.to_str())
                    .map(str::to_string)
            })
            .collect();

        let mut changes = Vec::with_capacity(paths.len());
        for file_path in paths {
            let old_bytes = self.read_file_at(old, &file_path)?.unwrap_or_default();
            let new_bytes = self.read_file_at(new, &file_path)?.unwrap_or_default();
            let (added_lines, removed_lines) = changed_lines(&old_bytes, &new_bytes)?;

            changes.push(FileChange {
                old_text: String::from_utf8_lossy(&old_bytes).into_owned(),
                new_text: String::from_utf8_lossy(&new_bytes).into_owned(),
                file_path,
                added_lines,
                removed_lines,
            });
        }

        Ok(changes)
    }
}

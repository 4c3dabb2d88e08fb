//! Git operations module
//!
//! This module provides a domain-driven structure for Git operations:
//!
//! - `repository`: Core repository operations (init, open, signatures)
//! - `branches`: Branch operations (create, checkout, list local and remote)
//! - `commits`: Commit operations (add, commit, commit onto a branch, tree reads)
//! - `remotes`: Remote operations (add, push, fetch, pull)
//! - `diff`: Comparing the trees of two commits

pub mod branches;
pub mod commits;
pub mod diff;
pub mod remotes;
pub mod repository;

pub use diff::operations::FileChange;
pub use repository::core::{CommitInfo, GitRepo, Identity};

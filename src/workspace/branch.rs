//! Version-style branch names.
//!
//! Clients send bare versions such as `1.2` or `1.2.3`; the repository keeps
//! them under `v/<version>` or the older `v_/<version>` prefix.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::AppError;
use crate::git::GitRepo;

static VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d+\.\d+(\.\d+)?$").expect("version pattern is a valid regex")
});

/// Prefixes tried in order when resolving a version to a branch.
pub const BRANCH_PREFIXES: [&str; 2] = ["v/", "v_/"];

/// Prefix given to branches created through the API.
pub const NEW_BRANCH_PREFIX: &str = "v_/";

pub fn check_format(version: &str) -> Result<(), AppError> {
    if VERSION_PATTERN.is_match(version) {
        Ok(())
    } else {
        Err(AppError::InvalidFormat(
            "Branch format must be X.Y or X.Y.Z (e.g., 1.2 or 1.2.3)".to_string(),
        ))
    }
}

pub fn candidates(version: &str) -> Vec<String> {
    BRANCH_PREFIXES
        .iter()
        .map(|prefix| format!("{prefix}{version}"))
        .collect()
}

/// Pick the first candidate for `version` present in `existing`
pub fn resolve_branch<S: AsRef<str>>(version: &str, existing: &[S]) -> Result<String, AppError> {
    check_format(version)?;

    let candidates = candidates(version);
    candidates
        .iter()
        .find(|candidate| existing.iter().any(|b| b.as_ref() == candidate.as_str()))
        .cloned()
        .ok_or_else(|| {
            AppError::not_found(format!(
                "No matching branch found (checked: {})",
                candidates.join(", ")
            ))
        })
}

/// Resolve `version` against the local and `remote_name` branches of `repo`
pub fn validate_branch_name(
    repo: &GitRepo,
    remote_name: &str,
    version: &str,
) -> Result<String, AppError> {
    check_format(version)?;

    let mut existing = repo.get_all_branches().map_err(AppError::git)?;
    existing.extend(
        repo.get_remote_branches(remote_name)
            .map_err(AppError::git)?,
    );

    resolve_branch(version, &existing)
}

use std::path::{Component, Path};

use crate::error::AppError;

fn is_blank_or_null(value: &str) -> bool {
    value.is_empty() || value.eq_ignore_ascii_case("null")
}

/// Paths must be plain relative paths inside the repository root
fn escapes_root(value: &str) -> bool {
    Path::new(value)
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
}

/// `.git` names the repository's own metadata, never a tracked file
pub fn is_git_dir_name(name: &str) -> bool {
    name.eq_ignore_ascii_case(".git")
}

fn touches_git_dir(value: &str) -> bool {
    Path::new(value).components().any(|c| match c {
        Component::Normal(name) => name.to_str().map_or(true, is_git_dir_name),
        _ => false,
    })
}

/// Check that `file_path` names an existing file under `repo_root`.
///
/// The path is returned unchanged.
pub fn validate_file_path(file_path: &str, repo_root: &Path) -> Result<String, AppError> {
    if !file_path.is_empty() && file_path.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::InvalidPath(
            "File path cannot be a number".to_string(),
        ));
    }

    if is_blank_or_null(file_path) {
        return Err(AppError::InvalidPath(
            "File path cannot be empty or null".to_string(),
        ));
    }

    if escapes_root(file_path) {
        return Err(AppError::InvalidPath(format!(
            "File path '{file_path}' must be relative to the repository"
        )));
    }

    if touches_git_dir(file_path) {
        return Err(AppError::InvalidPath(format!(
            "File path '{file_path}' must not point into the .git directory"
        )));
    }

    let full_path = repo_root.join(file_path);
    if !full_path.exists() {
        return Err(AppError::not_found(format!(
            "File '{file_path}' does not exist in the repository"
        )));
    }

    Ok(file_path.to_string())
}

/// Check that `folder_path` names an existing folder under `repo_root`.
///
/// Digit-only folder names are allowed.
pub fn validate_folder_path(folder_path: &str, repo_root: &Path) -> Result<String, AppError> {
    if is_blank_or_null(folder_path) {
        return Err(AppError::InvalidPath(
            "Folder path cannot be empty or null".to_string(),
        ));
    }

    if escapes_root(folder_path) {
        return Err(AppError::InvalidPath(format!(
            "Folder path '{folder_path}' must be relative to the repository"
        )));
    }

    if touches_git_dir(folder_path) {
        return Err(AppError::InvalidPath(format!(
            "Folder path '{folder_path}' must not point into the .git directory"
        )));
    }

    let full_path = repo_root.join(folder_path);
    if !full_path.exists() {
        return Err(AppError::not_found(format!(
            "Folder '{folder_path}' does not exist in the repository"
        )));
    }

    Ok(folder_path.to_string())
}

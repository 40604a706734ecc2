//! Common filesystem utilities

use crate::core::error::RecipeError;
use std::path::Path;

/// Ensure a file's parent directory exists.
pub fn ensure_parent_dir(path: &Path) -> Result<(), RecipeError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Remove a directory tree. A missing directory is not an error.
///
/// Returns whether anything was removed.
pub fn remove_dir_if_exists(path: &Path) -> Result<bool, RecipeError> {
    match std::fs::remove_dir_all(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(RecipeError::Io(e)),
    }
}

/// Copy a file, creating parent directories as needed.
pub fn copy_file(src: &Path, dest: &Path) -> Result<u64, RecipeError> {
    if !src.is_file() {
        return Err(RecipeError::MissingFile(src.to_path_buf()));
    }
    ensure_parent_dir(dest)?;
    Ok(std::fs::copy(src, dest)?)
}

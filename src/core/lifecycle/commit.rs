//! Staged packaging
//!
//! waf installs into `<workdir>/.stage`. The package directory is replaced
//! by the stage only after every step succeeded. A failed run removes the
//! stage and leaves the package directory as it was.
//!
//! The package directory may be user-supplied, so it is only ever replaced
//! when it is missing, empty, or holds a `manifest.json` from an earlier run.

use crate::core::error::RecipeError;
use crate::core::manifest::MANIFEST_FILE;
use crate::helpers::internal::fs_utils;
use std::io::ErrorKind;
use std::path::Path;
use walkdir::WalkDir;

/// Create an empty staging directory, dropping leftovers of an earlier run.
pub fn create_staging_dir(stage_dir: &Path) -> Result<(), RecipeError> {
    fs_utils::remove_dir_if_exists(stage_dir)?;
    std::fs::create_dir_all(stage_dir)?;
    Ok(())
}

/// Remove the staging directory without committing.
pub fn cleanup_staging_dir(stage_dir: &Path) {
    let _ = std::fs::remove_dir_all(stage_dir);
}

/// Fail unless `package_dir` is safe to replace.
pub fn check_package_dir(package_dir: &Path) -> Result<(), RecipeError> {
    let meta = match std::fs::symlink_metadata(package_dir) {
        Ok(meta) => meta,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };
    if !meta.is_dir() {
        return Err(RecipeError::PackageDirInUse(package_dir.to_path_buf()));
    }
    if package_dir.join(MANIFEST_FILE).is_file() {
        return Ok(());
    }
    if std::fs::read_dir(package_dir)?.next().is_none() {
        return Ok(());
    }
    Err(RecipeError::PackageDirInUse(package_dir.to_path_buf()))
}

/// Replace `package_dir` with the contents of `stage_dir`.
///
/// The stage is consumed. On error the stage is left intact.
pub fn commit_package(stage_dir: &Path, package_dir: &Path) -> Result<(), RecipeError> {
    check_package_dir(package_dir)?;
    fs_utils::remove_dir_if_exists(package_dir)?;
    fs_utils::ensure_parent_dir(package_dir)?;

    if std::fs::rename(stage_dir, package_dir).is_ok() {
        return Ok(());
    }

    // Cross-filesystem: copy then delete
    copy_tree(stage_dir, package_dir)?;
    cleanup_staging_dir(stage_dir);
    Ok(())
}

fn copy_tree(src: &Path, dest: &Path) -> Result<(), RecipeError> {
    std::fs::create_dir_all(dest)?;

    for entry in WalkDir::new(src).min_depth(1) {
        let entry = entry.map_err(|e| RecipeError::Io(e.into()))?;
        let rel = entry.path().strip_prefix(src).map_err(|_| {
            RecipeError::Config(format!("unexpected path {}", entry.path().display()))
        })?;
        let target = dest.join(rel);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            std::fs::create_dir_all(&target)?;
        } else if file_type.is_symlink() {
            let link = std::fs::read_link(entry.path())?;
            #[cfg(unix)]
            std::os::unix::fs::symlink(&link, &target)?;
            #[cfg(not(unix))]
            std::fs::copy(entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_dirs() -> (TempDir, std::path::PathBuf, std::path::PathBuf) {
        let dir = TempDir::new().unwrap();
        let stage = dir.path().join(".stage");
        let package = dir.path().join("package");
        std::fs::create_dir_all(stage.join("lib")).unwrap();
        std::fs::create_dir_all(stage.join("include/serd-0/serd")).unwrap();
        std::fs::write(stage.join("lib/libserd-0.a"), "ar").unwrap();
        std::fs::write(stage.join("include/serd-0/serd/serd.h"), "h").unwrap();
        std::fs::write(stage.join(MANIFEST_FILE), "{}").unwrap();
        (dir, stage, package)
    }

    #[test]
    fn test_check_package_dir_accepts_missing_empty_and_own() {
        let (_dir, _stage, package) = create_test_dirs();
        check_package_dir(&package).unwrap();

        std::fs::create_dir_all(&package).unwrap();
        check_package_dir(&package).unwrap();

        std::fs::write(package.join(MANIFEST_FILE), "{}").unwrap();
        std::fs::write(package.join("stale.txt"), "old").unwrap();
        check_package_dir(&package).unwrap();
    }

    #[test]
    fn test_check_package_dir_refuses_foreign_contents() {
        let (_dir, _stage, package) = create_test_dirs();
        std::fs::create_dir_all(&package).unwrap();
        std::fs::write(package.join("important.txt"), "keep me").unwrap();

        let err = check_package_dir(&package).unwrap_err();
        assert!(matches!(err, RecipeError::PackageDirInUse(ref p) if p == &package));
    }

    #[test]
    fn test_check_package_dir_refuses_file() {
        let (_dir, _stage, package) = create_test_dirs();
        std::fs::write(&package, "not a dir").unwrap();
        assert!(check_package_dir(&package).is_err());
    }

    #[test]
    fn test_commit_replaces_previous_package() {
        let (_dir, stage, package) = create_test_dirs();
        std::fs::create_dir_all(&package).unwrap();
        std::fs::write(package.join(MANIFEST_FILE), "{\"old\": true}").unwrap();
        std::fs::write(package.join("stale.txt"), "old").unwrap();

        commit_package(&stage, &package).unwrap();

        assert!(!stage.exists());
        assert!(!package.join("stale.txt").exists());
        assert!(package.join("lib/libserd-0.a").is_file());
        assert_eq!(std::fs::read_to_string(package.join(MANIFEST_FILE)).unwrap(), "{}");
    }

    #[test]
    fn test_commit_creates_parent_dirs() {
        let (dir, stage, _package) = create_test_dirs();
        let package = dir.path().join("out/nested/serd");

        commit_package(&stage, &package).unwrap();
        assert!(package.join("include/serd-0/serd/serd.h").is_file());
    }

    #[test]
    fn test_commit_refuses_foreign_dir_and_keeps_stage() {
        let (_dir, stage, package) = create_test_dirs();
        std::fs::create_dir_all(&package).unwrap();
        std::fs::write(package.join("important.txt"), "keep me").unwrap();

        assert!(commit_package(&stage, &package).is_err());
        assert_eq!(
            std::fs::read_to_string(package.join("important.txt")).unwrap(),
            "keep me"
        );
        assert!(stage.join("lib/libserd-0.a").is_file());
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_tree_keeps_symlinks() {
        let (dir, stage, _package) = create_test_dirs();
        std::os::unix::fs::symlink("libserd-0.a", stage.join("lib/libserd.a")).unwrap();
        let dest = dir.path().join("copy");

        copy_tree(&stage, &dest).unwrap();

        assert!(dest.join("include/serd-0/serd/serd.h").is_file());
        assert_eq!(
            std::fs::read_link(dest.join("lib/libserd.a")).unwrap(),
            std::path::PathBuf::from("libserd-0.a")
        );
    }

    #[test]
    fn test_create_staging_dir_drops_leftovers() {
        let (_dir, stage, _package) = create_test_dirs();
        create_staging_dir(&stage).unwrap();
        assert!(stage.is_dir());
        assert_eq!(std::fs::read_dir(&stage).unwrap().count(), 0);
    }
}

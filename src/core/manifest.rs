//! Package manifest
//!
//! Written to `<package>/manifest.json` after packaging. Records what was
//! built (recipe, version, settings, options), the exported metadata, and a
//! digest of every packaged file.

use crate::core::error::RecipeError;
use crate::core::lifecycle::PackageInfo;
use crate::core::recipe::{Recipe, RecipeContext};
use crate::core::settings::{Options, Settings};
use crate::helpers::acquire::{HashAlgorithm, hash_file};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const MANIFEST_FILE: &str = "manifest.json";

/// Identity of a binary package: digest over settings and options.
///
/// Call after configuration adjustment so removed C++ fields do not split ids.
pub fn package_id(settings: &Settings, options: &Options) -> Result<String, RecipeError> {
    let canonical = serde_json::to_vec(&(settings, options))
        .map_err(|e| RecipeError::Config(format!("cannot serialize settings: {}", e)))?;
    Ok(hex::encode(Sha256::digest(&canonical)))
}

/// Contents of `manifest.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageManifest {
    pub name: String,
    pub version: String,
    pub package_id: String,
    pub settings: Settings,
    pub options: Options,
    pub cpp_info: PackageInfo,
    /// Relative path → `sha256:<hex>` for files, `symlink:<target>` for links
    pub files: BTreeMap<String, String>,
}

impl PackageManifest {
    /// Build the manifest by scanning the package tree at `root`.
    pub fn collect(
        recipe: &Recipe,
        ctx: &RecipeContext,
        info: &PackageInfo,
        root: &Path,
    ) -> Result<Self, RecipeError> {
        Ok(Self {
            name: recipe.name.to_string(),
            version: ctx.version.clone(),
            package_id: package_id(&ctx.settings, &ctx.options)?,
            settings: ctx.settings.clone(),
            options: ctx.options,
            cpp_info: info.clone(),
            files: scan_files(root)?,
        })
    }

    pub fn write(&self, root: &Path) -> Result<PathBuf, RecipeError> {
        let path = root.join(MANIFEST_FILE);
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| RecipeError::Config(format!("cannot serialize manifest: {}", e)))?;
        std::fs::write(&path, json + "\n")?;
        Ok(path)
    }

    pub fn load(path: &Path) -> Result<Self, RecipeError> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| RecipeError::Config(format!("invalid manifest {}: {}", path.display(), e)))
    }
}

fn scan_files(root: &Path) -> Result<BTreeMap<String, String>, RecipeError> {
    let mut files = BTreeMap::new();

    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| RecipeError::Io(e.into()))?;
        let rel = entry
            .path()
            .strip_prefix(root)
            .map_err(|_| RecipeError::Config(format!("unexpected path {}", entry.path().display())))?;
        let key = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if key == MANIFEST_FILE {
            continue;
        }

        let file_type = entry.file_type();
        if file_type.is_symlink() {
            let target = std::fs::read_link(entry.path())?;
            files.insert(key, format!("symlink:{}", target.display()));
        } else if file_type.is_file() {
            let digest = hash_file(entry.path(), HashAlgorithm::Sha256)?;
            files.insert(key, format!("sha256:{}", digest));
        }
    }

    Ok(files)
}

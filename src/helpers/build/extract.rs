//! Archive extraction
//!
//! Native extraction of tar (plain, gz, xz, bz2, zst) and zip archives, with
//! optional strip-root: every member must sit under one common top-level
//! directory, which is dropped from the extracted paths.

use crate::core::error::RecipeError;
use crate::core::output;
use crate::helpers::internal::progress;
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Component, Path, PathBuf};

/// Supported archive formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    TarGz,
    TarXz,
    TarBz2,
    TarZst,
    Tar,
    Zip,
}

impl ArchiveFormat {
    /// Detect format from a file name extension.
    pub fn detect(file_name: &str) -> Option<Self> {
        let name = file_name.to_lowercase();
        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(Self::TarGz)
        } else if name.ends_with(".tar.xz") || name.ends_with(".txz") {
            Some(Self::TarXz)
        } else if name.ends_with(".tar.bz2") || name.ends_with(".tbz2") {
            Some(Self::TarBz2)
        } else if name.ends_with(".tar.zst") || name.ends_with(".tzst") {
            Some(Self::TarZst)
        } else if name.ends_with(".zip") {
            Some(Self::Zip)
        } else if name.ends_with(".tar") {
            Some(Self::Tar)
        } else {
            None
        }
    }
}

// ============================================================================
// Path safety
// ============================================================================

fn normalize_lexical(path: &Path) -> PathBuf {
    // Lexical only, no filesystem access; used to check link targets
    // without following symlinks.
    let mut out = PathBuf::new();
    let mut has_root = false;

    for c in path.components() {
        match c {
            Component::Prefix(p) => {
                out.clear();
                out.push(p.as_os_str());
                has_root = true;
            }
            Component::RootDir => {
                out.push(Component::RootDir.as_os_str());
                has_root = true;
            }
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = out
                    .components()
                    .next_back()
                    .is_some_and(|last| matches!(last, Component::Normal(_)));
                if popped {
                    out.pop();
                } else if !has_root {
                    out.push("..");
                }
            }
            Component::Normal(seg) => out.push(seg),
        }
    }

    out
}

fn ensure_safe_member_path(path: &Path) -> Result<(), RecipeError> {
    if path.is_absolute()
        || path
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_) | Component::RootDir))
    {
        return Err(RecipeError::Archive(format!(
            "archive contains unsafe path: {}",
            path.display()
        )));
    }
    Ok(())
}

fn ensure_no_symlink_components(dest: &Path, full_path: &Path) -> Result<(), RecipeError> {
    let rel = full_path.strip_prefix(dest).map_err(|_| {
        RecipeError::Archive(format!(
            "archive contains path outside destination: {}",
            full_path.display()
        ))
    })?;

    let mut cur = dest.to_path_buf();
    for comp in rel.components() {
        cur.push(comp);
        if let Ok(md) = std::fs::symlink_metadata(&cur)
            && md.file_type().is_symlink()
        {
            return Err(RecipeError::Archive(format!(
                "extraction blocked: symlink in path component: {}",
                cur.display()
            )));
        }
    }

    Ok(())
}

fn ensure_link_target_within_dest(
    dest: &Path,
    link_parent: &Path,
    link_name: &Path,
) -> Result<(), RecipeError> {
    if link_name.is_absolute()
        || link_name
            .components()
            .any(|c| matches!(c, Component::Prefix(_) | Component::RootDir))
    {
        return Err(RecipeError::Archive(format!(
            "archive contains unsafe link target (absolute): {}",
            link_name.display()
        )));
    }

    let candidate = normalize_lexical(&link_parent.join(link_name));
    let norm_dest = normalize_lexical(dest);
    if candidate.strip_prefix(&norm_dest).is_err() {
        return Err(RecipeError::Archive(format!(
            "archive contains unsafe link target (escapes dest): {} -> {}",
            link_parent.display(),
            link_name.display()
        )));
    }

    Ok(())
}

// ============================================================================
// Strip root
// ============================================================================

/// Drops the common top-level directory from member paths.
struct RootStripper {
    enabled: bool,
    root: Option<OsString>,
}

impl RootStripper {
    fn new(enabled: bool) -> Self {
        Self {
            enabled,
            root: None,
        }
    }

    /// Map a member path to its extraction path relative to dest.
    ///
    /// `None` means the member is skipped (the root directory itself, or `.`).
    fn strip(&mut self, path: &Path, is_dir: bool) -> Result<Option<PathBuf>, RecipeError> {
        let mut comps = path.components().filter(|c| !matches!(c, Component::CurDir));

        if !self.enabled {
            let rel: PathBuf = comps.collect();
            return Ok((!rel.as_os_str().is_empty()).then_some(rel));
        }

        let first = match comps.next() {
            Some(Component::Normal(seg)) => seg.to_os_string(),
            Some(_) => {
                return Err(RecipeError::Archive(format!(
                    "archive contains unsafe path: {}",
                    path.display()
                )));
            }
            None => return Ok(None),
        };

        match &self.root {
            None => self.root = Some(first),
            Some(root) if *root == first => {}
            Some(root) => {
                return Err(RecipeError::Archive(format!(
                    "cannot strip root: archive has more than one top-level entry ('{}' and '{}')",
                    root.to_string_lossy(),
                    first.to_string_lossy()
                )));
            }
        }

        let rest: PathBuf = comps.collect();
        if rest.as_os_str().is_empty() {
            if !is_dir {
                return Err(RecipeError::Archive(format!(
                    "cannot strip root: top-level entry '{}' is not a directory",
                    path.display()
                )));
            }
            return Ok(None);
        }
        Ok(Some(rest))
    }

    /// Strip a hard link target, which names another member of the archive.
    fn strip_link_target(&self, link: &Path) -> Result<PathBuf, RecipeError> {
        let mut comps = link.components().filter(|c| !matches!(c, Component::CurDir));
        if !self.enabled {
            return Ok(comps.collect());
        }

        let matches_root = match (comps.next(), &self.root) {
            (Some(Component::Normal(seg)), Some(root)) => seg == root.as_os_str(),
            _ => false,
        };
        if !matches_root {
            return Err(RecipeError::Archive(format!(
                "hard link target outside archive root: {}",
                link.display()
            )));
        }
        Ok(comps.collect())
    }
}

// ============================================================================
// Format implementations
// ============================================================================

fn archive_err(context: &'static str) -> impl Fn(std::io::Error) -> RecipeError {
    move |e| RecipeError::Archive(format!("{}: {}", context, e))
}

/// Extract a tar stream with optional decompression already applied
fn extract_tar<R: Read>(reader: R, dest: &Path, strip_root: bool) -> Result<(), RecipeError> {
    let mut archive = tar::Archive::new(reader);
    let mut stripper = RootStripper::new(strip_root);

    for entry in archive.entries().map_err(archive_err("tar read error"))? {
        let mut entry = entry.map_err(archive_err("tar entry error"))?;
        let entry_type = entry.header().entry_type();

        // Metadata-only members carry no files
        if entry_type.is_pax_global_extensions()
            || entry_type.is_pax_local_extensions()
            || entry_type.is_gnu_longname()
            || entry_type.is_gnu_longlink()
        {
            continue;
        }

        let member = entry.path().map_err(archive_err("tar path error"))?.into_owned();
        ensure_safe_member_path(&member)?;

        let Some(rel) = stripper.strip(&member, entry_type.is_dir())? else {
            continue;
        };
        let full_path = dest.join(&rel);
        ensure_no_symlink_components(dest, &full_path)?;

        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        if entry_type.is_dir() {
            std::fs::create_dir_all(&full_path)?;
            continue;
        }

        if entry_type.is_hard_link() {
            let link = entry
                .link_name()
                .map_err(archive_err("tar link_name error"))?
                .ok_or_else(|| {
                    RecipeError::Archive(format!("hardlink without target: {}", member.display()))
                })?
                .into_owned();
            ensure_safe_member_path(&link)?;
            let target = dest.join(stripper.strip_link_target(&link)?);
            ensure_no_symlink_components(dest, &target)?;
            if full_path.exists() {
                std::fs::remove_file(&full_path)?;
            }
            std::fs::hard_link(&target, &full_path)?;
            continue;
        }

        if entry_type.is_symlink() {
            let link = entry
                .link_name()
                .map_err(archive_err("tar link_name error"))?
                .ok_or_else(|| {
                    RecipeError::Archive(format!("symlink without target: {}", member.display()))
                })?
                .into_owned();
            let link_parent = full_path.parent().unwrap_or(dest);
            ensure_link_target_within_dest(dest, link_parent, &link)?;
        }

        entry
            .unpack(&full_path)
            .map_err(|e| RecipeError::Archive(format!("unpack error for {}: {}", member.display(), e)))?;
    }

    Ok(())
}

fn open_buffered(archive_path: &Path) -> Result<BufReader<File>, RecipeError> {
    let file = File::open(archive_path).map_err(|e| {
        RecipeError::Archive(format!("cannot open {}: {}", archive_path.display(), e))
    })?;
    Ok(BufReader::new(file))
}

/// Extract a zip archive
fn extract_zip(archive_path: &Path, dest: &Path, strip_root: bool) -> Result<(), RecipeError> {
    let file = File::open(archive_path).map_err(|e| {
        RecipeError::Archive(format!("cannot open {}: {}", archive_path.display(), e))
    })?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| RecipeError::Archive(format!("zip read error: {}", e)))?;
    let mut stripper = RootStripper::new(strip_root);

    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .map_err(|e| RecipeError::Archive(format!("zip entry error: {}", e)))?;

        let Some(member) = file.enclosed_name() else {
            return Err(RecipeError::Archive(format!(
                "archive contains unsafe path: {}",
                file.name()
            )));
        };

        let Some(rel) = stripper.strip(&member, file.is_dir())? else {
            continue;
        };
        let outpath = dest.join(rel);
        ensure_no_symlink_components(dest, &outpath)?;

        if file.is_dir() {
            std::fs::create_dir_all(&outpath)?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut outfile = File::create(&outpath)?;
        std::io::copy(&mut file, &mut outfile)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = file.unix_mode() {
                std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode & 0o7777))?;
            }
        }
    }

    Ok(())
}

// ============================================================================
// Public API
// ============================================================================

/// Extract an archive, detecting its format from the file name.
pub fn extract(archive: &Path, dest: &Path, strip_root: bool) -> Result<(), RecipeError> {
    let name = archive
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let format = ArchiveFormat::detect(&name)
        .ok_or_else(|| RecipeError::UnsupportedFormat(archive.display().to_string()))?;

    extract_with_format(archive, dest, format, strip_root)
}

/// Extract an archive with an explicit format.
pub fn extract_with_format(
    archive: &Path,
    dest: &Path,
    format: ArchiveFormat,
    strip_root: bool,
) -> Result<(), RecipeError> {
    std::fs::create_dir_all(dest)?;

    let filename = archive
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "archive".to_string());

    let pb = progress::create_spinner(&format!("extracting {}", filename));

    let result = match format {
        ArchiveFormat::TarGz => open_buffered(archive)
            .and_then(|r| extract_tar(flate2::read::GzDecoder::new(r), dest, strip_root)),
        ArchiveFormat::TarXz => open_buffered(archive)
            .and_then(|r| extract_tar(xz2::read::XzDecoder::new(r), dest, strip_root)),
        ArchiveFormat::TarBz2 => open_buffered(archive)
            .and_then(|r| extract_tar(bzip2::read::BzDecoder::new(r), dest, strip_root)),
        ArchiveFormat::TarZst => open_buffered(archive).and_then(|r| {
            let decoder = zstd::stream::read::Decoder::new(r)
                .map_err(|e| RecipeError::Archive(format!("zstd init error: {}", e)))?;
            extract_tar(decoder, dest, strip_root)
        }),
        ArchiveFormat::Tar => open_buffered(archive).and_then(|r| extract_tar(r, dest, strip_root)),
        ArchiveFormat::Zip => extract_zip(archive, dest, strip_root),
    };

    pb.finish_and_clear();

    result?;
    output::detail(&format!("extracted {} to {}", filename, dest.display()));
    Ok(())
}

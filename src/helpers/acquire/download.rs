//! Download helpers for acquiring source archives
//!
//! Archives are streamed into a temporary file next to their final location
//! and only moved into place once the body was read completely.

use crate::core::error::RecipeError;
use crate::core::output;
use crate::core::sources::SourceEntry;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use super::super::internal::fs_utils;
use super::super::internal::progress::{self, upgrade_to_bytes};

/// Default HTTP timeout in seconds
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

const USER_AGENT: &str = concat!("serd-recipe/", env!("CARGO_PKG_VERSION"));

/// Get HTTP timeout from `RECIPE_HTTP_TIMEOUT` or use default.
/// Only reads the environment once.
fn http_timeout() -> Duration {
    static TIMEOUT: OnceLock<Duration> = OnceLock::new();
    *TIMEOUT.get_or_init(|| {
        let secs = std::env::var("RECIPE_HTTP_TIMEOUT")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);
        Duration::from_secs(secs.clamp(5, 300))
    })
}

/// File name used to store a URL in the download directory.
pub fn archive_file_name(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty() && !name.contains(':'))
        .unwrap_or("download")
        .to_string()
}

/// Download `url` to `dest`, returning the number of bytes written.
pub fn download(url: &str, dest: &Path) -> Result<u64, RecipeError> {
    fs_utils::ensure_parent_dir(dest)?;
    let filename = dest
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "download".to_string());

    let pb = progress::create_spinner(&format!("downloading {}", filename));
    let result = download_with_progress(url, dest, &pb);
    pb.finish_and_clear();

    let total_bytes = result?;
    output::detail(&format!("downloaded {} ({} bytes)", filename, total_bytes));
    Ok(total_bytes)
}

fn download_with_progress(
    url: &str,
    dest: &Path,
    pb: &indicatif::ProgressBar,
) -> Result<u64, RecipeError> {
    let fail = |reason: String| RecipeError::Download {
        url: url.to_string(),
        reason,
    };

    let response = ureq::get(url)
        .timeout(http_timeout())
        .set("User-Agent", USER_AGENT)
        .call()
        .map_err(|e| match e {
            ureq::Error::Status(code, _) => fail(format!("HTTP status {}", code)),
            other => fail(other.to_string()),
        })?;

    let expected_len: Option<u64> = response
        .header("content-length")
        .and_then(|s| s.parse().ok());
    if let Some(len) = expected_len {
        upgrade_to_bytes(pb, len);
    }

    // Same directory as dest so the final rename never crosses filesystems
    let parent = dest.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;

    let mut reader = response.into_reader();
    let mut buffer = [0u8; 8192];
    let mut total_bytes = 0u64;
    loop {
        let n = reader
            .read(&mut buffer)
            .map_err(|e| fail(format!("read error: {}", e)))?;
        if n == 0 {
            break;
        }
        tmp.write_all(&buffer[..n])?;
        total_bytes += n as u64;
        pb.set_position(total_bytes);
    }

    if let Some(len) = expected_len
        && len != total_bytes
    {
        return Err(fail(format!(
            "truncated body: expected {} bytes, got {}",
            len, total_bytes
        )));
    }

    tmp.flush()?;
    tmp.persist(dest).map_err(|e| RecipeError::Io(e.error))?;
    Ok(total_bytes)
}

/// Fetch a source archive into `download_dir`, trying each mirror in order.
///
/// An archive already present with a matching digest is reused.
/// Returns the path of the verified archive.
pub fn fetch_archive(entry: &SourceEntry, download_dir: &Path) -> Result<PathBuf, RecipeError> {
    let integrity = entry.integrity();
    let mut last_error = None;

    for url in entry.urls() {
        let dest = download_dir.join(archive_file_name(url));

        if let Some(integrity) = &integrity
            && dest.is_file()
            && integrity.verify(&dest).is_ok()
        {
            output::skip(&format!("{} already downloaded, skipping", dest.display()));
            return Ok(dest);
        }

        output::detail(&format!("downloading {}", url));
        let result = download(url, &dest).and_then(|_| match &integrity {
            Some(integrity) => {
                output::detail(&format!("verifying {}", integrity.algorithm.name().to_lowercase()));
                integrity.verify(&dest)
            }
            None => {
                output::warning(&format!("no checksum for {}, skipping verification", url));
                Ok(())
            }
        });

        match result {
            Ok(()) => return Ok(dest),
            Err(e) => {
                let _ = std::fs::remove_file(&dest);
                if entry.urls().len() > 1 {
                    output::warning(&format!("{}", e));
                }
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| RecipeError::Download {
        url: String::new(),
        reason: "no url".to_string(),
    }))
}

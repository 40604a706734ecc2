//! Source acquisition
//!
//! Fetches the serd archive into the source directory and the autowaf
//! archive into `<source>/waflib`, both with their top-level directory
//! stripped.

use crate::core::error::RecipeError;
use crate::core::layout::Layout;
use crate::core::output;
use crate::core::sources::{AUTOWAF_SOURCE, SERD_SOURCE, SourceTable};
use crate::helpers::acquire::fetch_archive;
use crate::helpers::build::extract;

/// Download and extract both archives for `version`.
pub fn acquire(version: &str, sources: &SourceTable, layout: &Layout) -> Result<(), RecipeError> {
    // Resolve both entries before touching the network
    let serd = sources.entry(version, SERD_SOURCE)?;
    let autowaf = sources.entry(version, AUTOWAF_SOURCE)?;

    std::fs::create_dir_all(&layout.download_dir)?;

    let archive = fetch_archive(serd, &layout.download_dir)?;
    extract(&archive, &layout.source_dir, true)?;

    // serd ships its own modified waf; autowaf fills in waflib
    let archive = fetch_archive(autowaf, &layout.download_dir)?;
    extract(&archive, &layout.waflib_dir(), true)?;

    output::detail(&format!("sources ready in {}", layout.source_dir.display()));
    Ok(())
}

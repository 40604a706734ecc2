//! Packaging
//!
//! Runs `waf install` into the stage directory, then trims it to what
//! consumers need and adds the license. Publishing the stage is left to the
//! commit step.

use crate::core::error::RecipeError;
use crate::core::layout::{LICENSES_DIR, Layout};
use crate::core::output;
use crate::helpers::cmd::{ProcessRunner, ShellCmd};
use crate::helpers::internal::fs_utils;

use super::build::waf;

/// License file shipped in the serd source tree
pub const LICENSE_FILE: &str = "COPYING";

/// Install output the package does not ship (docs, man pages, pkg-config)
pub const REMOVED_DIRS: &[&str] = &["share", "lib/pkgconfig"];

pub fn install_command(layout: &Layout) -> ShellCmd {
    waf(layout, "install")
}

/// Install, prune, and copy the license.
pub fn package(layout: &Layout, runner: &mut dyn ProcessRunner) -> Result<(), RecipeError> {
    runner.run(&install_command(layout))?;

    for dir in REMOVED_DIRS {
        if fs_utils::remove_dir_if_exists(&layout.stage_dir.join(dir))? {
            output::detail(&format!("removed {}", dir));
        }
    }

    let license = layout.source_dir.join(LICENSE_FILE);
    fs_utils::copy_file(&license, &layout.licenses_dir().join(LICENSE_FILE))?;
    output::detail(&format!("copied {} to {}", LICENSE_FILE, LICENSES_DIR));
    Ok(())
}

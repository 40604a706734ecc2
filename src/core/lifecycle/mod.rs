//! Lifecycle orchestration for a recipe run
//!
//! The lifecycle flow:
//! 1. source() - Download and extract serd and autowaf
//! 2. configure() - Drop C++-only compiler settings
//! 3. validate() - Reject unsupported compilers
//! 4. build() - waf configure + waf build
//! 5. package() - waf install into the stage, prune, copy license
//! 6. package_info() - Export libs and include dirs
//!
//! Steps run strictly in order. The first failure ends the run and is
//! reported as a [`StepFailure`] naming the step. Only a complete run
//! replaces the package directory; a failed or dry run leaves it untouched.

mod build;
mod commit;
mod configure;
mod package;
mod package_info;
mod source;
mod validation;

pub use build::{WAF, build, build_command, cflags, configure_args, configure_command};
use commit::{check_package_dir, cleanup_staging_dir, commit_package, create_staging_dir};
pub use configure::configure;
pub use package::{LICENSE_FILE, REMOVED_DIRS, install_command, package};
pub use package_info::{PackageInfo, package_info};
pub use source::acquire;
pub use validation::{UNSUPPORTED_COMPILER, validate};

use super::error::{RecipeError, Step, StepFailure};
use super::layout::Layout;
use super::manifest::PackageManifest;
use super::output;
use super::recipe::{Recipe, RecipeContext};
use super::sources::SourceTable;
use crate::helpers::cmd::ProcessRunner;
use crate::helpers::internal::fs_utils;

/// Run one step, tagging its error with the step.
fn step<T>(step: Step, f: impl FnOnce() -> Result<T, RecipeError>) -> Result<T, StepFailure> {
    output::sub_action(step.name());
    f().map_err(|e| StepFailure::new(step, e))
}

/// Start from a clean checkout and an empty stage.
///
/// The download cache and the package directory are kept.
fn prepare_workdir(layout: &Layout) -> Result<(), RecipeError> {
    check_package_dir(&layout.package_dir)?;
    fs_utils::remove_dir_if_exists(&layout.source_dir)?;
    create_staging_dir(&layout.stage_dir)?;
    std::fs::create_dir_all(&layout.download_dir)?;
    std::fs::create_dir_all(&layout.source_dir)?;
    Ok(())
}

/// Run every step and publish the package.
///
/// `ctx.settings` is adjusted in place by the configure step. With a dry-run
/// runner the waf commands are only printed and the package directory is
/// not touched.
pub fn create(
    recipe: &Recipe,
    ctx: &mut RecipeContext,
    sources: &SourceTable,
    runner: &mut dyn ProcessRunner,
) -> Result<PackageInfo, StepFailure> {
    output::action(&format!("Creating {}/{}", recipe.name, ctx.version));

    let dry_run = runner.is_dry_run();
    let result = run_steps(recipe, ctx, sources, runner);
    cleanup_staging_dir(&ctx.layout.stage_dir);

    match &result {
        Err(_) if ctx.layout.package_dir.exists() => output::warning(&format!(
            "{} left unchanged",
            ctx.layout.package_dir.display()
        )),
        Err(_) => {}
        Ok(_) if dry_run => output::success(&format!(
            "dry run of {}/{} finished, nothing published",
            recipe.name, ctx.version
        )),
        Ok(_) => output::success(&format!(
            "{}/{} packaged in {}",
            recipe.name,
            ctx.version,
            ctx.layout.package_dir.display()
        )),
    }
    result
}

fn run_steps(
    recipe: &Recipe,
    ctx: &mut RecipeContext,
    sources: &SourceTable,
    runner: &mut dyn ProcessRunner,
) -> Result<PackageInfo, StepFailure> {
    // Acquisition precedes validation, so an unsupported compiler is only
    // reported after the download.
    step(Step::Source, || {
        prepare_workdir(&ctx.layout)?;
        acquire(&ctx.version, sources, &ctx.layout)
    })?;

    step(Step::Configure, || {
        configure(&mut ctx.settings);
        Ok(())
    })?;

    step(Step::Validate, || validate(&ctx.settings))?;

    step(Step::Build, || build(&ctx.settings, &ctx.options, &ctx.layout, runner))?;

    step(Step::Package, || package(&ctx.layout, runner))?;

    let info = step(Step::PackageInfo, || Ok(package_info(recipe)))?;

    if runner.is_dry_run() {
        output::skip(&format!(
            "dry run, {} not written",
            ctx.layout.package_dir.display()
        ));
        return Ok(info);
    }

    let stage = &ctx.layout.stage_dir;
    PackageManifest::collect(recipe, ctx, &info, stage)
        .and_then(|m| m.write(stage))
        .and_then(|_| commit_package(stage, &ctx.layout.package_dir))
        .map_err(|e| StepFailure::new(Step::Package, e))?;
    output::detail(&format!("published {}", ctx.layout.package_dir.display()));

    Ok(info)
}

/// Run only the source step (`serd-recipe source`).
pub fn source_only(
    recipe: &Recipe,
    version: &str,
    sources: &SourceTable,
    layout: &Layout,
) -> Result<(), StepFailure> {
    output::action(&format!("Fetching {}/{}", recipe.name, version));
    step(Step::Source, || {
        fs_utils::remove_dir_if_exists(&layout.source_dir)?;
        acquire(version, sources, layout)
    })?;
    output::success(&format!("sources in {}", layout.source_dir.display()));
    Ok(())
}

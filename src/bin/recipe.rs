//! serd-recipe CLI
//!
//! Usage:
//!   serd-recipe create <version>     Fetch, build and package serd
//!   serd-recipe source <version>     Fetch and extract sources only
//!   serd-recipe info                 Show exported package metadata
//!   serd-recipe inspect              Show recipe metadata and defaults

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serd_recipe::core::lifecycle::{LICENSE_FILE, REMOVED_DIRS, UNSUPPORTED_COMPILER};
use serd_recipe::{
    DryRunRunner, Layout, Options, ProcessRunner, RecipeContext, SERD, Settings, SourceTable,
    SystemRunner, load_profile, output, package_info,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "serd-recipe")]
#[command(about = "Build and package the serd RDF syntax library with waf")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct SourceArgs {
    /// Version to build (a key of the source table)
    version: String,

    /// Source table (TOML)
    #[arg(long, env = "SERD_RECIPE_SOURCES", default_value = "sources.toml")]
    sources: PathBuf,

    /// Working directory (downloads, source checkout, package)
    #[arg(short, long, default_value = "serd-build")]
    workdir: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, build and package serd
    Create {
        #[command(flatten)]
        source: SourceArgs,

        /// Profile file layered over the user profile
        #[arg(long)]
        profile: Option<PathBuf>,

        /// Setting override, e.g. -s build_type=Debug
        #[arg(short = 's', long = "setting", value_name = "KEY=VALUE")]
        settings: Vec<String>,

        /// Option override, e.g. -o shared=True
        #[arg(short = 'o', long = "option", value_name = "KEY=VALUE")]
        options: Vec<String>,

        /// Package output directory (default: <workdir>/package). Only
        /// replaced when empty or written by an earlier run
        #[arg(long)]
        package_dir: Option<PathBuf>,

        /// Print the waf commands instead of running them
        #[arg(long)]
        dry_run: bool,

        /// Stream waf output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Fetch and extract sources only
    Source {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Show exported package metadata
    Info {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show recipe metadata, settings and option defaults
    Inspect,
}

fn main() {
    if let Err(e) = run(Cli::parse()) {
        output::error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Create {
            source,
            profile,
            settings,
            options,
            package_dir,
            dry_run,
            verbose,
        } => {
            let profile = load_profile(profile.as_deref(), &settings, &options)
                .context("Failed to load profile")?;
            let sources = load_sources(&source.sources)?;

            let mut layout = Layout::new(absolute(&source.workdir)?);
            if let Some(dir) = package_dir {
                layout = layout.with_package_dir(absolute(&dir)?);
            }

            let mut ctx = RecipeContext::new(source.version, profile.settings, profile.options, layout);
            let mut runner: Box<dyn ProcessRunner> = if dry_run {
                Box::new(DryRunRunner::new())
            } else {
                Box::new(SystemRunner::new(verbose))
            };

            let info = serd_recipe::create(&SERD, &mut ctx, &sources, runner.as_mut())
                .map_err(|failure| anyhow::anyhow!("{} ({}): {}", SERD.name, failure.kind(), failure))?;

            output::info(&format!("libs: {}", info.libs.join(", ")));
            output::info(&format!("includedirs: {}", info.includedirs.join(", ")));
        }

        Commands::Source { source } => {
            let sources = load_sources(&source.sources)?;
            let layout = Layout::new(absolute(&source.workdir)?);
            serd_recipe::source_only(&SERD, &source.version, &sources, &layout)
                .map_err(|failure| anyhow::anyhow!("{} ({}): {}", SERD.name, failure.kind(), failure))?;
        }

        Commands::Info { json } => {
            let info = package_info(&SERD);
            if json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("libs: {}", info.libs.join(", "));
                println!("includedirs: {}", info.includedirs.join(", "));
            }
        }

        Commands::Inspect => inspect(),
    }

    Ok(())
}

fn load_sources(path: &Path) -> Result<SourceTable> {
    SourceTable::load(path).with_context(|| format!("Failed to load source table: {}", path.display()))
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).with_context(|| format!("Invalid path: {}", path.display()))
}

fn inspect() {
    let settings = Settings::default();
    let options = Options::default();

    println!("name: {}", SERD.name);
    println!("description: {}", SERD.description);
    println!("homepage: {}", SERD.homepage);
    println!("license: {}", SERD.license);
    println!("topics: {}", SERD.topics.join(", "));
    println!("settings: build_type, compiler, os, arch");
    println!(
        "  defaults: build_type={} compiler={} os={} arch={}",
        settings.build_type, settings.compiler.name, settings.os, settings.arch
    );
    println!("  unsupported compiler: {}", UNSUPPORTED_COMPILER);
    println!("options:");
    println!("  shared: [True, False] (default {})", py_bool(options.shared));
    println!("  fPIC: [True, False] (default {})", py_bool(options.fpic));
    println!("license file: {}", LICENSE_FILE);
    println!("removed from package: {}", REMOVED_DIRS.join(", "));
}

fn py_bool(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}

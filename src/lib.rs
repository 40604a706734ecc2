//! Package recipe for the serd RDF syntax library
//!
//! The recipe fetches serd and its autowaf helper scripts, drives serd's own
//! `waf` build, and stages the result into a package directory for a
//! dependency manager.
//!
//! # Lifecycle
//!
//! 1. `source` - download, verify and extract both archives (strip root)
//! 2. `configure` - drop `compiler.libcxx` / `compiler.cppstd` (serd is C)
//! 3. `validate` - reject `Visual Studio`
//! 4. `build` - `CFLAGS="..." ./waf configure ...` then `./waf build`
//! 5. `package` - `./waf install` into `<workdir>/.stage`, remove `share/`
//!    and `lib/pkgconfig/`, copy `COPYING` to `licenses/`; the stage replaces
//!    the package directory once everything succeeded
//! 6. `package_info` - `libs = ["serd-0"]`, `includedirs = ["include/serd-0/"]`
//!
//! # Example
//!
//! ```no_run
//! use serd_recipe::{Layout, Options, RecipeContext, Settings, SourceTable, SystemRunner, SERD, create};
//! use std::path::Path;
//!
//! let sources = SourceTable::load(Path::new("sources.toml"))?;
//! let mut ctx = RecipeContext::new(
//!     "0.30.16",
//!     Settings::default(),
//!     Options::default(),
//!     Layout::new("/tmp/serd-build"),
//! );
//! let info = create(&SERD, &mut ctx, &sources, &mut SystemRunner::new(false))?;
//! assert_eq!(info.libs, ["serd-0"]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Environment
//!
//! - `RECIPE_HTTP_TIMEOUT` - HTTP timeout in seconds (default 30, clamped to 5..=300)

pub mod core;
pub mod helpers;

pub use crate::core::config::{Profile, load_profile};
pub use crate::core::error::{FailureKind, RecipeError, Step, StepFailure};
pub use crate::core::layout::Layout;
pub use crate::core::lifecycle::{PackageInfo, create, package_info, source_only};
pub use crate::core::manifest::{PackageManifest, package_id};
pub use crate::core::output;
pub use crate::core::recipe::{Recipe, RecipeContext, SERD};
pub use crate::core::settings::{BuildType, Compiler, Options, Settings};
pub use crate::core::sources::{SourceEntry, SourceTable};
pub use crate::helpers::cmd::{DryRunRunner, ProcessRunner, ShellCmd, SystemRunner};

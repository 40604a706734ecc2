//! Profile configuration
//!
//! A profile is a TOML file with `[settings]` and `[options]` tables. Profiles
//! are layered: built-in defaults, then the user profile
//! (`<config dir>/serd-recipe/profile.toml`), then an explicit profile file,
//! then `key=value` overrides from the command line.
//!
//! ```toml
//! [settings]
//! build_type = "Release"
//! os = "Linux"
//! arch = "x86_64"
//!
//! [settings.compiler]
//! name = "gcc"
//! version = "13"
//! libcxx = "libstdc++11"
//!
//! [options]
//! shared = false
//! fPIC = true
//! ```

use crate::core::error::RecipeError;
use crate::core::settings::{BuildType, Options, Settings, split_assignment};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const PROFILE_FILE_NAME: &str = "profile.toml";
const CONFIG_DIR_NAME: &str = "serd-recipe";

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ProfileToml {
    settings: Option<SettingsToml>,
    options: Option<OptionsToml>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct SettingsToml {
    build_type: Option<BuildType>,
    os: Option<String>,
    arch: Option<String>,
    compiler: Option<CompilerToml>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct CompilerToml {
    name: Option<String>,
    version: Option<String>,
    libcxx: Option<String>,
    cppstd: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct OptionsToml {
    shared: Option<bool>,
    #[serde(rename = "fPIC")]
    fpic: Option<bool>,
}

impl ProfileToml {
    fn apply(self, profile: &mut Profile) {
        if let Some(s) = self.settings {
            if let Some(bt) = s.build_type {
                profile.settings.build_type = bt;
            }
            if let Some(os) = s.os {
                profile.settings.os = os;
            }
            if let Some(arch) = s.arch {
                profile.settings.arch = arch;
            }
            if let Some(c) = s.compiler {
                let compiler = &mut profile.settings.compiler;
                if let Some(name) = c.name {
                    // A different compiler invalidates the sub-settings of the old one.
                    if name != compiler.name {
                        compiler.version = None;
                        compiler.libcxx = None;
                        compiler.cppstd = None;
                    }
                    compiler.name = name;
                }
                if c.version.is_some() {
                    compiler.version = c.version;
                }
                if c.libcxx.is_some() {
                    compiler.libcxx = c.libcxx;
                }
                if c.cppstd.is_some() {
                    compiler.cppstd = c.cppstd;
                }
            }
        }
        if let Some(o) = self.options {
            if let Some(shared) = o.shared {
                profile.options.shared = shared;
            }
            if let Some(fpic) = o.fpic {
                profile.options.fpic = fpic;
            }
        }
    }
}

/// Resolved settings and options for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    pub settings: Settings,
    pub options: Options,
}

impl Profile {
    /// Layer a profile file on top of this one.
    pub fn merge_file(&mut self, path: &Path) -> Result<(), RecipeError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RecipeError::Config(format!("cannot read profile {}: {}", path.display(), e)))?;
        self.merge_str(&content)
            .map_err(|e| RecipeError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Layer profile TOML text on top of this one.
    pub fn merge_str(&mut self, content: &str) -> Result<(), RecipeError> {
        let parsed: ProfileToml =
            toml::from_str(content).map_err(|e| RecipeError::Config(format!("invalid profile: {}", e)))?;
        parsed.apply(self);
        Ok(())
    }

    /// Apply `-s key=value` style overrides.
    pub fn apply_settings<S: AsRef<str>>(&mut self, overrides: &[S]) -> Result<(), RecipeError> {
        for raw in overrides {
            let (key, value) = split_assignment(raw.as_ref())?;
            self.settings.set(key, value)?;
        }
        Ok(())
    }

    /// Apply `-o key=value` style overrides.
    pub fn apply_options<S: AsRef<str>>(&mut self, overrides: &[S]) -> Result<(), RecipeError> {
        for raw in overrides {
            let (key, value) = split_assignment(raw.as_ref())?;
            self.options.set(key, value)?;
        }
        Ok(())
    }
}

/// Path of the user profile, if a config directory exists on this platform.
pub fn user_profile_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(PROFILE_FILE_NAME))
}

/// Load the layered profile.
///
/// Missing user profile is fine; a missing explicit profile is an error.
pub fn load_profile<S: AsRef<str>>(
    explicit: Option<&Path>,
    settings: &[S],
    options: &[S],
) -> Result<Profile, RecipeError> {
    let user = user_profile_path();
    load_profile_from(user.as_deref(), explicit, settings, options)
}

/// [`load_profile`] with the user profile location supplied by the caller.
pub fn load_profile_from<S: AsRef<str>>(
    user: Option<&Path>,
    explicit: Option<&Path>,
    settings: &[S],
    options: &[S],
) -> Result<Profile, RecipeError> {
    let mut profile = Profile::default();

    if let Some(user) = user.filter(|p| p.is_file()) {
        profile.merge_file(user)?;
    }
    if let Some(path) = explicit {
        profile.merge_file(path)?;
    }

    profile.apply_settings(settings)?;
    profile.apply_options(options)?;
    Ok(profile)
}

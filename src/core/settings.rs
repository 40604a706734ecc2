//! Build settings and package options
//!
//! Settings describe the target (`build_type`, `compiler`, `os`, `arch`);
//! options are the recipe's own switches (`shared`, `fPIC`). Both are plain
//! values passed explicitly to each lifecycle step.

use crate::core::error::RecipeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Optimization/debug profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BuildType {
    Debug,
    #[default]
    Release,
    RelWithDebInfo,
    MinSizeRel,
}

impl BuildType {
    pub const ALL: [BuildType; 4] = [
        BuildType::Debug,
        BuildType::Release,
        BuildType::RelWithDebInfo,
        BuildType::MinSizeRel,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Debug => "Debug",
            Self::Release => "Release",
            Self::RelWithDebInfo => "RelWithDebInfo",
            Self::MinSizeRel => "MinSizeRel",
        }
    }

    /// Compiler flags passed to waf through `CFLAGS`.
    pub fn cflags(&self) -> &'static [&'static str] {
        match self {
            Self::Debug => &["-g"],
            Self::Release => &["-O3", "-DNDEBUG"],
            Self::RelWithDebInfo => &["-g", "-O3", "-DNDEBUG"],
            Self::MinSizeRel => &["-DNDEBUG", "-Os"],
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BuildType {
    type Err = RecipeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BuildType::ALL
            .into_iter()
            .find(|bt| bt.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                RecipeError::Config(format!(
                    "unknown build_type '{}' (expected one of Debug, Release, RelWithDebInfo, MinSizeRel)",
                    s
                ))
            })
    }
}

/// Compiler descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compiler {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// C++ standard library; meaningless for a C library.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub libcxx: Option<String>,
    /// C++ dialect; meaningless for a C library.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cppstd: Option<String>,
}

impl Compiler {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            libcxx: None,
            cppstd: None,
        }
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new("gcc")
    }
}

/// Target settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub build_type: BuildType,
    pub compiler: Compiler,
    pub os: String,
    pub arch: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            build_type: BuildType::default(),
            compiler: Compiler::default(),
            os: host_os().to_string(),
            arch: host_arch().to_string(),
        }
    }
}

impl Settings {
    /// Apply a `key=value` setting override.
    ///
    /// Keys: `build_type`, `os`, `arch`, `compiler`, `compiler.version`,
    /// `compiler.libcxx`, `compiler.cppstd`.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), RecipeError> {
        match key {
            "build_type" => self.build_type = value.parse()?,
            "os" => self.os = value.to_string(),
            "arch" => self.arch = value.to_string(),
            // A different compiler invalidates the sub-settings of the old one.
            "compiler" if value != self.compiler.name => self.compiler = Compiler::new(value),
            "compiler" => {}
            "compiler.version" => self.compiler.version = Some(value.to_string()),
            "compiler.libcxx" => self.compiler.libcxx = Some(value.to_string()),
            "compiler.cppstd" => self.compiler.cppstd = Some(value.to_string()),
            _ => return Err(RecipeError::Config(format!("unknown setting '{}'", key))),
        }
        Ok(())
    }
}

/// Recipe options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Options {
    pub shared: bool,
    #[serde(rename = "fPIC")]
    pub fpic: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            shared: false,
            fpic: true,
        }
    }
}

impl Options {
    /// Apply a `key=value` option override.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), RecipeError> {
        let value = parse_bool(value)
            .ok_or_else(|| RecipeError::Config(format!("option '{}' expects a boolean, got '{}'", key, value)))?;
        match key {
            "shared" => self.shared = value,
            "fPIC" | "fpic" => self.fpic = value,
            _ => return Err(RecipeError::Config(format!("unknown option '{}'", key))),
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Split a `key=value` override.
pub fn split_assignment(raw: &str) -> Result<(&str, &str), RecipeError> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim(), v.trim()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| RecipeError::Config(format!("expected key=value, got '{}'", raw)))
}

fn host_os() -> &'static str {
    match std::env::consts::OS {
        "linux" => "Linux",
        "macos" => "Macos",
        "windows" => "Windows",
        "freebsd" => "FreeBSD",
        other => other,
    }
}

fn host_arch() -> &'static str {
    match std::env::consts::ARCH {
        "aarch64" => "armv8",
        "x86" => "x86",
        other => other,
    }
}

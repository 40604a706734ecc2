//! Recipe error types.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while running a recipe step.
#[derive(Error, Debug)]
pub enum RecipeError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("unsupported version: {0} (not listed in the source table)")]
    UnsupportedVersion(String),

    #[error("no source entry named '{name}' for version {version}")]
    MissingSource { version: String, name: String },

    #[error("download failed: {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("{algorithm} integrity check failed for '{path}'\n  expected: {expected}\n  got:      {actual}")]
    ChecksumMismatch {
        algorithm: &'static str,
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("unsupported archive format: {0}")]
    UnsupportedFormat(String),

    #[error("archive error: {0}")]
    Archive(String),

    #[error("command failed: {cmd}\nstderr: {stderr}")]
    CommandFailedWithStderr { cmd: String, stderr: String },

    #[error("command failed: {cmd} (exit code: {code:?})")]
    CommandFailed { cmd: String, code: Option<i32> },

    #[error("refusing to replace {0}: not empty and holds no manifest.json from an earlier run")]
    PackageDirInUse(PathBuf),

    #[error("missing required file: {0}")]
    MissingFile(PathBuf),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A lifecycle step of the recipe, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Step {
    Source,
    Configure,
    Validate,
    Build,
    Package,
    PackageInfo,
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Configure => "configure",
            Self::Validate => "validate",
            Self::Build => "build",
            Self::Package => "package",
            Self::PackageInfo => "package_info",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Failure classification reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    ConfigurationInvalid,
    Acquisition,
    Build,
    Packaging,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ConfigurationInvalid => "configuration invalid",
            Self::Acquisition => "acquisition failure",
            Self::Build => "build failure",
            Self::Packaging => "packaging failure",
        })
    }
}

/// Terminal failure of a recipe run: the step that failed and why.
#[derive(Error, Debug)]
#[error("step '{step}' failed: {error}")]
pub struct StepFailure {
    pub step: Step,
    #[source]
    pub error: RecipeError,
}

impl StepFailure {
    pub fn new(step: Step, error: RecipeError) -> Self {
        Self { step, error }
    }

    pub fn kind(&self) -> FailureKind {
        match (&self.error, self.step) {
            (RecipeError::InvalidConfiguration(_) | RecipeError::PackageDirInUse(_), _) => {
                FailureKind::ConfigurationInvalid
            }
            (_, Step::Configure | Step::Validate) => FailureKind::ConfigurationInvalid,
            (_, Step::Source) => FailureKind::Acquisition,
            (RecipeError::CommandFailed { .. } | RecipeError::CommandFailedWithStderr { .. }, _) => {
                FailureKind::Build
            }
            (_, Step::Build) => FailureKind::Build,
            (_, Step::Package | Step::PackageInfo) => FailureKind::Packaging,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_are_ordered() {
        assert!(Step::Source < Step::Configure);
        assert!(Step::Configure < Step::Validate);
        assert!(Step::Validate < Step::Build);
        assert!(Step::Build < Step::Package);
        assert!(Step::Package < Step::PackageInfo);
    }

    #[test]
    fn test_failure_kind_by_step() {
        let kind = |step, error| StepFailure::new(step, error).kind();

        assert_eq!(
            kind(Step::Validate, RecipeError::InvalidConfiguration("vs".into())),
            FailureKind::ConfigurationInvalid
        );
        assert_eq!(
            kind(Step::Source, RecipeError::UnsupportedVersion("9.9".into())),
            FailureKind::Acquisition
        );
        assert_eq!(
            kind(
                Step::Build,
                RecipeError::CommandFailed {
                    cmd: "./waf build".into(),
                    code: Some(1)
                }
            ),
            FailureKind::Build
        );
        // install runs during packaging but a failed command is still a build failure
        assert_eq!(
            kind(
                Step::Package,
                RecipeError::CommandFailed {
                    cmd: "./waf install".into(),
                    code: Some(2)
                }
            ),
            FailureKind::Build
        );
        assert_eq!(
            kind(Step::Package, RecipeError::MissingFile("COPYING".into())),
            FailureKind::Packaging
        );
        assert_eq!(
            kind(Step::Source, RecipeError::PackageDirInUse("/usr/local".into())),
            FailureKind::ConfigurationInvalid
        );
    }

    #[test]
    fn test_step_failure_message_names_step() {
        let failure = StepFailure::new(Step::Package, RecipeError::MissingFile("src/COPYING".into()));
        let msg = failure.to_string();
        assert!(msg.contains("package"), "got: {msg}");
        assert!(msg.contains("src/COPYING"), "got: {msg}");
    }
}

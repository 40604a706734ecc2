//! Working directory layout
//!
//! ```text
//! <root>/
//!   downloads/   cached source archives (kept between runs)
//!   source/      serd checkout, waf runs here
//!     waflib/    autowaf helper scripts
//!   .stage/      waf install prefix; becomes the package on success
//!   package/     the published package
//! ```

use std::path::PathBuf;

/// Directory holding the license inside a package
pub const LICENSES_DIR: &str = "licenses";

/// Filesystem paths allocated to one recipe run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub root: PathBuf,
    pub download_dir: PathBuf,
    pub source_dir: PathBuf,
    pub stage_dir: PathBuf,
    pub package_dir: PathBuf,
}

impl Layout {
    /// Standard layout under `root`. `root` should be absolute since the
    /// stage directory is handed to waf as its install prefix.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            download_dir: root.join("downloads"),
            source_dir: root.join("source"),
            stage_dir: root.join(".stage"),
            package_dir: root.join("package"),
            root,
        }
    }

    /// Stage the package somewhere other than `<root>/package`.
    pub fn with_package_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.package_dir = dir.into();
        self
    }

    /// Where the autowaf archive is extracted.
    pub fn waflib_dir(&self) -> PathBuf {
        self.source_dir.join("waflib")
    }

    pub fn licenses_dir(&self) -> PathBuf {
        self.stage_dir.join(LICENSES_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_layout() {
        let layout = Layout::new("/work");
        assert_eq!(layout.download_dir, PathBuf::from("/work/downloads"));
        assert_eq!(layout.source_dir, PathBuf::from("/work/source"));
        assert_eq!(layout.waflib_dir(), PathBuf::from("/work/source/waflib"));
        assert_eq!(layout.stage_dir, PathBuf::from("/work/.stage"));
        assert_eq!(layout.package_dir, PathBuf::from("/work/package"));
        assert_eq!(layout.licenses_dir(), PathBuf::from("/work/.stage/licenses"));
    }

    #[test]
    fn test_custom_package_dir() {
        let layout = Layout::new("/work").with_package_dir("/opt/serd");
        assert_eq!(layout.package_dir, PathBuf::from("/opt/serd"));
        assert_eq!(layout.source_dir, PathBuf::from("/work/source"));
        assert_eq!(layout.stage_dir, PathBuf::from("/work/.stage"));
    }
}

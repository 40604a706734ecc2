//! Build invocation
//!
//! Turns options and the build type into waf flags, then runs
//! `waf configure` followed by `waf build` in the source checkout.

use crate::core::error::RecipeError;
use crate::core::layout::Layout;
use crate::core::settings::{BuildType, Options, Settings};
use crate::helpers::cmd::{ProcessRunner, ShellCmd};
use std::path::Path;

/// waf entry point, relative to the source checkout
pub const WAF: &str = "./waf";

/// Arguments for `waf configure`.
pub fn configure_args(options: &Options, prefix: &Path) -> Vec<String> {
    let mut args = vec![
        "--no-utils".to_string(),
        format!("--prefix={}", prefix.display()),
    ];
    if !options.shared {
        args.push("--static".to_string());
        args.push("--no-shared".to_string());
    }
    if options.fpic {
        args.push("-fPIC".to_string());
    }
    args
}

/// `CFLAGS` value for a build type.
pub fn cflags(build_type: BuildType) -> String {
    build_type.cflags().join(" ")
}

/// A waf subcommand run from the source checkout.
pub fn waf(layout: &Layout, subcommand: &str) -> ShellCmd {
    ShellCmd::new(WAF).arg(subcommand).dir(&layout.source_dir)
}

pub fn configure_command(settings: &Settings, options: &Options, layout: &Layout) -> ShellCmd {
    waf(layout, "configure")
        .args(configure_args(options, &layout.stage_dir))
        .env("CFLAGS", cflags(settings.build_type))
}

pub fn build_command(layout: &Layout) -> ShellCmd {
    waf(layout, "build")
}

/// Configure then build. The first failing command aborts.
pub fn build(
    settings: &Settings,
    options: &Options,
    layout: &Layout,
    runner: &mut dyn ProcessRunner,
) -> Result<(), RecipeError> {
    runner.run(&configure_command(settings, options, layout))?;
    runner.run(&build_command(layout))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(shared: bool, fpic: bool) -> Options {
        Options { shared, fpic }
    }

    #[test]
    fn test_static_adds_static_flags() {
        let args = configure_args(&opts(false, false), Path::new("/pkg"));
        assert!(args.contains(&"--static".to_string()));
        assert!(args.contains(&"--no-shared".to_string()));
    }

    #[test]
    fn test_shared_omits_static_flags() {
        let args = configure_args(&opts(true, false), Path::new("/pkg"));
        assert!(!args.contains(&"--static".to_string()));
        assert!(!args.contains(&"--no-shared".to_string()));
    }

    #[test]
    fn test_fpic_flag_follows_option() {
        assert!(configure_args(&opts(false, true), Path::new("/pkg")).contains(&"-fPIC".to_string()));
        assert!(!configure_args(&opts(false, false), Path::new("/pkg")).contains(&"-fPIC".to_string()));
    }

    #[test]
    fn test_always_no_utils_and_prefix() {
        for (shared, fpic) in [(false, false), (false, true), (true, false), (true, true)] {
            let args = configure_args(&opts(shared, fpic), Path::new("/pkg"));
            assert_eq!(args[0], "--no-utils");
            assert_eq!(args[1], "--prefix=/pkg");
        }
    }

    #[test]
    fn test_cflags_strings() {
        assert_eq!(cflags(BuildType::Debug), "-g");
        assert_eq!(cflags(BuildType::Release), "-O3 -DNDEBUG");
        assert_eq!(cflags(BuildType::RelWithDebInfo), "-g -O3 -DNDEBUG");
        assert_eq!(cflags(BuildType::MinSizeRel), "-DNDEBUG -Os");
    }

    #[test]
    fn test_configure_command_line() {
        let layout = Layout::new("/work");
        let settings = Settings::default();
        let cmd = configure_command(&settings, &Options::default(), &layout);
        assert_eq!(
            cmd.cmd(),
            r#"CFLAGS="-O3 -DNDEBUG" ./waf configure --no-utils --prefix=/work/.stage --static --no-shared -fPIC"#
        );
        assert_eq!(cmd.cwd(), Some(Path::new("/work/source")));
    }

    #[test]
    fn test_build_command_line() {
        let layout = Layout::new("/work");
        assert_eq!(build_command(&layout).cmd(), "./waf build");
    }
}

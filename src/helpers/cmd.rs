//! Shell command execution
//!
//! The recipe never spawns processes directly. Lifecycle steps build a
//! [`ShellCmd`] and hand it to a [`ProcessRunner`], so flag construction can
//! be tested without running the external build tool.

use crate::core::error::RecipeError;
use crate::core::output;
use crate::helpers::internal::progress;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Maximum number of stderr lines kept in a command failure
const STDERR_TAIL_LINES: usize = 40;

/// Builder for a shell command line.
///
/// # Example
/// ```ignore
/// let cmd = ShellCmd::new("./waf")
///     .arg("configure")
///     .arg("--no-utils")
///     .env("CFLAGS", "-O3 -DNDEBUG")
///     .dir("/tmp/serd");
/// assert_eq!(cmd.cmd(), r#"CFLAGS="-O3 -DNDEBUG" ./waf configure --no-utils"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCmd {
    program: String,
    args: Vec<String>,
    env: BTreeMap<String, String>,
    cwd: Option<PathBuf>,
}

impl ShellCmd {
    /// Create a new command.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
            cwd: None,
        }
    }

    /// Append an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set an environment variable for the command.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Set the working directory for the command.
    pub fn dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    pub fn get_env(&self, key: &str) -> Option<&str> {
        self.env.get(key).map(String::as_str)
    }

    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    /// Full command line as a shell would see it, environment first.
    pub fn cmd(&self) -> String {
        let mut parts = Vec::with_capacity(self.env.len() + self.args.len() + 1);
        for (k, v) in &self.env {
            parts.push(format!("{}=\"{}\"", k, v.replace('\\', "\\\\").replace('"', "\\\"")));
        }
        parts.push(shell_quote(&self.program));
        parts.extend(self.args.iter().map(|a| shell_quote(a)));
        parts.join(" ")
    }

    /// Truncated command line for progress display.
    pub fn display_cmd(&self) -> String {
        let cmd = self.cmd();
        if cmd.chars().count() > 60 {
            format!("{}...", cmd.chars().take(57).collect::<String>())
        } else {
            cmd
        }
    }

    fn build_command(&self) -> Command {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", &self.cmd()]);
        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }
        cmd
    }
}

impl fmt::Display for ShellCmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cmd())
    }
}

/// Quote a word for `sh` only when it needs it.
fn shell_quote(word: &str) -> String {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:+,@%".contains(c));
    if plain {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', "'\\''"))
    }
}

/// Executes shell commands on behalf of the recipe.
pub trait ProcessRunner {
    /// Run `cmd` to completion. A non-zero exit is an error.
    fn run(&mut self, cmd: &ShellCmd) -> Result<(), RecipeError>;

    /// True when commands are only printed. Nothing is published after a
    /// dry run.
    fn is_dry_run(&self) -> bool {
        false
    }
}

/// Runs commands through `sh -c`.
///
/// Output is captured and only the stderr tail is reported on failure,
/// unless `verbose` is set, in which case output streams to the terminal.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    verbose: bool,
}

impl SystemRunner {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ProcessRunner for SystemRunner {
    fn run(&mut self, cmd: &ShellCmd) -> Result<(), RecipeError> {
        if self.verbose {
            output::detail(&format!("run: {}", cmd.cmd()));
            let status = cmd.build_command().status()?;
            if !status.success() {
                return Err(RecipeError::CommandFailed {
                    cmd: cmd.cmd(),
                    code: status.code(),
                });
            }
            return Ok(());
        }

        let pb = progress::create_spinner(&format!("run: {}", cmd.display_cmd()));
        let result = cmd
            .build_command()
            .stdin(Stdio::null())
            .output();
        pb.finish_and_clear();
        let out = result?;

        if !out.status.success() {
            output::detail(&format!("run: {} [FAILED]", cmd.display_cmd()));
            let stderr = String::from_utf8_lossy(&out.stderr);
            let tail = stderr_tail(&stderr);
            if tail.is_empty() {
                return Err(RecipeError::CommandFailed {
                    cmd: cmd.cmd(),
                    code: out.status.code(),
                });
            }
            return Err(RecipeError::CommandFailedWithStderr {
                cmd: cmd.cmd(),
                stderr: tail,
            });
        }

        output::detail(&format!("run: {}", cmd.display_cmd()));
        Ok(())
    }
}

fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.trim_end().lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

/// Prints commands instead of running them.
#[derive(Debug, Clone, Default)]
pub struct DryRunRunner {
    executed: Vec<String>,
}

impl DryRunRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands seen so far, in order.
    pub fn commands(&self) -> &[String] {
        &self.executed
    }
}

impl ProcessRunner for DryRunRunner {
    fn run(&mut self, cmd: &ShellCmd) -> Result<(), RecipeError> {
        output::detail(&format!("would run: {}", cmd.cmd()));
        self.executed.push(cmd.cmd());
        Ok(())
    }

    fn is_dry_run(&self) -> bool {
        true
    }
}

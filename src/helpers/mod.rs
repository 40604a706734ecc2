//! Recipe helper functions
//!
//! Building blocks the lifecycle steps are made of. Helpers take explicit
//! inputs and return explicit outputs; none of them knows about serd.
//!
//! ## Categories
//!
//! - **acquire**: download(url, dest), fetch_archive(entry, dir), integrity checks
//! - **build**: extract(archive, dest, strip_root)
//! - **cmd**: ShellCmd, ProcessRunner, SystemRunner, DryRunRunner

pub mod acquire;
pub mod build;
pub mod cmd;
pub mod internal;

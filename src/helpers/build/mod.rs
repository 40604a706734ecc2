//! BUILD helpers - unpacking sources
//!
//! ## Functions
//!
//! - **extract**: Extract an archive (tar.gz, tar.xz, tar.bz2, tar.zst, tar, zip),
//!   optionally stripping its single top-level directory

pub mod extract;

pub use extract::{ArchiveFormat, extract, extract_with_format};

//! ACQUIRE helpers - getting sources
//!
//! Downloading archives and verifying their integrity. These run during the
//! `source` step of the recipe lifecycle.
//!
//! ## Functions
//!
//! - **download**: Download a file from an HTTP(S) URL
//! - **fetch_archive**: Download a source entry, trying mirrors and reusing verified cache hits
//! - **Integrity::verify**: Check a file against a SHA256/SHA512/BLAKE3 digest

pub mod download;
pub mod verify;

pub use download::{archive_file_name, download, fetch_archive};
pub use verify::{HashAlgorithm, Integrity, hash_file};

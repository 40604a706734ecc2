//! Archive integrity verification
//!
//! Supports SHA256, SHA512 and BLAKE3 digests, hex encoded.

use crate::core::error::RecipeError;
use std::io::Read;
use std::path::Path;

/// Chunk size for reading files during hashing (1MB)
const CHUNK_SIZE: usize = 1024 * 1024;

/// Supported hash algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Sha256,
    Sha512,
    Blake3,
}

impl HashAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sha256 => "SHA256",
            Self::Sha512 => "SHA512",
            Self::Blake3 => "BLAKE3",
        }
    }
}

/// Expected digest of a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Integrity {
    pub algorithm: HashAlgorithm,
    pub expected: String,
}

impl Integrity {
    pub fn new(algorithm: HashAlgorithm, expected: &str) -> Self {
        Self {
            algorithm,
            expected: expected.trim().to_lowercase(),
        }
    }

    /// Verify `file` against this digest.
    pub fn verify(&self, file: &Path) -> Result<(), RecipeError> {
        let actual = hash_file(file, self.algorithm)?;
        if actual != self.expected {
            return Err(RecipeError::ChecksumMismatch {
                algorithm: self.algorithm.name(),
                path: file.to_path_buf(),
                expected: self.expected.clone(),
                actual,
            });
        }
        Ok(())
    }
}

/// Compute the hex digest of a file.
pub fn hash_file(file: &Path, algorithm: HashAlgorithm) -> Result<String, RecipeError> {
    let mut f = std::fs::File::open(file)?;
    match algorithm {
        HashAlgorithm::Sha256 => hash_reader::<sha2::Sha256>(&mut f),
        HashAlgorithm::Sha512 => hash_reader::<sha2::Sha512>(&mut f),
        HashAlgorithm::Blake3 => hash_blake3(&mut f),
    }
}

fn hash_reader<D: sha2::Digest>(reader: &mut impl Read) -> Result<String, RecipeError> {
    let mut hasher = D::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];
    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

// BLAKE3 has its own hasher API
fn hash_blake3(reader: &mut impl Read) -> Result<String, RecipeError> {
    let mut hasher = blake3::Hasher::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];
    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Ok(hasher.finalize().to_hex().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    // sha256("hello")
    const HELLO_SHA256: &str = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";

    fn write_hello() -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hello.txt");
        std::fs::write(&path, "hello").unwrap();
        (dir, path)
    }

    #[test]
    fn test_sha256_known_value() {
        let (_dir, path) = write_hello();
        assert_eq!(hash_file(&path, HashAlgorithm::Sha256).unwrap(), HELLO_SHA256);
    }

    #[test]
    fn test_verify_accepts_uppercase_expected() {
        let (_dir, path) = write_hello();
        let integrity = Integrity::new(HashAlgorithm::Sha256, &HELLO_SHA256.to_uppercase());
        integrity.verify(&path).unwrap();
    }

    #[test]
    fn test_verify_mismatch_reports_both_digests() {
        let (_dir, path) = write_hello();
        let integrity = Integrity::new(HashAlgorithm::Sha256, &"0".repeat(64));
        let err = integrity.verify(&path).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("SHA256 integrity check failed"), "got: {msg}");
        assert!(msg.contains(HELLO_SHA256), "got: {msg}");
    }

    #[test]
    fn test_blake3_and_sha512_lengths() {
        let (_dir, path) = write_hello();
        assert_eq!(hash_file(&path, HashAlgorithm::Blake3).unwrap().len(), 64);
        assert_eq!(hash_file(&path, HashAlgorithm::Sha512).unwrap().len(), 128);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = hash_file(&dir.path().join("nope"), HashAlgorithm::Sha256).unwrap_err();
        assert!(matches!(err, RecipeError::Io(_)));
    }
}

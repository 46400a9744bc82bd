//! Content hashing for change detection.
//!
//! # Responsibilities
//! - Compute stable digests of file contents
//! - Feed the route-table freshness check and the change watcher
//!
//! # Design Decisions
//! - SHA-256, hex-encoded, so digests are portable across platforms and
//!   comparable as plain strings in the persisted artifact
//! - Whole-file reads; route source files are small by convention

use sha2::{Digest, Sha256};
use std::path::Path;

/// Hash a byte slice to a lowercase hex SHA-256 digest.
pub fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();

    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        use std::fmt::Write;
        let _ = write!(out, "{:02x}", byte);
    }
    out
}

/// Hash the contents of a file.
///
/// Returns an error if the file cannot be read (missing, permission, etc.);
/// callers decide whether that means "skip" or "stale".
pub async fn hash_file(path: &Path) -> std::io::Result<String> {
    let bytes = tokio::fs::read(path).await?;
    Ok(hash_bytes(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_bytes_hash_identically() {
        assert_eq!(hash_bytes(b"hello route"), hash_bytes(b"hello route"));
    }

    #[test]
    fn single_byte_change_changes_digest() {
        assert_ne!(hash_bytes(b"hello route"), hash_bytes(b"hello routf"));
    }

    #[test]
    fn digest_is_hex_sha256() {
        let digest = hash_bytes(b"");
        assert_eq!(digest.len(), 64);
        // Well-known SHA-256 of the empty input.
        assert_eq!(
            digest,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[tokio::test]
    async fn hash_file_matches_hash_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("route.rs");
        tokio::fs::write(&path, b"pub fn handler() {}").await.unwrap();

        let from_file = hash_file(&path).await.unwrap();
        assert_eq!(from_file, hash_bytes(b"pub fn handler() {}"));
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(hash_file(&dir.path().join("gone.rs")).await.is_err());
    }
}

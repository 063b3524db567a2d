#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! SHA-256 integrity verification for downloaded archives
//!
//! Files are streamed through the hasher in fixed-size chunks, so memory use
//! is bounded by the chunk size and not by the archive size.

use lts_errors::{ConfigError, Error, NetworkError};
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use std::fmt;
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

/// Size of chunks for streaming hash computation
const CHUNK_SIZE: usize = 64 * 1024; // 64KB

/// A SHA-256 digest value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Digest {
    bytes: [u8; 32],
}

impl Digest {
    #[must_use]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self { bytes }
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    /// Lowercase hex encoding
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Parse from hex string, either case
    ///
    /// # Errors
    /// Returns an error if the input is not valid hexadecimal or does not
    /// decode to exactly 32 bytes.
    pub fn from_hex(s: &str) -> Result<Self, Error> {
        let bytes = hex::decode(s.trim()).map_err(|_| ConfigError::InvalidValue {
            field: "digest".to_string(),
            value: s.to_string(),
        })?;

        let array: [u8; 32] = bytes.try_into().map_err(|_| ConfigError::InvalidValue {
            field: "digest".to_string(),
            value: s.to_string(),
        })?;
        Ok(Self::from_bytes(array))
    }

    /// Compute digest of a byte slice
    #[must_use]
    pub fn from_data(data: &[u8]) -> Self {
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&Sha256::digest(data));
        Self::from_bytes(bytes)
    }

    /// Compute digest of a file by streaming it in chunks
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or read.
    pub async fn hash_file(path: &Path) -> Result<Self, Error> {
        let mut file = File::open(path)
            .await
            .map_err(|e| Error::io_with_path(&e, path))?;

        let mut hasher = Sha256::new();
        let mut buffer = vec![0; CHUNK_SIZE];

        loop {
            let n = file
                .read(&mut buffer)
                .await
                .map_err(|e| Error::io_with_path(&e, path))?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
        }

        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&hasher.finalize());
        Ok(Self::from_bytes(bytes))
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for Digest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Verify a file against an expected hex digest.
///
/// The comparison ignores case. Returns the computed digest on success.
///
/// # Errors
/// Returns an I/O error if the file cannot be read, or
/// `NetworkError::ChecksumMismatch` carrying both digests if they differ.
pub async fn verify_file(path: &Path, expected_hex: &str) -> Result<Digest, Error> {
    let actual = Digest::hash_file(path).await?;
    let actual_hex = actual.to_hex();

    if actual_hex.eq_ignore_ascii_case(expected_hex.trim()) {
        tracing::debug!(path = %path.display(), digest = %actual_hex, "checksum verified");
        Ok(actual)
    } else {
        tracing::warn!(
            path = %path.display(),
            expected = %expected_hex,
            actual = %actual_hex,
            "checksum mismatch"
        );
        Err(NetworkError::ChecksumMismatch {
            path: path.display().to_string(),
            expected: expected_hex.to_string(),
            actual: actual_hex,
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_digest_basics() {
        // Known SHA-256 of "hello world"
        let expected = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";
        assert_eq!(Digest::from_data(b"hello world").to_hex(), expected);
    }

    #[test]
    fn test_from_hex_accepts_uppercase() {
        let digest = Digest::from_data(b"test");
        let parsed = Digest::from_hex(&digest.to_hex().to_uppercase()).unwrap();
        assert_eq!(parsed, digest);
    }

    #[test]
    fn test_digest_serializes_as_hex() {
        let digest = Digest::from_data(b"test");
        let json = serde_json::to_string(&digest).unwrap();
        assert_eq!(json, format!("\"{}\"", digest.to_hex()));
    }

    #[tokio::test]
    async fn test_hash_file_spanning_chunks() {
        let data = vec![7u8; CHUNK_SIZE * 2 + 17];
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(&data).unwrap();

        let from_file = Digest::hash_file(temp.path()).await.unwrap();
        assert_eq!(from_file, Digest::from_data(&data));
    }

    #[tokio::test]
    async fn test_hash_missing_file_carries_path() {
        let err = Digest::hash_file(Path::new("/nonexistent/archive.zip"))
            .await
            .unwrap_err();
        match err {
            Error::Io { path, .. } => {
                assert_eq!(path.unwrap(), Path::new("/nonexistent/archive.zip"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}

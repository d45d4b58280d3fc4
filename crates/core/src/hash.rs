//! Content hashing using SHA-256

use std::fmt;
use std::io::Read;
use std::path::Path;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::warn;

/// A content hash using SHA-256 (256-bit)
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

/// A checksum string that was not valid hex of the expected length
#[derive(Debug, Error)]
#[error("invalid checksum {0:?}")]
pub struct InvalidChecksum(String);

impl ContentHash {
    /// Hash arbitrary bytes
    #[must_use]
    pub fn from_bytes(data: &[u8]) -> Self {
        Self(Sha256::digest(data).into())
    }

    /// Parse a hex checksum string, accepting either case
    ///
    /// # Errors
    /// Returns an error if the string is not 64 hex characters
    pub fn from_hex(hex_str: &str) -> Result<Self, InvalidChecksum> {
        let bytes = hex::decode(hex_str).map_err(|_| InvalidChecksum(hex_str.to_string()))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| InvalidChecksum(hex_str.to_string()))?;
        Ok(Self(bytes))
    }

    /// Get raw bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to the canonical lowercase hex string
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = self.to_hex();
        write!(f, "ContentHash({})", hex.get(..16).unwrap_or(&hex))
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for ContentHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ContentHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex_str = String::deserialize(deserializer)?;
        Self::from_hex(&hex_str).map_err(D::Error::custom)
    }
}

/// Compute the SHA-256 checksum of a file, streaming in fixed-size chunks.
///
/// Returns `None` if the file does not exist. Any other read failure is
/// logged and also reported as `None`: callers treat an unreadable file
/// the same as a missing one.
#[must_use]
pub fn compute_checksum(path: &Path) -> Option<ContentHash> {
    if !path.exists() {
        return None;
    }

    let mut file = match std::fs::File::open(path) {
        Ok(file) => file,
        Err(e) => {
            warn!("failed to open {} for hashing: {e}", path.display());
            return None;
        }
    };

    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 64 * 1024];

    loop {
        match file.read(&mut buffer) {
            Ok(0) => break,
            Ok(bytes_read) => hasher.update(&buffer[..bytes_read]),
            Err(e) => {
                warn!("failed to compute hash for {}: {e}", path.display());
                return None;
            }
        }
    }

    Some(ContentHash(hasher.finalize().into()))
}

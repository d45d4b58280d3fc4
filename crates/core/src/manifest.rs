//! The server manifest: the authoritative list of files a client must hold
//!
//! The manifest is exchanged as JSON with two top-level fields, a
//! distribution version tag and an ordered file list:
//!
//! ```json
//! {
//!   "distroVersion": "1.20.1-47.2.0",
//!   "files": [
//!     {
//!       "modId": "examplemod",
//!       "checksum": "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08",
//!       "fileName": "examplemod-1.2.0.jar"
//!     }
//!   ]
//! }
//! ```
//!
//! Decoding is the sole trust boundary for manifest content: every other
//! component assumes an already-decoded manifest is well formed.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::hash::ContentHash;

/// File name under which the server publishes (and persists) its manifest
pub const MANIFEST_FILE_NAME: &str = "servermanifest.json";

/// One file a client must hold, with its content hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    /// Logical mod id shared by alternate packagings of the same mod
    pub mod_id: String,
    /// SHA-256 checksum of the file contents
    pub checksum: ContentHash,
    /// Bare file name; always a single path segment
    pub file_name: String,
}

/// The authoritative description of a published mod set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Opaque distribution tag, e.g. `<gameVersion>-<loaderVersion>`;
    /// displayed by clients, never interpreted by the sync logic
    pub distro_version: String,
    /// Ordered file entries
    pub files: Vec<ManifestEntry>,
}

/// Why a manifest failed to decode
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed manifest: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("invalid file name {0:?} in manifest")]
    InvalidFileName(String),
    #[error("missing mod id for file {0:?}")]
    MissingModId(String),
}

impl Manifest {
    /// Encode to the canonical pretty-printed JSON representation
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).expect("manifest serialization cannot fail")
    }

    /// Decode and validate a manifest received over the wire
    ///
    /// # Errors
    /// Returns a [`DecodeError`] if the JSON shape is wrong, a checksum is
    /// not valid hex of the expected length, a file name contains a path
    /// separator or is `.`/`..`, or a mod id is empty.
    pub fn from_json(json: &str) -> Result<Self, DecodeError> {
        let manifest: Self = serde_json::from_str(json)?;
        for entry in &manifest.files {
            if !is_valid_file_name(&entry.file_name) {
                return Err(DecodeError::InvalidFileName(entry.file_name.clone()));
            }
            if entry.mod_id.is_empty() {
                return Err(DecodeError::MissingModId(entry.file_name.clone()));
            }
        }
        Ok(manifest)
    }

    /// Persist the encoded manifest to a file
    ///
    /// # Errors
    /// Returns an error if the file cannot be written
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        std::fs::write(path, self.to_json())
    }
}

/// A manifest file name must be a bare single path segment.
fn is_valid_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
}

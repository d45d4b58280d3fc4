//! Manifest generation from a discovered candidate set

use std::collections::HashSet;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, warn};

use modsync_core::{
    compute_checksum, Candidate, Manifest, ManifestEntry, ModListSelector, ModMetadata,
};

/// Bootstrap utility jar shipped to clients out of band; never listed in
/// the manifest
pub const UTILITY_FILE_NAME: &str = "modsyncutility.jar";

/// Why a manifest build failed
#[derive(Debug, Error)]
pub enum BuildError {
    /// A selected file vanished or became unreadable between discovery
    /// and hashing. A manifest must never reference a file that cannot
    /// currently be hashed.
    #[error("cannot compute checksum for file {file_name:?}")]
    Unhashable { file_name: String },
}

/// Builds the published [`Manifest`] for a candidate collection
pub struct ManifestBuilder {
    selector: ModListSelector,
    distro_version: String,
    persist_path: Option<PathBuf>,
}

impl ManifestBuilder {
    #[must_use]
    pub fn new(excluded_mod_ids: HashSet<String>, distro_version: impl Into<String>) -> Self {
        Self {
            selector: ModListSelector::new(excluded_mod_ids),
            distro_version: distro_version.into(),
            persist_path: None,
        }
    }

    /// Also write the encoded manifest to `path` after each successful
    /// build, as a convenience artifact for external tooling. The
    /// in-memory manifest stays authoritative; a failed write is logged
    /// and otherwise ignored.
    #[must_use]
    pub fn persist_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.persist_path = Some(path.into());
        self
    }

    /// Run selection and hash every surviving candidate into a manifest.
    ///
    /// # Errors
    /// Returns [`BuildError::Unhashable`] if any selected file cannot be
    /// hashed; the whole build fails rather than publishing a manifest
    /// referencing an unavailable file.
    pub fn build(
        &self,
        candidates: Vec<Candidate>,
        metadata: &dyn ModMetadata,
    ) -> Result<Manifest, BuildError> {
        debug!("generating manifest");

        let mut files = Vec::new();
        for candidate in self.selector.select(candidates, metadata) {
            if candidate.file_name() == UTILITY_FILE_NAME {
                continue;
            }
            let Some(checksum) = compute_checksum(candidate.path()) else {
                return Err(BuildError::Unhashable {
                    file_name: candidate.file_name().to_string(),
                });
            };
            files.push(ManifestEntry {
                mod_id: metadata.mod_id(&candidate),
                checksum,
                file_name: candidate.file_name().to_string(),
            });
        }

        let manifest = Manifest {
            distro_version: self.distro_version.clone(),
            files,
        };

        if let Some(path) = &self.persist_path {
            if let Err(e) = manifest.save(path) {
                warn!("failed to persist manifest to {}: {e}", path.display());
            }
        }

        Ok(manifest)
    }
}

//! Root-restricted file lookup against the published manifest
//!
//! The manager holds one immutable "generation" (encoded manifest plus
//! the set of file names it lists) behind an `Arc` swap. Requests clone
//! the `Arc` and work against a consistent snapshot even while a rescan
//! publishes a replacement.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::warn;

use modsync_core::{resolve_direct_child, Manifest};

struct Generation {
    manifest_json: String,
    file_names: HashSet<String>,
}

impl Generation {
    fn from_manifest(manifest: &Manifest) -> Self {
        Self {
            manifest_json: manifest.to_json(),
            file_names: manifest
                .files
                .iter()
                .map(|entry| entry.file_name.clone())
                .collect(),
        }
    }
}

/// Serves manifest text and file bytes for the current generation
pub struct FileManager {
    roots: Vec<PathBuf>,
    current: RwLock<Arc<Generation>>,
}

impl FileManager {
    #[must_use]
    pub fn new(roots: Vec<PathBuf>, manifest: &Manifest) -> Self {
        Self {
            roots,
            current: RwLock::new(Arc::new(Generation::from_manifest(manifest))),
        }
    }

    /// Replace the published generation. In-flight requests keep the
    /// snapshot they already took; new requests observe the new one.
    pub fn publish(&self, manifest: &Manifest) {
        let generation = Arc::new(Generation::from_manifest(manifest));
        *self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = generation;
    }

    fn snapshot(&self) -> Arc<Generation> {
        Arc::clone(
            &self
                .current
                .read()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }

    /// The current encoded manifest, verbatim
    #[must_use]
    pub fn manifest_json(&self) -> String {
        self.snapshot().manifest_json.clone()
    }

    /// Look up a manifest-listed file under the serve roots.
    ///
    /// Names not listed in the current manifest are rejected, and the
    /// name is independently re-validated as a direct child of each root;
    /// the first root where the file validates and exists wins. Read
    /// failures degrade to `None`: externally the file is simply
    /// unavailable.
    #[must_use]
    pub fn find_file(&self, file_name: &str) -> Option<Vec<u8>> {
        let generation = self.snapshot();
        let Some(path) = self.find_path(&generation, file_name) else {
            warn!("requested file not served from any root: {file_name}");
            return None;
        };
        match std::fs::read(&path) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!("failed to read file {file_name}: {e}");
                None
            }
        }
    }

    fn find_path(&self, generation: &Generation, file_name: &str) -> Option<PathBuf> {
        if !generation.file_names.contains(file_name) {
            return None;
        }
        self.roots.iter().find_map(|root| {
            resolve_direct_child(root, file_name).filter(|path| path.exists())
        })
    }
}

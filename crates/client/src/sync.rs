//! The sync run: fetch the manifest, then fetch what differs

use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info};
use url::Url;

use modsync_core::{
    compute_checksum, resolve_direct_child, DecodeError, Manifest, ManifestEntry,
    MANIFEST_FILE_NAME,
};

use crate::progress::ProgressSink;

/// Why a sync run failed. Any failure aborts the whole run: a consumer
/// with an incomplete file set must not proceed as if it were complete.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("invalid server address {url:?}")]
    InvalidServerAddress { url: String },
    #[error("network error talking to the server: {0}")]
    Network(#[from] reqwest::Error),
    #[error("server returned HTTP {status} for {path}")]
    Http { status: u16, path: String },
    #[error("malformed server manifest: {0}")]
    Manifest(#[from] DecodeError),
    #[error("file name {0:?} escapes the target directory")]
    UnsafeFileName(String),
    #[error("failed to write {file_name}: {source}")]
    Write {
        file_name: String,
        source: std::io::Error,
    },
}

/// Pulls one server's mod set into a local target directory
pub struct SyncClient {
    http: reqwest::Client,
    base_url: Url,
    target_dir: PathBuf,
    excluded_mod_ids: HashSet<String>,
}

impl SyncClient {
    /// Create a client for `server` (an `http://` or `https://` address,
    /// trailing slash tolerated) downloading into `target_dir`.
    ///
    /// # Errors
    /// Returns an error if the address does not parse or the HTTP client
    /// cannot be constructed.
    pub fn new(
        server: &str,
        target_dir: impl Into<PathBuf>,
        excluded_mod_ids: HashSet<String>,
    ) -> Result<Self, SyncError> {
        let base_url = Url::parse(server.trim_end_matches('/')).map_err(|_| {
            SyncError::InvalidServerAddress {
                url: server.to_string(),
            }
        })?;
        if base_url.cannot_be_a_base() {
            return Err(SyncError::InvalidServerAddress {
                url: server.to_string(),
            });
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("modsync/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            target_dir: target_dir.into(),
            excluded_mod_ids,
        })
    }

    /// Run the sync to completion: manifest first, then each missing or
    /// differing file in manifest order, strictly sequentially. The
    /// first failure aborts the run.
    ///
    /// # Errors
    /// Returns a [`SyncError`] describing the step that failed.
    pub async fn sync(&self, progress: &dyn ProgressSink) -> Result<Manifest, SyncError> {
        let manifest = self.fetch_manifest(progress).await?;

        let wanted: Vec<&ManifestEntry> = manifest
            .files
            .iter()
            .filter(|entry| !self.excluded_mod_ids.contains(&entry.mod_id))
            .collect();
        debug!(
            "downloading {} of {} files from manifest",
            wanted.len(),
            manifest.files.len()
        );

        for entry in wanted {
            self.sync_file(entry, progress).await?;
        }
        debug!("finished downloading files");

        Ok(manifest)
    }

    /// Start the sync on a background task.
    ///
    /// Consumes the client, so a second in-flight sync against the same
    /// target directory is unrepresentable.
    #[must_use]
    pub fn start(self, progress: Arc<dyn ProgressSink>) -> SyncTask {
        let handle = tokio::spawn(async move { self.sync(progress.as_ref()).await });
        SyncTask { handle }
    }

    async fn fetch_manifest(&self, progress: &dyn ProgressSink) -> Result<Manifest, SyncError> {
        info!("requesting server manifest from {}", self.base_url);
        progress.progress(&format!(
            "Requesting server manifest from: {}",
            self.base_url
        ));

        let url = self.endpoint(&[MANIFEST_FILE_NAME]);
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(SyncError::Http {
                status: response.status().as_u16(),
                path: format!("/{MANIFEST_FILE_NAME}"),
            });
        }
        let body = response.text().await?;
        Ok(Manifest::from_json(&body)?)
    }

    async fn sync_file(
        &self,
        entry: &ManifestEntry,
        progress: &dyn ProgressSink,
    ) -> Result<(), SyncError> {
        let Some(target) = resolve_direct_child(&self.target_dir, &entry.file_name) else {
            return Err(SyncError::UnsafeFileName(entry.file_name.clone()));
        };

        if compute_checksum(&target).is_some_and(|hash| hash == entry.checksum) {
            debug!("found existing file {} - skipping", entry.file_name);
            return Ok(());
        }

        info!("requesting file {}", entry.file_name);
        progress.progress(&format!("Requesting file: {}", entry.file_name));

        let url = self.endpoint(&["files", &entry.file_name]);
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(SyncError::Http {
                status: response.status().as_u16(),
                path: format!("/files/{}", entry.file_name),
            });
        }
        let bytes = response.bytes().await?;

        write_replace(&target, &bytes).map_err(|source| SyncError::Write {
            file_name: entry.file_name.clone(),
            source,
        })?;
        progress.progress(&format!("Finished downloading file: {}", entry.file_name));
        Ok(())
    }

    /// Build a request URL, percent-encoding each path segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

/// A sync running on a background task
pub struct SyncTask {
    handle: tokio::task::JoinHandle<Result<Manifest, SyncError>>,
}

impl SyncTask {
    /// Wait for the sync to finish. There is no timeout; callers needing
    /// responsiveness must wrap the wait themselves. Failures are logged
    /// and collapse to `None`.
    pub async fn wait(self) -> Option<Manifest> {
        match self.handle.await {
            Ok(Ok(manifest)) => Some(manifest),
            Ok(Err(e)) => {
                error!("encountered an error while downloading server mods: {e}");
                None
            }
            Err(e) => {
                error!("sync task failed: {e}");
                None
            }
        }
    }
}

/// Write via a temporary sibling then rename, so a crashed download never
/// leaves a half-written file under the target name.
fn write_replace(target: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut tmp_name = target
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    tmp_name.push(".part");
    let tmp = target.with_file_name(tmp_name);

    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, target)
}

//! End-to-end sync tests against a real HTTP server on an ephemeral port

use std::collections::HashSet;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tempfile::TempDir;

use modsync_client::{NullSink, SyncClient, SyncError};
use modsync_core::{compute_checksum, Candidate, Manifest, ModMetadata, ModVersion};
use modsync_server::{create_router, FileManager, ManifestBuilder};

/// Metadata derived from `name-version.jar` file names, as the CLI does it.
struct FixtureMetadata;

impl ModMetadata for FixtureMetadata {
    fn mod_id(&self, candidate: &Candidate) -> String {
        let name = candidate.file_name();
        match name.trim_end_matches(".jar").rsplit_once('-') {
            Some((id, _)) => id.to_string(),
            None => name.to_string(),
        }
    }

    fn version(&self, candidate: &Candidate) -> Option<ModVersion> {
        let name = candidate.file_name();
        name.trim_end_matches(".jar")
            .rsplit_once('-')
            .map(|(_, version)| ModVersion::parse(version))
    }
}

fn discover(dir: &Path) -> Vec<Candidate> {
    let mut names: Vec<_> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    names.sort();
    names.into_iter().map(Candidate::new).collect()
}

fn build_manifest(dir: &Path, excluded: HashSet<String>) -> Manifest {
    ManifestBuilder::new(excluded, "test-1.0")
        .build(discover(dir), &FixtureMetadata)
        .unwrap()
}

/// Serve `manager` on an ephemeral port, counting `/files/` requests.
async fn spawn_server(manager: Arc<FileManager>) -> (SocketAddr, Arc<AtomicUsize>) {
    let file_requests = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&file_requests);

    let app = create_router(manager).layer(axum::middleware::from_fn(
        move |request: axum::extract::Request, next: axum::middleware::Next| {
            let counter = Arc::clone(&counter);
            async move {
                if request.uri().path().starts_with("/files/") {
                    counter.fetch_add(1, Ordering::SeqCst);
                }
                next.run(request).await
            }
        },
    ));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, file_requests)
}

fn client(addr: SocketAddr, target: &Path, excluded: HashSet<String>) -> SyncClient {
    SyncClient::new(&format!("http://{addr}"), target, excluded).unwrap()
}

#[tokio::test]
async fn end_to_end_selects_newest_and_syncs() {
    let server_dir = TempDir::new().unwrap();
    fs::write(server_dir.path().join("modA-1.0.jar"), b"old contents").unwrap();
    fs::write(server_dir.path().join("modA-2.0.jar"), b"new contents").unwrap();

    let manifest = build_manifest(server_dir.path(), HashSet::new());
    assert_eq!(manifest.files.len(), 1);
    assert_eq!(manifest.files[0].file_name, "modA-2.0.jar");
    assert_eq!(manifest.files[0].mod_id, "modA");

    let manager = Arc::new(FileManager::new(
        vec![server_dir.path().to_path_buf()],
        &manifest,
    ));
    let (addr, file_requests) = spawn_server(manager).await;

    let target_dir = TempDir::new().unwrap();
    let synced = client(addr, target_dir.path(), HashSet::new())
        .sync(&NullSink)
        .await
        .unwrap();
    assert_eq!(synced, manifest);

    let downloaded = target_dir.path().join("modA-2.0.jar");
    assert_eq!(fs::read(&downloaded).unwrap(), b"new contents");
    assert_eq!(
        compute_checksum(&downloaded).unwrap(),
        manifest.files[0].checksum
    );
    assert_eq!(fs::read_dir(target_dir.path()).unwrap().count(), 1);
    assert_eq!(file_requests.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn second_sync_skips_matching_files() {
    let server_dir = TempDir::new().unwrap();
    fs::write(server_dir.path().join("modA-1.0.jar"), b"contents").unwrap();

    let manifest = build_manifest(server_dir.path(), HashSet::new());
    let manager = Arc::new(FileManager::new(
        vec![server_dir.path().to_path_buf()],
        &manifest,
    ));
    let (addr, file_requests) = spawn_server(manager).await;

    let target_dir = TempDir::new().unwrap();
    client(addr, target_dir.path(), HashSet::new())
        .sync(&NullSink)
        .await
        .unwrap();
    assert_eq!(file_requests.load(Ordering::SeqCst), 1);

    // The local file now hashes to the manifest checksum, so a second
    // run must not issue any file request.
    client(addr, target_dir.path(), HashSet::new())
        .sync(&NullSink)
        .await
        .unwrap();
    assert_eq!(file_requests.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn changed_local_file_is_refetched() {
    let server_dir = TempDir::new().unwrap();
    fs::write(server_dir.path().join("modA-1.0.jar"), b"authoritative").unwrap();

    let manifest = build_manifest(server_dir.path(), HashSet::new());
    let manager = Arc::new(FileManager::new(
        vec![server_dir.path().to_path_buf()],
        &manifest,
    ));
    let (addr, _file_requests) = spawn_server(manager).await;

    let target_dir = TempDir::new().unwrap();
    fs::write(target_dir.path().join("modA-1.0.jar"), b"tampered").unwrap();

    client(addr, target_dir.path(), HashSet::new())
        .sync(&NullSink)
        .await
        .unwrap();
    assert_eq!(
        fs::read(target_dir.path().join("modA-1.0.jar")).unwrap(),
        b"authoritative"
    );
}

#[tokio::test]
async fn excluded_mod_is_never_fetched() {
    let server_dir = TempDir::new().unwrap();
    fs::write(server_dir.path().join("secret-1.0.jar"), b"secret").unwrap();
    fs::write(server_dir.path().join("modA-1.0.jar"), b"public").unwrap();

    // Server-side exclusion: the id never reaches the manifest.
    let excluded: HashSet<String> = ["secret".to_string()].into();
    let server_side = build_manifest(server_dir.path(), excluded.clone());
    assert!(server_side.files.iter().all(|entry| entry.mod_id != "secret"));

    // Client-side exclusion: a listed id is filtered before any fetch.
    let manifest = build_manifest(server_dir.path(), HashSet::new());
    let manager = Arc::new(FileManager::new(
        vec![server_dir.path().to_path_buf()],
        &manifest,
    ));
    let (addr, file_requests) = spawn_server(manager).await;

    let target_dir = TempDir::new().unwrap();
    client(addr, target_dir.path(), excluded)
        .sync(&NullSink)
        .await
        .unwrap();

    assert!(!target_dir.path().join("secret-1.0.jar").exists());
    assert!(target_dir.path().join("modA-1.0.jar").exists());
    assert_eq!(file_requests.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failed_file_fetch_fails_whole_sync() {
    let server_dir = TempDir::new().unwrap();
    fs::write(server_dir.path().join("modA-1.0.jar"), b"here today").unwrap();

    let manifest = build_manifest(server_dir.path(), HashSet::new());
    let manager = Arc::new(FileManager::new(
        vec![server_dir.path().to_path_buf()],
        &manifest,
    ));
    let (addr, _file_requests) = spawn_server(manager).await;

    // The file vanishes between manifest build and client fetch.
    fs::remove_file(server_dir.path().join("modA-1.0.jar")).unwrap();

    let target_dir = TempDir::new().unwrap();
    let result = client(addr, target_dir.path(), HashSet::new())
        .sync(&NullSink)
        .await;
    assert!(matches!(result, Err(SyncError::Http { status: 404, .. })));
    assert!(!target_dir.path().join("modA-1.0.jar").exists());
}

#[tokio::test]
async fn background_task_wait_collapses_failure_to_none() {
    let target_dir = TempDir::new().unwrap();

    // Nothing is listening on this address.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let task = client(addr, target_dir.path(), HashSet::new()).start(Arc::new(NullSink));
    assert_eq!(task.wait().await, None);
}

#[tokio::test]
async fn background_task_wait_returns_manifest() {
    let server_dir = TempDir::new().unwrap();
    fs::write(server_dir.path().join("modA-1.0.jar"), b"contents").unwrap();

    let manifest = build_manifest(server_dir.path(), HashSet::new());
    let manager = Arc::new(FileManager::new(
        vec![server_dir.path().to_path_buf()],
        &manifest,
    ));
    let (addr, _file_requests) = spawn_server(manager).await;

    let target_dir = TempDir::new().unwrap();
    let task = client(addr, target_dir.path(), HashSet::new()).start(Arc::new(NullSink));
    assert_eq!(task.wait().await, Some(manifest));
}

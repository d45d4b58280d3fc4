//! modsync-server: the authoritative side of modsync
//!
//! Builds the published manifest from a discovered candidate set and
//! serves it, plus the files it lists, over HTTP.

pub mod builder;
pub mod files;
pub mod http;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

pub use builder::{BuildError, ManifestBuilder, UTILITY_FILE_NAME};
pub use files::FileManager;
pub use http::create_router;

/// Serve manifest and file requests on `listener` until the task is
/// cancelled. Each connection is handled on its own task; the only state
/// shared between requests is the manager's immutable generation.
///
/// # Errors
/// Returns an error if the listener fails.
pub async fn run(listener: TcpListener, files: Arc<FileManager>) -> io::Result<()> {
    info!("modsync server active on {}", listener.local_addr()?);
    let router = create_router(files);
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
}

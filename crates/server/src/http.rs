//! HTTP front end for manifest and file requests
//!
//! Two routes, both GET: `/servermanifest.json` returns the current
//! encoded manifest, `/files/{fileName}` returns raw file bytes. Every
//! other request shape is a 400. Lookup failures of any kind are a
//! plain 404 that never says why.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Path, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tracing::{debug, info};

use crate::files::FileManager;

#[derive(Clone)]
struct HttpState {
    files: Arc<FileManager>,
}

/// Build the request router over a shared [`FileManager`]
#[must_use]
pub fn create_router(files: Arc<FileManager>) -> Router {
    Router::new()
        .route(
            "/servermanifest.json",
            get(manifest_handler).fallback(bad_request),
        )
        .route("/files/:file_name", get(file_handler).fallback(bad_request))
        .fallback(bad_request)
        .with_state(HttpState { files })
}

async fn manifest_handler(
    State(state): State<HttpState>,
    addr: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    info!("manifest request for client {}", client_address(&headers, addr));
    (
        [(header::CONTENT_TYPE, "application/json")],
        state.files.manifest_json(),
    )
}

async fn file_handler(
    State(state): State<HttpState>,
    Path(file_name): Path<String>,
) -> Response {
    let Some(bytes) = state.files.find_file(&file_name) else {
        debug!("requested file {file_name} not found");
        return (StatusCode::NOT_FOUND, "Not Found").into_response();
    };

    let mut response = (
        [(header::CONTENT_TYPE, "application/octet-stream")],
        bytes,
    )
        .into_response();
    if let Ok(value) = HeaderValue::from_str(&file_name) {
        response.headers_mut().insert("filename", value);
    }
    response
}

async fn bad_request() -> impl IntoResponse {
    (StatusCode::BAD_REQUEST, "Bad request")
}

/// Client address for request logging, preferring forwarding headers set
/// by a fronting proxy.
fn client_address(headers: &HeaderMap, addr: Option<ConnectInfo<SocketAddr>>) -> String {
    for key in ["x-forwarded-for", "forwarded-for"] {
        let forwarded: Vec<&str> = headers
            .get_all(key)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect();
        if !forwarded.is_empty() {
            return match addr {
                Some(ConnectInfo(addr)) => {
                    format!("{} (using remote address: {addr})", forwarded.join(" via "))
                }
                None => forwarded.join(" via "),
            };
        }
    }
    match addr {
        Some(ConnectInfo(addr)) => addr.to_string(),
        None => "unknown".to_string(),
    }
}

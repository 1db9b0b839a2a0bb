//! `GET /download/{key}/{file}`: redeem a download token and stream the
//! release it unlocks.
//!
//! Unknown, expired, and mismatched keys all answer with the same 404 so
//! the endpoint reveals nothing about which keys exist.

use std::io::SeekFrom;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderValue, StatusCode};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use sumd_core::ValidationError;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

use crate::error::AppError;
use crate::sniff::{self, SNIFF_LEN};
use crate::state::AppState;

const UNKNOWN_KEY: &str = "download key not found or expired";
const FILE_GONE: &str = "release file no longer available";

pub fn router() -> Router<AppState> {
    Router::new().route("/download/{key}/{file}", get(download))
}

async fn download(
    State(state): State<AppState>,
    Path((key, file)): Path<(String, String)>,
) -> Result<Response, AppError> {
    if key.trim().is_empty() {
        return Err(ValidationError::EmptyField("key").into());
    }

    let release = state
        .tokens
        .redeem(&key)
        .filter(|release| release.file() == file)
        .ok_or_else(|| AppError::NotFound(UNKNOWN_KEY.into()))?;

    let path = release.resolve(&state.config.release_root);
    let mut artifact = match File::open(&path).await {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(release = %release, "download token outlived its file");
            return Err(AppError::NotFound(FILE_GONE.into()));
        }
        Err(e) => {
            return Err(AppError::Internal(format!("opening {}: {e}", path.display())));
        }
    };
    let len = artifact.metadata().await?.len();

    let mut head = Vec::with_capacity(SNIFF_LEN);
    (&mut artifact)
        .take(SNIFF_LEN as u64)
        .read_to_end(&mut head)
        .await?;
    let content_type = sniff::content_type(&head);
    artifact.seek(SeekFrom::Start(0)).await?;

    tracing::info!(release = %release, bytes = len, content_type, "streaming release");

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type)
        .header(CONTENT_LENGTH, len)
        .header(CONTENT_DISPOSITION, attachment(release.file())?)
        .body(Body::from_stream(ReaderStream::new(artifact)))
        .map_err(|e| AppError::Internal(e.to_string()))
}

/// `attachment; filename="<file>"`, with quotes and backslashes escaped.
fn attachment(file: &str) -> Result<HeaderValue, AppError> {
    let escaped = file.replace('\\', "\\\\").replace('"', "\\\"");
    HeaderValue::from_bytes(format!("attachment; filename=\"{escaped}\"").as_bytes())
        .map_err(|e| AppError::Internal(format!("content-disposition for {file:?}: {e}")))
}

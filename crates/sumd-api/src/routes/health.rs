//! Health probes. Mounted outside the traced API router.

use axum::extract::State;
use axum::http::StatusCode;

use crate::state::AppState;

/// Liveness probe: 200 while the process is running.
pub async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: 200 when the release root is a readable directory.
pub async fn readiness(State(state): State<AppState>) -> Result<&'static str, (StatusCode, &'static str)> {
    match tokio::fs::read_dir(&state.config.release_root).await {
        Ok(_) => Ok("ready"),
        Err(e) => {
            tracing::warn!(
                root = %state.config.release_root.display(),
                error = %e,
                "release root unavailable"
            );
            Err((StatusCode::SERVICE_UNAVAILABLE, "release root unavailable"))
        }
    }
}

//! `POST /verify`: authenticate a release claim and issue a download link.

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};

use crate::error::AppError;
use crate::extractors::parse_json;
use crate::pipeline::{self, VerificationClaim, VerificationResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/verify", post(verify_release))
}

async fn verify_release(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<VerificationResult>, AppError> {
    let claim: VerificationClaim = parse_json(body)?;
    tracing::debug!(
        record = %claim.token,
        product = %claim.product,
        version = %claim.version,
        file = %claim.file,
        "verification requested"
    );
    pipeline::verify(&state, &claim).await.map(Json)
}

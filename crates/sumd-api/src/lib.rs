//! # sumd-api — Release Verification Service
//!
//! Verifies release artifacts against checksums published in an
//! authenticated remote record, and hands out expiring download links for
//! the artifacts that match.
//!
//! ## API Surface
//!
//! | Route | Module | Purpose |
//! |-------|--------|---------|
//! | `POST /verify` | [`routes::verify`] | Verify a release claim, issue a download link |
//! | `GET /download/{key}/{file}` | [`routes::download`] | Redeem a link, stream the artifact |
//! | `GET /health/liveness` | [`routes::health`] | Process is up |
//! | `GET /health/readiness` | [`routes::health`] | Release root is readable |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! CorsLayer → TraceLayer → Handler
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod extractors;
pub mod pipeline;
pub mod routes;
pub mod sniff;
pub mod state;

use std::time::Duration;

use axum::http::Method;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// How long browsers may cache a CORS preflight answer.
const CORS_MAX_AGE: Duration = Duration::from_secs(86_400);

/// Assemble the application router with all routes and middleware.
///
/// Health probes are mounted outside the trace layer to keep probe traffic
/// out of request logs.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .max_age(CORS_MAX_AGE);

    let api = Router::new()
        .merge(routes::verify::router())
        .merge(routes::download::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state.clone());

    let health = Router::new()
        .route("/health/liveness", get(routes::health::liveness))
        .route("/health/readiness", get(routes::health::readiness))
        .with_state(state);

    Router::new().merge(health).merge(api)
}

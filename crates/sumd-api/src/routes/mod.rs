//! # API Route Modules
//!
//! - `verify` — `POST /verify`, runs the release verification pipeline.
//! - `download` — `GET /download/{key}/{file}`, redeems a download token and
//!   streams the artifact.
//! - `health` — liveness and readiness probes.

pub mod download;
pub mod health;
pub mod verify;

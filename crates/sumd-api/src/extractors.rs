//! # Request Extraction
//!
//! Handlers take the raw body as `Result<Bytes, BytesRejection>` and pass it
//! through [`parse_json`]. The body is decoded as JSON whatever the request's
//! `Content-Type`, and every failure surfaces in the standard error envelope
//! instead of axum's plain-text rejection.

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// Decode a JSON body, mapping read and decode failures to
/// [`AppError::Validation`].
pub fn parse_json<T: DeserializeOwned>(body: Result<Bytes, BytesRejection>) -> Result<T, AppError> {
    let bytes = body.map_err(|err| AppError::Validation(err.body_text()))?;
    serde_json::from_slice(&bytes)
        .map_err(|err| AppError::Validation(format!("invalid JSON body: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::Request;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Claim {
        name: String,
    }

    async fn extract(body: &'static str, content_type: Option<&str>) -> Result<Claim, AppError> {
        let mut req = Request::builder().method("POST");
        if let Some(ct) = content_type {
            req = req.header("content-type", ct);
        }
        let req = req.body(Body::from(body)).unwrap();
        parse_json(Bytes::from_request(req, &()).await)
    }

    #[tokio::test]
    async fn valid_body_passes_through() {
        let claim = extract(r#"{"name":"x"}"#, Some("application/json")).await.unwrap();
        assert_eq!(claim.name, "x");
    }

    #[tokio::test]
    async fn syntax_error_is_validation() {
        let err = extract("{not json", Some("application/json")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.starts_with("invalid JSON body")));
    }

    #[tokio::test]
    async fn content_type_is_not_required() {
        let claim = extract(r#"{"name":"plain"}"#, Some("text/plain")).await.unwrap();
        assert_eq!(claim.name, "plain");
        let claim = extract(r#"{"name":"bare"}"#, None).await.unwrap();
        assert_eq!(claim.name, "bare");
    }

    #[tokio::test]
    async fn wrong_shape_is_validation() {
        let err = extract(r#"{"name":7}"#, None).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}

//! API utility functions
//!
//! Stateless helpers for reading JSON request bodies, kept out of
//! services.rs so they can be unit tested without a router.

use axum::body::Body;
use axum::http::{HeaderMap, header};
use http_body_util::{BodyExt, Limited};
use serde::de::DeserializeOwned;

use crate::api::error::ApiError;

/// Parses and validates Content-Type header for application/json
///
/// Accepts `application/json` with or without parameters; rejects
/// `application/jsonp`, `text/json` and malformed media types.
pub fn parse_content_type(content_type: &str) -> Result<mime::Mime, ApiError> {
    let media_type: mime::Mime = content_type.parse().map_err(|_| {
        ApiError::InvalidPayload(format!("invalid Content-Type: {content_type}"))
    })?;

    if media_type.type_() != mime::APPLICATION || media_type.subtype() != mime::JSON {
        return Err(ApiError::InvalidPayload(format!(
            "Content-Type must be application/json, got: {}/{}",
            media_type.type_(),
            media_type.subtype()
        )));
    }

    Ok(media_type)
}

/// Checks the Content-Type header, reads at most `max_size` bytes and
/// deserializes them.
pub async fn read_json<T: DeserializeOwned>(
    headers: &HeaderMap,
    body: Body,
    max_size: usize,
) -> Result<T, ApiError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::InvalidPayload("missing Content-Type header".into()))?;
    parse_content_type(content_type)?;

    let bytes = Limited::new(body, max_size)
        .collect()
        .await
        .map_err(|err| {
            if err.is::<http_body_util::LengthLimitError>() {
                ApiError::PayloadTooLarge(max_size)
            } else {
                ApiError::Internal(err.to_string())
            }
        })?
        .to_bytes();

    Ok(serde_json::from_slice(&bytes)?)
}

use axum::{Json, http::StatusCode, response::IntoResponse};
use thiserror::Error;

use super::models::ErrorResponse;
use crate::extractor::ExtractError;
use crate::proxy::ProxyError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidPayload(String),
    #[error("payload too large: limit is {0} bytes")]
    PayloadTooLarge(usize),
    #[error(transparent)]
    Extraction(#[from] ExtractError),
    #[error(transparent)]
    Proxy(#[from] ProxyError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Extraction(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Proxy(err) => match err {
                ProxyError::MissingUrl { .. } | ProxyError::InvalidScheme { .. } => {
                    StatusCode::BAD_REQUEST
                }
                ProxyError::Upstream { .. } => StatusCode::BAD_GATEWAY,
                ProxyError::Fetch { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidPayload(_) => "INVALID_PAYLOAD",
            ApiError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            ApiError::Extraction(_) => "UPSTREAM_UNREACHABLE",
            ApiError::Proxy(ProxyError::MissingUrl { .. } | ProxyError::InvalidScheme { .. }) => {
                "INVALID_PAYLOAD"
            }
            ApiError::Proxy(ProxyError::Upstream { .. }) => "UPSTREAM_REJECTED",
            ApiError::Proxy(ProxyError::Fetch { .. }) => "UPSTREAM_UNREACHABLE",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn body(&self) -> ErrorResponse {
        let (status, id) = match self {
            ApiError::Proxy(err @ ProxyError::Upstream { status, .. }) => {
                (Some(*status), Some(err.id().to_string()))
            }
            ApiError::Proxy(err) => (None, Some(err.id().to_string())),
            _ => (None, None),
        };

        ErrorResponse {
            error: self.to_string(),
            status,
            id,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "Request failed");
        } else {
            tracing::debug!(code = self.code(), error = %self, "Request rejected");
        }

        (status, Json(self.body())).into_response()
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(value: serde_json::Error) -> Self {
        ApiError::InvalidPayload(format!("invalid JSON body: {value}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_upstream_rejection_body() {
        let err = ApiError::from(ProxyError::Upstream {
            status: 404,
            id: "abc".to_string(),
        });

        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            serde_json::to_value(err.body()).unwrap(),
            json!({"error": "Remote fetch failed", "status": 404, "id": "abc"})
        );
    }

    #[test]
    fn test_validation_body_has_no_id() {
        let err = ApiError::InvalidPayload("Missing url in body".to_string());

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            serde_json::to_value(err.body()).unwrap(),
            json!({"error": "Missing url in body"})
        );
    }

    #[test]
    fn test_invalid_scheme_maps_to_bad_request() {
        let err = ApiError::from(ProxyError::InvalidScheme {
            id: "x".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "INVALID_PAYLOAD");
        assert_eq!(err.body().id.as_deref(), Some("x"));
    }
}

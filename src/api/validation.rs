//! Upfront checks on request input; all of them run before any I/O.

use serde_json::Value;

use super::error::ApiError;
use super::models::{ExtractFilesRequest, MetadataRequest};
use crate::proxy::has_http_scheme;

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// The share URL to extract from
pub fn validate_metadata_request(request: MetadataRequest) -> Result<String, ApiError> {
    let url = non_empty(request.url)
        .ok_or_else(|| ApiError::InvalidPayload("Missing url in body".to_string()))?;

    if !has_http_scheme(&url) {
        return Err(ApiError::InvalidPayload(format!(
            "url must be an http/https URL, got: {url}"
        )));
    }

    Ok(url)
}

/// The metadata to normalize and the share URL it came from (may be empty)
pub fn validate_extract_files_request(
    request: ExtractFilesRequest,
) -> Result<(Value, String), ApiError> {
    let metadata = request
        .metadata
        .filter(|m| !m.is_null())
        .ok_or_else(|| ApiError::InvalidPayload("Missing metadata in body".to_string()))?;

    Ok((metadata, non_empty(request.share_url).unwrap_or_default()))
}

pub fn validate_logs_id(id: Option<String>) -> Result<String, ApiError> {
    non_empty(id).ok_or_else(|| ApiError::InvalidPayload("Missing id".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_metadata_request() {
        let ok = validate_metadata_request(MetadataRequest {
            url: Some(" https://share.example.com/s/1 ".to_string()),
        });
        assert_eq!(ok.unwrap(), "https://share.example.com/s/1");

        for url in [None, Some(String::new()), Some("   ".to_string())] {
            let err = validate_metadata_request(MetadataRequest { url }).unwrap_err();
            assert_eq!(err.to_string(), "Missing url in body");
        }

        assert!(matches!(
            validate_metadata_request(MetadataRequest {
                url: Some("javascript:alert(1)".to_string())
            }),
            Err(ApiError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_extract_files_request() {
        let (metadata, share_url) = validate_extract_files_request(ExtractFilesRequest {
            metadata: Some(json!({"success": false})),
            share_url: None,
        })
        .unwrap();
        assert_eq!(metadata, json!({"success": false}));
        assert!(share_url.is_empty());

        let err = validate_extract_files_request(ExtractFilesRequest {
            metadata: Some(Value::Null),
            share_url: Some("https://x".to_string()),
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "Missing metadata in body");
    }

    #[test]
    fn test_logs_id() {
        assert_eq!(validate_logs_id(Some("abc".to_string())).unwrap(), "abc");
        assert!(validate_logs_id(None).is_err());
        assert!(validate_logs_id(Some(String::new())).is_err());
    }
}

//! Request and response bodies of the HTTP API.
//!
//! Field names follow the browser client (`shareUrl`, `directUrl`), so a few
//! structs rename to camelCase.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::logs::LogEntry;
use crate::normalize::{FileEntry, FileListing};
use crate::observability::MetricsSnapshot;

/// `POST /api/metadata`
#[derive(Debug, Deserialize)]
pub struct MetadataRequest {
    #[serde(default)]
    pub url: Option<String>,
}

/// `POST /api/extract-files`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractFilesRequest {
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(default)]
    pub share_url: Option<String>,
}

/// `GET /api/proxy`
#[derive(Debug, Deserialize)]
pub struct ProxyQuery {
    pub url: Option<String>,
    pub id: Option<String>,
}

/// `GET /api/logs`
#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    pub id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LogsResponse {
    pub id: String,
    pub logs: Vec<LogEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct FileListResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<FileEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl From<FileListing> for FileListResponse {
    fn from(listing: FileListing) -> Self {
        let ok = listing.is_ok();
        let mut response = Self {
            ok,
            files: None,
            raw: None,
            message: None,
            metadata: None,
        };
        match listing {
            FileListing::Files(files) => response.files = Some(files),
            FileListing::Raw(raw) => response.raw = Some(raw),
            FileListing::Unresolved { message, metadata } => {
                response.message = Some(message);
                response.metadata = Some(metadata);
            }
        }
        response
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub metrics: MetricsSnapshot,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_file_list_response_shapes() {
        let files = FileListResponse::from(FileListing::Files(vec![FileEntry {
            name: Some("a.mp4".to_string()),
            size: None,
            direct_url: None,
        }]));
        assert_eq!(
            serde_json::to_value(files).unwrap(),
            json!({"ok": true, "files": [{"name": "a.mp4", "size": null, "directUrl": null}]})
        );

        let unresolved = FileListResponse::from(FileListing::Unresolved {
            message: "nothing".to_string(),
            metadata: json!({"source": "raw"}),
        });
        assert_eq!(
            serde_json::to_value(unresolved).unwrap(),
            json!({"ok": false, "message": "nothing", "metadata": {"source": "raw"}})
        );
    }

    #[test]
    fn test_extract_files_request_accepts_camel_case() {
        let request: ExtractFilesRequest =
            serde_json::from_value(json!({"metadata": {}, "shareUrl": "https://x/s"})).unwrap();
        assert_eq!(request.share_url.as_deref(), Some("https://x/s"));
        assert!(request.metadata.is_some());
    }
}

//! Extraction results as they travel over the wire.
//!
//! An [`ExtractionResult`] serializes flat, with `source` selecting the
//! variant:
//!
//! ```json
//! { "success": true, "source": "embedded-json", "data": { "a": 1 } }
//! { "success": true, "source": "heuristic-dom", "data": { "files": ["a.mp4"] } }
//! { "success": false, "source": "raw", "html": "<html>..." }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub success: bool,
    #[serde(flatten)]
    pub extraction: Extraction,
}

impl ExtractionResult {
    pub fn embedded(manifest: EmbeddedManifest) -> Self {
        Self {
            success: true,
            extraction: Extraction::EmbeddedJson(manifest),
        }
    }

    pub fn heuristic(files: Vec<String>) -> Self {
        Self {
            success: true,
            extraction: Extraction::HeuristicDom {
                data: DomFiles { files },
            },
        }
    }

    pub fn raw(html: String) -> Self {
        Self {
            success: false,
            extraction: Extraction::Raw { html },
        }
    }

    pub fn source(&self) -> Source {
        match self.extraction {
            Extraction::EmbeddedJson(_) => Source::EmbeddedJson,
            Extraction::HeuristicDom { .. } => Source::HeuristicDom,
            Extraction::Raw { .. } => Source::Raw,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source")]
pub enum Extraction {
    #[serde(rename = "embedded-json")]
    EmbeddedJson(EmbeddedManifest),
    #[serde(rename = "heuristic-dom")]
    HeuristicDom { data: DomFiles },
    #[serde(rename = "raw")]
    Raw { html: String },
}

/// Which strategy produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    EmbeddedJson,
    HeuristicDom,
    Raw,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::EmbeddedJson => "embedded-json",
            Source::HeuristicDom => "heuristic-dom",
            Source::Raw => "raw",
        }
    }
}

/// Page state recovered from a script assignment, plus what the follow-up
/// discovery found
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EmbeddedManifest {
    pub data: Value,
    #[serde(rename = "pcftoken", default, skip_serializing_if = "Option::is_none")]
    pub pcf_token: Option<String>,
    #[serde(rename = "jsToken", default, skip_serializing_if = "Option::is_none")]
    pub js_token: Option<String>,
    #[serde(rename = "apiDomain", default, skip_serializing_if = "Option::is_none")]
    pub api_domain: Option<Value>,
    #[serde(rename = "guessFileList", default, skip_serializing_if = "Option::is_none")]
    pub guess_file_list: Option<GuessFileList>,
}

impl EmbeddedManifest {
    pub fn new(data: Value) -> Self {
        Self {
            data,
            ..Self::default()
        }
    }
}

/// The list-API candidate that answered, and what it answered with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuessFileList {
    pub url: String,
    #[serde(flatten)]
    pub payload: ListPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListPayload {
    Json(Value),
    Html(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomFiles {
    pub files: Vec<String>,
}

//! Turns an extraction result into a flat list of downloadable files

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::extractor::{Extraction, ExtractionResult, ListPayload};

/// Keys under which a list-API response may carry its file array
const LIST_KEYS: &[&str] = &["list", "file_list", "items", "data", "files"];
/// Keys under which an embedded manifest may carry its file array
const MANIFEST_KEYS: &[&str] = &["file_list", "files"];

const NAME_KEYS: &[&str] = &["filename", "name", "path", "server_filename"];
const SIZE_KEYS: &[&str] = &["size", "filesize", "size_byte"];
const URL_KEYS: &[&str] = &["url", "download_url", "dlink"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub name: Option<String>,
    pub size: Option<u64>,
    pub direct_url: Option<String>,
}

impl FileEntry {
    pub fn from_value(value: &Value) -> Self {
        let Some(fields) = value.as_object() else {
            return Self {
                name: value.as_str().map(str::to_owned),
                size: None,
                direct_url: None,
            };
        };

        Self {
            name: first_string(fields, NAME_KEYS),
            size: SIZE_KEYS
                .iter()
                .find_map(|key| fields.get(*key).and_then(as_size)),
            direct_url: first_string(fields, URL_KEYS),
        }
    }
}

fn first_string(fields: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| fields.get(*key).and_then(Value::as_str))
        .map(str::to_owned)
}

/// Sizes arrive as numbers or as numeric strings
fn as_size(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FileListing {
    Files(Vec<FileEntry>),
    /// JSON from the list API that carries no recognizable file array
    Raw(Value),
    Unresolved { message: String, metadata: Value },
}

impl FileListing {
    pub fn is_ok(&self) -> bool {
        !matches!(self, FileListing::Unresolved { .. })
    }
}

/// Secondary list payload first, then the embedded manifest, then give up.
pub fn normalize(metadata: &ExtractionResult, share_url: &str) -> FileListing {
    if let Extraction::EmbeddedJson(manifest) = &metadata.extraction {
        if let Some(ListPayload::Json(payload)) =
            manifest.guess_file_list.as_ref().map(|g| &g.payload)
        {
            return match find_array(payload, LIST_KEYS) {
                Some(items) => FileListing::Files(entries(items)),
                None => FileListing::Raw(payload.clone()),
            };
        }

        if let Some(items) = manifest_files(&manifest.data) {
            return FileListing::Files(entries(items));
        }
    }

    FileListing::Unresolved {
        message: format!(
            "no file list found for {share_url} (source: {})",
            metadata.source().as_str()
        ),
        metadata: serde_json::to_value(metadata).unwrap_or(Value::Null),
    }
}

fn entries(items: &[Value]) -> Vec<FileEntry> {
    items.iter().map(FileEntry::from_value).collect()
}

/// First key in `keys` whose value is an array
fn find_array<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Vec<Value>> {
    keys.iter()
        .find_map(|key| value.get(*key).and_then(Value::as_array))
}

/// `file_list`/`files` at the top level or under `data`, either an array or
/// an object wrapping a `list` array
fn manifest_files(data: &Value) -> Option<&Vec<Value>> {
    fn lookup(node: &Value) -> Option<&Vec<Value>> {
        MANIFEST_KEYS.iter().find_map(|key| {
            let found = node.get(*key)?;
            found
                .as_array()
                .or_else(|| found.get("list").and_then(Value::as_array))
        })
    }

    lookup(data).or_else(|| data.get("data").and_then(lookup))
}

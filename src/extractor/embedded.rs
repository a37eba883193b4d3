//! Page state assigned to JavaScript globals inside the share page

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use std::sync::{Arc, LazyLock};
use tracing::debug;

use super::list_api::ListApiProbe;
use super::strategy::{ExtractionStrategy, SharePage};
use super::tokens::{ShareTokens, share_id};
use super::types::{EmbeddedManifest, ExtractionResult};
use crate::config::ExtractorConfig;
use crate::http::HttpClient;

/// Known global-assignment idioms, most specific first
static PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("initial-state", r"(?s)window\.__INITIAL_STATE__\s*=\s*(\{.*?\});"),
        ("initial-data", r"(?s)window\.__INITIAL_DATA__\s*=\s*(\{.*?\});"),
        ("shareinfo", r"(?s)var\s+shareinfo\s*=\s*(\{.*?\});"),
        (
            "script-file-list",
            r#"(?is)<script[^>]*>.*?(\{\s*"file_list".*?\}).*?</script>"#,
        ),
    ]
    .into_iter()
    .map(|(name, pattern)| (name, Regex::new(pattern).expect("valid regex")))
    .collect()
});

fn try_parse(candidate: &str) -> Option<Value> {
    serde_json::from_str(candidate).ok()
}

/// First pattern whose first match parses as JSON
pub fn find_embedded_json(html: &str) -> Option<Value> {
    PATTERNS.iter().find_map(|(name, regex)| {
        let candidate = regex.captures(html)?.get(1)?.as_str();
        let parsed = try_parse(candidate);
        if parsed.is_none() {
            debug!(pattern = name, "Embedded JSON candidate did not parse");
        }
        parsed
    })
}

pub struct EmbeddedJsonStrategy {
    client: Arc<HttpClient>,
    config: ExtractorConfig,
}

impl EmbeddedJsonStrategy {
    pub fn new(client: Arc<HttpClient>, config: ExtractorConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl ExtractionStrategy for EmbeddedJsonStrategy {
    fn name(&self) -> &'static str {
        "embedded-json"
    }

    async fn extract(&self, page: &SharePage) -> Option<ExtractionResult> {
        let data = find_embedded_json(&page.html)?;
        let tokens = ShareTokens::discover(&page.html);

        let guess_file_list = match (share_id(&page.url), tokens.api_base()) {
            (Some(id), Some(base)) if tokens.has_token() => {
                let probe = ListApiProbe {
                    client: &self.client,
                    paths: &self.config.list_api_paths,
                    snippet_chars: self.config.snippet_chars,
                };
                probe.run(&page.url, &id, &base, &tokens).await
            }
            _ => {
                debug!(url = %page.url, "Skipping list API probe");
                None
            }
        };

        Some(ExtractionResult::embedded(EmbeddedManifest {
            data,
            pcf_token: tokens.pcf_token,
            js_token: tokens.js_token,
            api_domain: tokens.api_domain,
            guess_file_list,
        }))
    }
}

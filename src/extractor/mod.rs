//! Share-page metadata extraction
//!
//! The page is fetched once, then handed to an ordered list of
//! [`ExtractionStrategy`] implementations. The first strategy that returns a
//! result wins; when none applies, the raw HTML (truncated) is returned for
//! manual inspection.
//!
//! | order | strategy                 | source          |
//! |-------|--------------------------|-----------------|
//! | 1     | [`EmbeddedJsonStrategy`] | `embedded-json` |
//! | 2     | [`HeuristicDomStrategy`] | `heuristic-dom` |
//! | -     | raw fallback             | `raw`           |

mod dom;
mod embedded;
mod list_api;
mod strategy;
mod tokens;
pub mod types;

pub use dom::{HeuristicDomStrategy, scan_filenames};
pub use embedded::{EmbeddedJsonStrategy, find_embedded_json};
pub use strategy::{ExtractionStrategy, SharePage};
pub use tokens::{ShareTokens, share_id};
pub use types::{
    DomFiles, EmbeddedManifest, Extraction, ExtractionResult, GuessFileList, ListPayload, Source,
};

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::ExtractorConfig;
use crate::http::{HttpClient, HttpError};

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to fetch share page: {0}")]
    Fetch(#[from] HttpError),
}

pub struct Extractor {
    client: Arc<HttpClient>,
    strategies: Vec<Box<dyn ExtractionStrategy>>,
    raw_html_limit: usize,
}

impl Extractor {
    /// Embedded JSON first, DOM heuristics second
    pub fn new(client: Arc<HttpClient>, config: &ExtractorConfig) -> Self {
        let strategies: Vec<Box<dyn ExtractionStrategy>> = vec![
            Box::new(EmbeddedJsonStrategy::new(client.clone(), config.clone())),
            Box::new(HeuristicDomStrategy::new(config.max_filename_chars)),
        ];
        Self::with_strategies(client, strategies, config.raw_html_limit)
    }

    pub fn with_strategies(
        client: Arc<HttpClient>,
        strategies: Vec<Box<dyn ExtractionStrategy>>,
        raw_html_limit: usize,
    ) -> Self {
        Self {
            client,
            strategies,
            raw_html_limit,
        }
    }

    /// Only a failure to fetch the share page itself is an error.
    pub async fn extract(&self, share_url: &str) -> Result<ExtractionResult, ExtractError> {
        let fetched = self.client.fetch_page(share_url, &[]).await?;
        if !fetched.is_success() {
            debug!(url = share_url, status = fetched.status, "Share page answered non-2xx");
        }

        let page = SharePage {
            url: share_url.to_string(),
            html: fetched.body,
        };
        Ok(self.run(&page).await)
    }

    /// Runs the strategies against an already fetched page.
    pub async fn run(&self, page: &SharePage) -> ExtractionResult {
        for strategy in &self.strategies {
            if let Some(result) = strategy.extract(page).await {
                info!(url = %page.url, strategy = strategy.name(), "Extraction succeeded");
                return result;
            }
            debug!(url = %page.url, strategy = strategy.name(), "Strategy found nothing");
        }

        info!(url = %page.url, "No strategy matched, returning raw html");
        ExtractionResult::raw(truncate_chars(&page.html, self.raw_html_limit).to_string())
    }
}

/// Longest prefix of `s` holding at most `max` characters
pub(crate) fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpConfig;
    use serde_json::json;

    fn extractor() -> Extractor {
        let client = Arc::new(HttpClient::new(&HttpConfig::default()).unwrap());
        Extractor::new(client, &ExtractorConfig::default())
    }

    fn page(html: impl Into<String>) -> SharePage {
        SharePage {
            url: "https://share.example.com/s/1abc".to_string(),
            html: html.into(),
        }
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[tokio::test]
    async fn test_embedded_json_wins() {
        let result = extractor()
            .run(&page(r#"window.__INITIAL_STATE__ = {"a":1};"#))
            .await;

        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"success": true, "source": "embedded-json", "data": {"a": 1}})
        );
    }

    #[tokio::test]
    async fn test_shareinfo_roundtrip() {
        let embedded = json!({"title": "Trip", "file_list": [{"filename": "a.mp4", "size": 10}]});
        let html = format!(
            "<html><script>var shareinfo = {};</script><li>b.mkv</li></html>",
            serde_json::to_string(&embedded).unwrap()
        );

        let result = extractor().run(&page(html)).await;
        assert_eq!(result.source(), Source::EmbeddedJson);
        let Extraction::EmbeddedJson(manifest) = result.extraction else {
            panic!("expected embedded-json");
        };
        assert_eq!(manifest.data, embedded);
        assert!(manifest.guess_file_list.is_none());
    }

    #[tokio::test]
    async fn test_dom_fallback() {
        let result = extractor()
            .run(&page("<ul><li>one.mp4</li><li>two.zip</li></ul>"))
            .await;

        assert!(result.success);
        assert_eq!(
            result.extraction,
            Extraction::HeuristicDom {
                data: DomFiles {
                    files: vec!["one.mp4".to_string(), "two.zip".to_string()]
                }
            }
        );
    }

    #[tokio::test]
    async fn test_raw_fallback_is_truncated() {
        let html = format!("<p>{}</p>", "x".repeat(30_000));
        let result = extractor().run(&page(html)).await;

        assert!(!result.success);
        let Extraction::Raw { html } = result.extraction else {
            panic!("expected raw");
        };
        assert_eq!(html.chars().count(), 20_000);
        assert!(html.starts_with("<p>xxx"));
    }

    #[tokio::test]
    async fn test_unreachable_share_page_is_an_error() {
        let result = extractor().extract("http://127.0.0.1:1/share").await;
        assert!(matches!(result, Err(ExtractError::Fetch(_))));
    }
}

//! Filename-looking text scraped from the rendered page

use async_trait::async_trait;
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;

use super::strategy::{ExtractionStrategy, SharePage};
use super::types::ExtractionResult;

static FILE_EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.[A-Za-z0-9_]{2,6}$").expect("valid regex"));

static CANDIDATES: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a, li, div, span").expect("valid selector"));

/// Texts of `a, li, div, span` elements in document order, without dedup
pub fn scan_filenames(html: &str, max_chars: usize) -> Vec<String> {
    let document = Html::parse_document(html);

    document
        .select(&CANDIDATES)
        .filter_map(|element| {
            let text = element.text().collect::<String>();
            let text = text.trim();
            let looks_like_file = !text.is_empty()
                && text.chars().count() < max_chars
                && FILE_EXTENSION.is_match(text);
            looks_like_file.then(|| text.to_string())
        })
        .collect()
}

pub struct HeuristicDomStrategy {
    max_chars: usize,
}

impl HeuristicDomStrategy {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }
}

#[async_trait]
impl ExtractionStrategy for HeuristicDomStrategy {
    fn name(&self) -> &'static str {
        "heuristic-dom"
    }

    async fn extract(&self, page: &SharePage) -> Option<ExtractionResult> {
        let files = scan_filenames(&page.html, self.max_chars);
        (!files.is_empty()).then(|| ExtractionResult::heuristic(files))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_order_without_dedup() {
        let html = r#"
            <ul>
              <li>holiday.mp4</li>
              <li>notes</li>
            </ul>
            <a href="/x">archive.tar.gz</a>
            <span>holiday.mp4</span>
        "#;

        assert_eq!(
            scan_filenames(html, 200),
            vec!["holiday.mp4", "archive.tar.gz", "holiday.mp4"]
        );
    }

    #[test]
    fn test_extension_bounds() {
        let html = "<span>a.b</span><span>clip.webm</span><span>x.abcdefg</span>";
        assert_eq!(scan_filenames(html, 200), vec!["clip.webm"]);
    }

    #[test]
    fn test_length_bound() {
        let long = format!("{}.mp4", "a".repeat(196));
        let html = format!("<div>{long}</div><div>short.mp4</div>");
        assert_eq!(scan_filenames(&html, 200), vec!["short.mp4"]);
    }

    #[test]
    fn test_nested_elements_each_count() {
        let html = "<div><a>video.mkv</a></div>";
        assert_eq!(scan_filenames(html, 200), vec!["video.mkv", "video.mkv"]);
    }
}

//! Follow-up calls against the share site's internal list API

use serde_json::Value;
use tracing::debug;

use super::tokens::ShareTokens;
use super::truncate_chars;
use super::types::{GuessFileList, ListPayload};
use crate::http::{HttpClient, Page};

/// Body substrings that mark a list response even without a JSON content type
const LIST_MARKERS: &[&str] = &["file_list", ".mp4"];

/// Tries each candidate path in order; the first acceptable answer wins.
pub struct ListApiProbe<'a> {
    pub client: &'a HttpClient,
    pub paths: &'a [String],
    pub snippet_chars: usize,
}

impl ListApiProbe<'_> {
    pub async fn run(
        &self,
        share_url: &str,
        share_id: &str,
        api_base: &str,
        tokens: &ShareTokens,
    ) -> Option<GuessFileList> {
        let mut headers = tokens.headers();
        headers.push(("Referer", share_url));

        for url in candidate_urls(api_base, self.paths, share_id) {
            match self.client.fetch_page(&url, &headers).await {
                Ok(page) if is_list_response(&page) => {
                    debug!(%url, status = page.status, "List API candidate accepted");
                    return Some(GuessFileList {
                        payload: payload_of(page, self.snippet_chars),
                        url,
                    });
                }
                Ok(page) => {
                    debug!(%url, status = page.status, "List API candidate rejected");
                }
                Err(e) => {
                    debug!(%url, error = %e, "List API candidate unreachable");
                }
            }
        }

        None
    }
}

pub(crate) fn candidate_urls(api_base: &str, paths: &[String], share_id: &str) -> Vec<String> {
    let share_id = urlencoding::encode(share_id);
    let base = api_base.trim_end_matches('/');

    paths
        .iter()
        .map(|path| format!("{base}{}", path.replace("{share_id}", &share_id)))
        .collect()
}

fn is_list_response(page: &Page) -> bool {
    page.is_success()
        && (page.declares_json() || LIST_MARKERS.iter().any(|m| page.body.contains(m)))
}

fn payload_of(page: Page, snippet_chars: usize) -> ListPayload {
    match serde_json::from_str::<Value>(&page.body) {
        Ok(json) => ListPayload::Json(json),
        Err(_) => ListPayload::Html(truncate_chars(&page.body, snippet_chars).to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page(status: u16, content_type: Option<&str>, body: &str) -> Page {
        Page {
            status,
            content_type: content_type.map(str::to_owned),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_candidate_urls_substitute_share_id() {
        let paths = vec![
            "/share/list?shorturl={share_id}&root=1".to_string(),
            "/api/info".to_string(),
        ];

        assert_eq!(
            candidate_urls("https://api.example.com/", &paths, "a b"),
            vec![
                "https://api.example.com/share/list?shorturl=a%20b&root=1",
                "https://api.example.com/api/info",
            ]
        );
    }

    #[test]
    fn test_list_response_acceptance() {
        assert!(is_list_response(&page(200, Some("application/json"), "{}")));
        assert!(is_list_response(&page(200, Some("text/html"), "<b>file_list</b>")));
        assert!(is_list_response(&page(200, None, "movie.mp4")));
        assert!(!is_list_response(&page(200, Some("text/html"), "<p>login</p>")));
        assert!(!is_list_response(&page(403, Some("application/json"), "{}")));
    }

    #[test]
    fn test_payload_prefers_json() {
        assert_eq!(
            payload_of(page(200, None, r#"{"list":[]}"#), 10),
            ListPayload::Json(json!({"list": []}))
        );
        assert_eq!(
            payload_of(page(200, None, "<ul>file_list and more</ul>"), 10),
            ListPayload::Html("<ul>file_l".to_string())
        );
    }
}

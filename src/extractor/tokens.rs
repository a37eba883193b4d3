//! Authentication tokens and the alternate API domain embedded in share pages

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use url::Url;

static PCF_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)["']?pcftoken["']?\s*[:=]\s*["']([^"']+)["']"#).expect("valid regex")
});

static JS_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"["']?jsToken["']?\s*[:=]\s*["']([^"']+)["']"#).expect("valid regex")
});

/// The decoded jsToken wraps the real token in a quoted hex literal.
static HEX_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"["']([0-9A-Fa-f]{40,})["']"#).expect("valid regex"));

static API_DOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"["']?(?:apiDomain|api_domain)["']?\s*[:=]\s*(\{[^{}]*\}|"[^"]*"|'[^']*')"#)
        .expect("valid regex")
});

/// Keys probed, in order, when the API domain is an object
const DOMAIN_KEYS: &[&str] = &["url", "domain", "host", "origin"];

/// Query parameters that identify a share
const SHARE_ID_PARAMS: &[&str] = &["surl", "shareid"];

/// Everything the list-API probe needs from the page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShareTokens {
    pub pcf_token: Option<String>,
    pub js_token: Option<String>,
    /// As written in the page: an object or a string
    pub api_domain: Option<Value>,
}

impl ShareTokens {
    pub fn discover(html: &str) -> Self {
        Self {
            pcf_token: pcf_token(html),
            js_token: js_token(html),
            api_domain: api_domain(html),
        }
    }

    pub fn has_token(&self) -> bool {
        self.pcf_token.is_some() || self.js_token.is_some()
    }

    /// Headers carried by every list-API probe, Referer excluded
    pub fn headers(&self) -> Vec<(&'static str, &str)> {
        let mut headers = Vec::with_capacity(2);
        if let Some(token) = &self.pcf_token {
            headers.push(("pcftoken", token.as_str()));
        }
        if let Some(token) = &self.js_token {
            headers.push(("jstoken", token.as_str()));
        }
        headers
    }

    /// Origin the list-API paths are resolved against
    pub fn api_base(&self) -> Option<String> {
        let raw = match self.api_domain.as_ref()? {
            Value::String(s) => s.as_str(),
            Value::Object(map) => DOMAIN_KEYS
                .iter()
                .find_map(|key| map.get(*key).and_then(Value::as_str))?,
            _ => return None,
        };

        let raw = raw.trim().trim_end_matches('/');
        if raw.is_empty() {
            return None;
        }

        let base = if raw.starts_with("http://") || raw.starts_with("https://") {
            raw.to_string()
        } else {
            format!("https://{}", raw.trim_start_matches("//"))
        };

        Url::parse(&base).ok().map(|_| base)
    }
}

fn pcf_token(html: &str) -> Option<String> {
    PCF_TOKEN
        .captures(html)
        .map(|caps| caps[1].trim().to_string())
        .filter(|token| !token.is_empty())
}

/// Percent-decodes the assignment, then pulls out the hex literal inside.
/// Malformed encoding falls back to the raw value; no literal means no token.
fn js_token(html: &str) -> Option<String> {
    let raw = JS_TOKEN.captures(html)?.get(1)?.as_str();
    let decoded = urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string());

    HEX_LITERAL
        .captures(&decoded)
        .map(|caps| caps[1].to_string())
}

fn api_domain(html: &str) -> Option<Value> {
    let literal = API_DOMAIN.captures(html)?.get(1)?.as_str();

    if literal.starts_with('{') {
        serde_json::from_str::<Value>(literal)
            .ok()
            .filter(Value::is_object)
    } else {
        let inner = &literal[1..literal.len() - 1];
        (!inner.trim().is_empty()).then(|| Value::String(inner.to_string()))
    }
}

/// The share identifier from `surl` or `shareid`, in that order
pub fn share_id(share_url: &str) -> Option<String> {
    let url = Url::parse(share_url).ok()?;

    SHARE_ID_PARAMS.iter().find_map(|param| {
        url.query_pairs()
            .find(|(key, value)| key == param && !value.is_empty())
            .map(|(_, value)| value.into_owned())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const HEX: &str = "0123456789ABCDEF0123456789ABCDEF0123456789ABCDEF";

    #[test]
    fn test_pcf_token_variants() {
        assert_eq!(pcf_token(r#"{"pcftoken":"abc123"}"#).as_deref(), Some("abc123"));
        assert_eq!(pcf_token("var pcftoken = 'x-y-z';").as_deref(), Some("x-y-z"));
        assert_eq!(pcf_token(r#"{"pcftoken":""}"#), None);
        assert_eq!(pcf_token("<html></html>"), None);
    }

    #[test]
    fn test_js_token_decodes_and_extracts_hex() {
        let html = format!(r#"{{"jsToken":"function%20fn%28a%29%7B%7D%3Bfn%28%22{HEX}%22%29"}}"#);
        assert_eq!(js_token(&html).as_deref(), Some(HEX));
    }

    #[test]
    fn test_js_token_without_hex_literal_is_absent() {
        assert_eq!(js_token(r#"{"jsToken":"fn%28%22short%22%29"}"#), None);
    }

    #[test]
    fn test_js_token_malformed_encoding_uses_raw_value() {
        // %FF decodes to invalid UTF-8; the raw value still holds no quotes
        let html = r#"{"jsToken":"%FF%22abc%22"}"#;
        assert_eq!(js_token(html), None);
    }

    #[test]
    fn test_api_domain_string_and_object() {
        let tokens = ShareTokens::discover(r#"window.apiDomain = "api.example.com/";"#);
        assert_eq!(tokens.api_domain, Some(json!("api.example.com/")));
        assert_eq!(tokens.api_base().as_deref(), Some("https://api.example.com"));

        let tokens = ShareTokens::discover(r#"{"api_domain":{"host":"http://10.0.0.1:8080"}}"#);
        assert_eq!(tokens.api_base().as_deref(), Some("http://10.0.0.1:8080"));

        let tokens = ShareTokens::discover(r#"{"apiDomain":{"region":"eu"}}"#);
        assert!(tokens.api_domain.is_some());
        assert_eq!(tokens.api_base(), None);
    }

    #[test]
    fn test_headers_only_carry_known_tokens() {
        let tokens = ShareTokens {
            pcf_token: Some("p".to_string()),
            ..ShareTokens::default()
        };
        assert!(tokens.has_token());
        assert_eq!(tokens.headers(), vec![("pcftoken", "p")]);

        assert!(!ShareTokens::default().has_token());
    }

    #[test]
    fn test_share_id() {
        assert_eq!(
            share_id("https://www.example.com/sharing/link?surl=abcDEF").as_deref(),
            Some("abcDEF")
        );
        assert_eq!(
            share_id("https://www.example.com/s/x?shareid=42&surl=").as_deref(),
            Some("42")
        );
        assert_eq!(share_id("https://www.example.com/s/1abc"), None);
        assert_eq!(share_id("not a url"), None);
    }
}

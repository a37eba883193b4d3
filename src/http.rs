//! Outbound HTTP client shared by the extractor and the proxy

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::config::HttpConfig;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Connection timeout")]
    Timeout,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Too many redirects")]
    TooManyRedirects,

    #[error("Invalid header {0}")]
    InvalidHeader(String),
}

pub type Result<T> = std::result::Result<T, HttpError>;

impl From<reqwest::Error> for HttpError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            HttpError::Timeout
        } else if e.is_redirect() {
            HttpError::TooManyRedirects
        } else if e.is_builder() {
            HttpError::InvalidUrl(e.to_string())
        } else {
            HttpError::RequestFailed(e.to_string())
        }
    }
}

/// A fetched page: final status, declared content type and decoded body
#[derive(Debug, Clone)]
pub struct Page {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl Page {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// `application/json`, `text/json` and `+json` suffixes all count.
    pub fn declares_json(&self) -> bool {
        self.content_type.as_deref().is_some_and(is_json_media_type)
    }
}

/// True when a Content-Type value names a JSON media type
pub fn is_json_media_type(content_type: &str) -> bool {
    let Ok(media_type) = content_type.parse::<mime::Mime>() else {
        return false;
    };

    media_type.subtype() == mime::JSON || media_type.suffix() == Some(mime::JSON)
}

/// Browser-impersonating HTTP client
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    page_timeout: Duration,
}

impl HttpClient {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| HttpError::RequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            page_timeout: config.page_timeout(),
        })
    }

    /// Fetch a page and read its body as text, whatever the status.
    pub async fn fetch_page(&self, url: &str, headers: &[(&str, &str)]) -> Result<Page> {
        debug!(url, "Fetching page");

        let response = self
            .client
            .get(url)
            .headers(build_headers(headers)?)
            .timeout(self.page_timeout)
            .send()
            .await?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = response.text().await?;

        debug!(url, status, size = body.len(), "Page fetched");

        Ok(Page {
            status,
            content_type,
            body,
        })
    }

    /// Start a download and hand back the response before the body is read.
    ///
    /// No total timeout applies: proxied files can be arbitrarily large.
    pub async fn open(&self, url: &str) -> Result<Response> {
        debug!(url, "Opening remote resource");
        Ok(self.client.get(url).send().await?)
    }
}

fn build_headers(headers: &[(&str, &str)]) -> Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for &(name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| HttpError::InvalidHeader(name.to_string()))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| HttpError::InvalidHeader(name.to_string()))?;
        map.insert(name, value);
    }
    Ok(map)
}

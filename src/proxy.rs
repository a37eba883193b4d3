//! Streaming download proxy with per-request event logging
//!
//! Every operation is keyed by a correlation id. The log for that id reads:
//!
//! ```text
//! Starting proxy for <url>
//! Fetching remote resource...
//! Remote OK. Content-Type: <type>
//! streamed <n> bytes            (once per chunk)
//! stream end | stream error: <e> | stream aborted: client disconnected
//! ```
//!
//! Dropping the response body drops the upstream stream, which aborts the
//! upstream request.

use bytes::Bytes;
use futures::Stream;
use futures::stream::BoxStream;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use thiserror::Error;
use tracing::{info, warn};
use url::Url;
use uuid::Uuid;

use crate::http::{HttpClient, HttpError};
use crate::humanize::ByteSize;
use crate::logs::LogStore;
use crate::observability::Metrics;

pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Missing url query param")]
    MissingUrl { id: String },

    #[error("Invalid URL protocol")]
    InvalidScheme { id: String },

    #[error("Remote fetch failed")]
    Upstream { status: u16, id: String },

    #[error("{source}")]
    Fetch { source: HttpError, id: String },
}

impl ProxyError {
    pub fn id(&self) -> &str {
        match self {
            ProxyError::MissingUrl { id }
            | ProxyError::InvalidScheme { id }
            | ProxyError::Upstream { id, .. }
            | ProxyError::Fetch { id, .. } => id,
        }
    }
}

/// Upstream response whose headers are known and whose body is still pending
pub struct ProxyDownload {
    pub id: String,
    pub content_type: String,
    pub content_disposition: Option<String>,
    pub content_length: Option<u64>,
    pub body: LoggedStream,
}

#[derive(Clone)]
pub struct ProxyService {
    client: Arc<HttpClient>,
    logs: LogStore,
    metrics: Arc<Metrics>,
}

impl ProxyService {
    pub fn new(client: Arc<HttpClient>, logs: LogStore, metrics: Arc<Metrics>) -> Self {
        Self {
            client,
            logs,
            metrics,
        }
    }

    /// Validates the URL, opens the upstream request and wraps its body.
    ///
    /// A missing or empty `id` gets a fresh UUID.
    pub async fn open(
        &self,
        url: Option<&str>,
        id: Option<&str>,
    ) -> Result<ProxyDownload, ProxyError> {
        let id = id
            .filter(|id| !id.is_empty())
            .map(str::to_owned)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        self.metrics.proxy_requested();
        let result = self.start(url, id).await;
        if let Err(e) = &result {
            self.metrics.proxy_failed();
            warn!(id = e.id(), error = %e, "Proxy request failed");
        }
        result
    }

    async fn start(&self, url: Option<&str>, id: String) -> Result<ProxyDownload, ProxyError> {
        let url = url.filter(|url| !url.is_empty());
        self.logs.append(
            &id,
            format!("Starting proxy for {}", url.unwrap_or("<none>")),
        );

        let Some(url) = url else {
            self.logs.append(&id, "No remote URL provided");
            return Err(ProxyError::MissingUrl { id });
        };

        if !has_http_scheme(url) {
            self.logs.append(&id, "Invalid protocol");
            return Err(ProxyError::InvalidScheme { id });
        }

        self.logs.append(&id, "Fetching remote resource...");
        let response = match self.client.open(url).await {
            Ok(response) => response,
            Err(source) => {
                self.logs.append(&id, format!("Error: {source}"));
                return Err(ProxyError::Fetch { source, id });
            }
        };

        let status = response.status();
        if !status.is_success() {
            self.logs
                .append(&id, format!("Remote responded with status {}", status.as_u16()));
            return Err(ProxyError::Upstream {
                status: status.as_u16(),
                id,
            });
        }

        let header = |name: reqwest::header::HeaderName| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned)
        };
        let content_type = header(reqwest::header::CONTENT_TYPE);
        let content_disposition = header(reqwest::header::CONTENT_DISPOSITION);
        let content_length = response.content_length();

        self.logs.append(
            &id,
            format!(
                "Remote OK. Content-Type: {}",
                content_type.as_deref().unwrap_or("<none>")
            ),
        );
        info!(%id, url, ?content_length, "Streaming remote resource");

        let body = LoggedStream::new(
            Box::pin(response.bytes_stream()),
            id.clone(),
            content_length,
            self.logs.clone(),
            self.metrics.clone(),
        );

        Ok(ProxyDownload {
            id,
            content_type: content_type.unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
            content_disposition,
            content_length,
            body,
        })
    }
}

/// Unparseable URLs count as having the wrong scheme.
pub fn has_http_scheme(url: &str) -> bool {
    Url::parse(url).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}

/// Upstream body that logs each chunk and exactly one terminal entry
///
/// When the length is known the stream ends itself after the last byte:
/// hyper stops polling a body once `Content-Length` bytes are written, so
/// the end of the inner stream would never be observed.
pub struct LoggedStream {
    inner: BoxStream<'static, reqwest::Result<Bytes>>,
    id: String,
    expected: Option<u64>,
    logs: LogStore,
    metrics: Arc<Metrics>,
    total: u64,
    finished: bool,
}

impl LoggedStream {
    fn new(
        inner: BoxStream<'static, reqwest::Result<Bytes>>,
        id: String,
        expected: Option<u64>,
        logs: LogStore,
        metrics: Arc<Metrics>,
    ) -> Self {
        let mut stream = Self {
            inner,
            id,
            expected,
            logs,
            metrics,
            total: 0,
            finished: false,
        };
        if expected == Some(0) {
            stream.finish();
        }
        stream
    }

    fn finish(&mut self) {
        self.finished = true;
        self.logs.append(&self.id, "stream end");
        info!(id = %self.id, total = %ByteSize(self.total), "Stream complete");
    }
}

impl Stream for LoggedStream {
    type Item = reqwest::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.finished {
            return Poll::Ready(None);
        }

        let polled = this.inner.as_mut().poll_next(cx);
        match &polled {
            Poll::Ready(Some(Ok(chunk))) => {
                this.total += chunk.len() as u64;
                this.metrics.streamed(chunk.len());
                this.logs
                    .append(&this.id, format!("streamed {} bytes", chunk.len()));
                if this.expected.is_some_and(|expected| this.total >= expected) {
                    this.finish();
                }
            }
            Poll::Ready(Some(Err(e))) => {
                this.finished = true;
                this.logs.append(&this.id, format!("stream error: {e}"));
                warn!(id = %this.id, error = %e, "Upstream stream failed");
            }
            Poll::Ready(None) => this.finish(),
            Poll::Pending => {}
        }
        polled
    }
}

impl Drop for LoggedStream {
    fn drop(&mut self) {
        if !self.finished {
            self.logs
                .append(&self.id, "stream aborted: client disconnected");
            info!(id = %self.id, total = %ByteSize(self.total), "Client went away mid-stream");
        }
    }
}

//! In-process counters reported by the health endpoint

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::extractor::Source;

#[derive(Debug, Default)]
pub struct Metrics {
    metadata_requests: AtomicU64,
    extracted_embedded: AtomicU64,
    extracted_dom: AtomicU64,
    extracted_raw: AtomicU64,
    extraction_failures: AtomicU64,
    proxy_requests: AtomicU64,
    proxy_failures: AtomicU64,
    bytes_streamed: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metadata_requested(&self) {
        self.metadata_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn extracted(&self, source: Source) {
        let counter = match source {
            Source::EmbeddedJson => &self.extracted_embedded,
            Source::HeuristicDom => &self.extracted_dom,
            Source::Raw => &self.extracted_raw,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = source.as_str(), "Metric incremented");
    }

    pub fn extraction_failed(&self) {
        self.extraction_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn proxy_requested(&self) {
        self.proxy_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn proxy_failed(&self) {
        self.proxy_failures.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "proxy_failures", "Metric incremented");
    }

    pub fn streamed(&self, bytes: usize) {
        self.bytes_streamed.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            metadata_requests: self.metadata_requests.load(Ordering::Relaxed),
            extracted_embedded: self.extracted_embedded.load(Ordering::Relaxed),
            extracted_dom: self.extracted_dom.load(Ordering::Relaxed),
            extracted_raw: self.extracted_raw.load(Ordering::Relaxed),
            extraction_failures: self.extraction_failures.load(Ordering::Relaxed),
            proxy_requests: self.proxy_requests.load(Ordering::Relaxed),
            proxy_failures: self.proxy_failures.load(Ordering::Relaxed),
            bytes_streamed: self.bytes_streamed.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub metadata_requests: u64,
    pub extracted_embedded: u64,
    pub extracted_dom: u64,
    pub extracted_raw: u64,
    pub extraction_failures: u64,
    pub proxy_requests: u64,
    pub proxy_failures: u64,
    pub bytes_streamed: u64,
}

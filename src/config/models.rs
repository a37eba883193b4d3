use crate::humanize::ByteSize;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub extractor: ExtractorConfig,
    #[serde(default)]
    pub logs: LogStoreConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
    /// Upper bound for JSON request bodies
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: ByteSize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 3000))
}

fn default_max_body_bytes() -> ByteSize {
    ByteSize::mib(1)
}

/// Outbound HTTP client settings, shared by the extractor and the proxy
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    /// Share sites reject non-browser clients
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Applies to share pages and list-API probes, never to proxied bodies
    #[serde(default = "default_page_timeout_secs")]
    pub page_timeout_secs: u64,
}

impl HttpConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            connect_timeout_secs: default_connect_timeout_secs(),
            page_timeout_secs: default_page_timeout_secs(),
        }
    }
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/124.0 Safari/537.36"
        .to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_page_timeout_secs() -> u64 {
    30
}

/// Share-page extraction limits and list-API candidates
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractorConfig {
    /// Characters of page HTML returned by the raw fallback
    #[serde(default = "default_raw_html_limit")]
    pub raw_html_limit: usize,
    /// DOM texts at or above this length are never filenames
    #[serde(default = "default_max_filename_chars")]
    pub max_filename_chars: usize,
    /// Characters kept from a non-JSON list-API body
    #[serde(default = "default_snippet_chars")]
    pub snippet_chars: usize,
    /// Paths tried against the alternate API domain, `{share_id}` is substituted
    #[serde(default = "default_list_api_paths")]
    pub list_api_paths: Vec<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            raw_html_limit: default_raw_html_limit(),
            max_filename_chars: default_max_filename_chars(),
            snippet_chars: default_snippet_chars(),
            list_api_paths: default_list_api_paths(),
        }
    }
}

fn default_raw_html_limit() -> usize {
    20_000
}

fn default_max_filename_chars() -> usize {
    200
}

fn default_snippet_chars() -> usize {
    2_000
}

fn default_list_api_paths() -> Vec<String> {
    vec![
        "/share/list?shorturl={share_id}&root=1".to_string(),
        "/api/shorturlinfo?shorturl={share_id}&root=1".to_string(),
        "/share/filelist?shareid={share_id}".to_string(),
    ]
}

/// Proxy log retention
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogStoreConfig {
    /// Maximum number of correlation ids kept
    #[serde(default = "default_log_capacity")]
    pub capacity: u64,
    /// Ids untouched for this long are evicted
    #[serde(default = "default_idle_ttl_secs")]
    pub idle_ttl_secs: u64,
}

impl LogStoreConfig {
    pub fn idle_ttl(&self) -> Duration {
        Duration::from_secs(self.idle_ttl_secs)
    }
}

impl Default for LogStoreConfig {
    fn default() -> Self {
        Self {
            capacity: default_log_capacity(),
            idle_ttl_secs: default_idle_ttl_secs(),
        }
    }
}

fn default_log_capacity() -> u64 {
    10_000
}

fn default_idle_ttl_secs() -> u64 {
    3_600
}

//! sharebox settings
//!
//! Four sections, each optional:
//!
//! - `server`: listen address and the JSON body cap (`max_body_bytes`, at most 16MB)
//! - `http`: the browser user agent and timeouts for share pages and list-API calls
//! - `extractor`: raw HTML cap, filename length cap, list-API snippet size and paths
//! - `logs`: how many proxy correlation ids are kept and for how long
//!
//! Values come from struct defaults, then `config/sharebox.toml` (or the
//! file named by `SHAREBOX_CONFIG`), then `.env`, then `SHAREBOX__SECTION__KEY`
//! variables such as `SHAREBOX__EXTRACTOR__RAW_HTML_LIMIT=5000`. A bare `PORT`
//! variable replaces only the port of `server.bind_addr`. The merged result is
//! validated before use: zero limits, an empty user agent and list-API paths
//! without a leading `/` are rejected.
//!
//! ```no_run
//! use sharebox::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("sharebox binds {}", config.server.bind_addr);
//! ```

mod models;
mod sources;
mod validation;

pub use crate::humanize::ByteSize;
pub use models::{Config, ExtractorConfig, HttpConfig, LogStoreConfig, ServerConfig};
pub use validation::ValidationError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file is malformed or a limit
    /// fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }
}

use std::sync::Arc;

use crate::config::Config;
use crate::extractor::Extractor;
use crate::http::{HttpClient, HttpError};
use crate::logs::LogStore;
use crate::observability::Metrics;
use crate::proxy::ProxyService;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub extractor: Arc<Extractor>,
    pub proxy: ProxyService,
    pub logs: LogStore,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    /// Wires one HTTP client and one log store into every component.
    pub fn new(config: Config) -> Result<Self, HttpError> {
        let client = Arc::new(HttpClient::new(&config.http)?);
        let logs = LogStore::from_config(&config.logs);
        let metrics = Arc::new(Metrics::new());

        Ok(Self {
            extractor: Arc::new(Extractor::new(client.clone(), &config.extractor)),
            proxy: ProxyService::new(client, logs.clone(), metrics.clone()),
            logs,
            metrics,
            config: Arc::new(config),
        })
    }
}

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::ledger::ReportStore;
use crate::observability::Metrics;
use crate::storage::StorageClient;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<ReportStore>,
    pub storage: Arc<StorageClient>,
    /// Shared outbound client for tracker forwarding and credential checks.
    pub http: reqwest::Client,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(config: Config, store: ReportStore, storage: StorageClient) -> Self {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            config: Arc::new(config),
            store: Arc::new(store),
            storage: Arc::new(storage),
            http,
            metrics: Arc::new(Metrics::new()),
        }
    }
}

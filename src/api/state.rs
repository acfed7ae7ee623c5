// src/api/state.rs
use crate::client::{ApiClient, StatusSource, WebhookSubmitter};
use crate::config::AppConfig;
use crate::polling::PollRegistry;
use reqwest::Client;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub api: ApiClient,
    pub webhook: WebhookSubmitter,
    pub polls: Arc<PollRegistry>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let client = Client::new();
        let api = ApiClient::from_config(client.clone(), &config);
        let source: Arc<dyn StatusSource> = Arc::new(api.clone());
        Self::with_status_source(config, client, api, source)
    }

    /// Builds the state with polling driven by `source` instead of the API client.
    pub fn with_status_source(
        config: AppConfig,
        client: Client,
        api: ApiClient,
        source: Arc<dyn StatusSource>,
    ) -> Self {
        let webhook = WebhookSubmitter::from_config(client, &config);
        let polls = PollRegistry::new(source, config.poll.clone());
        Self {
            config: Arc::new(config),
            api,
            webhook,
            polls,
        }
    }
}

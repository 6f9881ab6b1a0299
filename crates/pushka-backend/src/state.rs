use std::{path::PathBuf, sync::Arc, time::Duration};

use pushka_bridge::config::Config;

use crate::{
    bootstrap::{BootstrapStateMachine, HttpReadinessCheck, ReadinessCheck, StaticDestination},
    enrichment::{NotificationEnricher, fetcher::BoundedFetcher},
    token::{InMemoryTokenStore, TokenStore},
};

/// The core application state that holds configuration and the long-lived
/// services shared across async tasks.
///
/// It is designed to be wrapped in [`SharedState`] so handlers can read it
/// concurrently.
#[derive(Clone)]
pub struct State {
    /// The loaded application configuration.
    pub config: Config,
    /// Root under which each enrichment gets its own scope.
    pub scratch_dir: PathBuf,
    pub token_store: Arc<dyn TokenStore>,
    pub bootstrap: Arc<BootstrapStateMachine>,
    pub enricher: NotificationEnricher,
}

impl State {
    /// Builds every service from `config` around one pooled HTTP client.
    pub fn from_config(config: Config) -> Self {
        let request_client = reqwest::Client::new();
        let scratch_dir = crate::config::scratch_dir(&config);

        let fetcher = BoundedFetcher::new(
            request_client.clone(),
            Duration::from_secs(config.enrichment.fetch_timeout_secs),
        );

        let readiness: Arc<dyn ReadinessCheck> =
            match reqwest::Url::parse(&config.bootstrap.initial_url) {
                Ok(url) => Arc::new(HttpReadinessCheck::new(request_client, url)),
                Err(error) => {
                    log::warn!(
                        "Invalid readiness endpoint {:?}: {error}",
                        config.bootstrap.initial_url
                    );
                    Arc::new(UnreachableEndpoint(error.to_string()))
                }
            };
        let destination = StaticDestination::parse(config.bootstrap.target_url.as_deref());

        Self {
            scratch_dir,
            token_store: Arc::new(InMemoryTokenStore::default()),
            bootstrap: Arc::new(BootstrapStateMachine::new(readiness, Arc::new(destination))),
            enricher: NotificationEnricher::new(fetcher),
            config,
        }
    }
}

/// Readiness check for an endpoint that could not even be parsed.
struct UnreachableEndpoint(String);

#[async_trait::async_trait]
impl ReadinessCheck for UnreachableEndpoint {
    async fn should_show_content(&self) -> Result<bool, crate::error::CheckError> {
        Err(crate::error::CheckError::Request(self.0.clone()))
    }
}

/// Thread-safe, async-friendly shared reference to the application [`State`].
pub type SharedState = Arc<tokio::sync::RwLock<State>>;

use async_trait::async_trait;
use reqwest::Url;

use crate::error::CheckError;

/// Asks whether rich content should be shown at startup.
#[async_trait]
pub trait ReadinessCheck: Send + Sync {
    async fn should_show_content(&self) -> Result<bool, CheckError>;
}

/// Supplies a destination that is already known before any check runs.
pub trait TargetDestination: Send + Sync {
    fn target_url(&self) -> Option<Url>;
}

/// Readiness check backed by a single GET: any 2xx answer means "show".
#[derive(Debug, Clone)]
pub struct HttpReadinessCheck {
    client: reqwest::Client,
    url: Url,
}

impl HttpReadinessCheck {
    pub fn new(client: reqwest::Client, url: Url) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl ReadinessCheck for HttpReadinessCheck {
    async fn should_show_content(&self) -> Result<bool, CheckError> {
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|error| CheckError::Request(error.without_url().to_string()))?;

        let status = response.status();
        log::debug!("Readiness check answered HTTP {}", status.as_u16());
        Ok(status.is_success())
    }
}

/// Destination fixed up front, e.g. from configuration or a deep link.
#[derive(Debug, Clone, Default)]
pub struct StaticDestination {
    url: Option<Url>,
}

impl StaticDestination {
    pub fn new(url: Option<Url>) -> Self {
        Self { url }
    }

    /// Parses `raw`, treating unparsable values as "no destination".
    pub fn parse(raw: Option<&str>) -> Self {
        let url = raw.and_then(|raw| match Url::parse(raw) {
            Ok(url) => Some(url),
            Err(error) => {
                log::warn!("Ignoring invalid target URL {raw:?}: {error}");
                None
            }
        });
        Self { url }
    }
}

impl TargetDestination for StaticDestination {
    fn target_url(&self) -> Option<Url> {
        self.url.clone()
    }
}

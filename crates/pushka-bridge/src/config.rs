use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Settings for the notification enrichment pipeline.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    /// Wall-clock budget for a single image download, in seconds.
    pub fetch_timeout_secs: u64,
    /// How long the in-process host lets an enrichment run before it raises
    /// the expiry signal, in seconds.
    pub extension_deadline_secs: u64,
    /// Directory under which every enrichment gets its own scoped folder. The
    /// system temporary directory is used when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scratch_dir: Option<PathBuf>,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: 25,
            extension_deadline_secs: 30,
            scratch_dir: None,
        }
    }
}

/// Settings for the startup routing check.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Endpoint queried to decide whether rich content should be shown.
    pub initial_url: String,
    /// Destination supplied from outside (e.g. a deep link). When present the
    /// readiness check is skipped entirely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_url: Option<String>,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            initial_url: "https://example.com/".to_string(),
            target_url: None,
        }
    }
}

/// Global application configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Configuration for attachment enrichment.
    pub enrichment: EnrichmentConfig,
    /// Configuration for startup routing.
    pub bootstrap: BootstrapConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults_for_missing_fields() {
        let config: Config = toml::from_str(
            r#"
            [bootstrap]
            target_url = "https://deep.link/landing"
            "#,
        )
        .unwrap();

        assert_eq!(config.enrichment.fetch_timeout_secs, 25);
        assert_eq!(config.enrichment.extension_deadline_secs, 30);
        assert!(config.enrichment.scratch_dir.is_none());
        assert_eq!(config.bootstrap.initial_url, "https://example.com/");
        assert_eq!(
            config.bootstrap.target_url.as_deref(),
            Some("https://deep.link/landing")
        );
    }
}

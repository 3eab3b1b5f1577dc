use anyhow::{Context, Result};
use gcp_client::ClientConfig;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Load a `.env` file from the working directory or its parents into the
/// process environment. Variables that are already set are kept.
pub fn load_dotenv() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

/// Client settings loaded from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub quota_project: Option<String>,
    pub endpoint: Option<String>,
    pub request_timeout_secs: u64,
    pub poll_interval_ms: u64,
    pub operation_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// The binary loads `.env` first (see [`load_dotenv`]).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through `lookup` instead of the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Ok(Self {
            quota_project: non_empty("GOOGLE_CLOUD_QUOTA_PROJECT"),
            endpoint: non_empty("CLOUD_SAMPLES_ENDPOINT"),
            request_timeout_secs: non_empty("CLOUD_SAMPLES_REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|| "60".to_string())
                .parse()
                .context("CLOUD_SAMPLES_REQUEST_TIMEOUT_SECS must be a valid number")?,
            poll_interval_ms: non_empty("CLOUD_SAMPLES_POLL_INTERVAL_MS")
                .unwrap_or_else(|| "1000".to_string())
                .parse()
                .context("CLOUD_SAMPLES_POLL_INTERVAL_MS must be a valid number")?,
            operation_timeout_secs: non_empty("CLOUD_SAMPLES_OPERATION_TIMEOUT_SECS")
                .unwrap_or_else(|| "300".to_string())
                .parse()
                .context("CLOUD_SAMPLES_OPERATION_TIMEOUT_SECS must be a valid number")?,
        })
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            endpoint_override: self.endpoint.clone(),
            quota_project: self.quota_project.clone(),
            user_agent: concat!("cloud-samples/", env!("CARGO_PKG_VERSION")).to_string(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            operation_timeout: Duration::from_secs(self.operation_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.quota_project, None);
        assert_eq!(config.endpoint, None);
        assert_eq!(config.request_timeout_secs, 60);
        assert_eq!(config.poll_interval_ms, 1000);
        assert_eq!(config.operation_timeout_secs, 300);
    }

    #[test]
    fn test_overrides_flow_into_client_config() {
        let config = Config::from_lookup(lookup(&[
            ("GOOGLE_CLOUD_QUOTA_PROJECT", "billing"),
            ("CLOUD_SAMPLES_ENDPOINT", "http://localhost:9090"),
            ("CLOUD_SAMPLES_POLL_INTERVAL_MS", "50"),
        ]))
        .unwrap();

        let client = config.client_config();
        assert_eq!(client.quota_project.as_deref(), Some("billing"));
        assert_eq!(client.endpoint_override.as_deref(), Some("http://localhost:9090"));
        assert_eq!(client.poll_interval, Duration::from_millis(50));
        assert!(client.user_agent.starts_with("cloud-samples/"));
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = Config::from_lookup(lookup(&[("CLOUD_SAMPLES_ENDPOINT", "  ")])).unwrap();
        assert_eq!(config.endpoint, None);
    }

    #[test]
    fn test_malformed_number_is_error() {
        let err = Config::from_lookup(lookup(&[("CLOUD_SAMPLES_REQUEST_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains("CLOUD_SAMPLES_REQUEST_TIMEOUT_SECS"));
    }
}

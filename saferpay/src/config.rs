//! Configuration for the Saferpay client

use crate::credentials::CredentialPolicy;
use serde::{Deserialize, Serialize};

/// Saferpay client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the hosting interface; endpoint paths are appended
    pub base_url: String,

    /// Request timeout applied by the bundled transport
    pub timeout_seconds: u64,

    /// When production accounts must supply `spPassword`
    pub credential_policy: CredentialPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: crate::DEFAULT_BASE_URL.to_string(),
            timeout_seconds: crate::DEFAULT_REQUEST_TIMEOUT_SECONDS,
            credential_policy: CredentialPolicy::default(),
        }
    }
}

impl Config {
    /// Load from a TOML file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            crate::Error::Configuration(format!(
                "Failed to read {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_toml(&content)
    }

    /// Parse from TOML text
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content)
            .map_err(|e| crate::Error::Configuration(format!("Failed to parse config: {}", e)))
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(url) = std::env::var("SAFERPAY_BASE_URL") {
            config.base_url = url;
        }

        if let Ok(timeout) = std::env::var("SAFERPAY_TIMEOUT_SECONDS") {
            config.timeout_seconds = timeout.parse().map_err(|e| {
                crate::Error::Configuration(format!("SAFERPAY_TIMEOUT_SECONDS: {}", e))
            })?;
        }

        if let Ok(policy) = std::env::var("SAFERPAY_CREDENTIAL_POLICY") {
            config.credential_policy = policy.parse()?;
        }

        Ok(config)
    }
}

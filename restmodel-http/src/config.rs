use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// HTTP provider configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpProviderConfig {
    /// Base URL every entity endpoint is joined to (e.g. `https://api.example.com/v1`).
    pub base_url: String,
    /// Whole-request timeout handed to the HTTP client, in seconds. Must be
    /// greater than zero.
    pub timeout_secs: u64,
    /// Headers sent with every request.
    pub headers: BTreeMap<String, String>,
}

impl HttpProviderConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }
}

impl Default for HttpProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost".to_string(),
            timeout_secs: 30,
            headers: BTreeMap::new(),
        }
    }
}

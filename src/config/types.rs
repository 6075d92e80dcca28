use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the dashboard model client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default = "default_base_url")]
    pub restapi_base_url: String,

    /// Default polling period for subscriptions and retries.
    #[serde(default = "default_query_interval_ms")]
    pub restapi_query_interval_ms: u64,

    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_locator_prefix")]
    pub locator_prefix: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            restapi_base_url: default_base_url(),
            restapi_query_interval_ms: default_query_interval_ms(),
            request_timeout_secs: default_timeout_secs(),
            locator_prefix: default_locator_prefix(),
            api_token: None,
        }
    }
}

impl Config {
    pub fn restapi_query_interval(&self) -> Duration {
        Duration::from_millis(self.restapi_query_interval_ms.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:7045/smart/api/v1".to_string()
}

fn default_query_interval_ms() -> u64 {
    1000
}

fn default_timeout_secs() -> u64 {
    8
}

fn default_locator_prefix() -> String {
    "#".to_string()
}

use std::env;
use std::path::Path;

use tokio::fs;
use tracing::{info, warn};

use crate::types::DashboardError;

use super::{paths, Config};

const ENV_API_URL: &str = "SSM_API_URL";
const ENV_API_TOKEN: &str = "SSM_API_TOKEN";

impl Config {
    /// Load configuration from `explicit` or from config.json in the app directory.
    /// Falls back to defaults if the file doesn't exist or can't be parsed.
    /// Environment overrides are applied last.
    pub async fn load(explicit: Option<&Path>) -> Self {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => paths::get_config_path(),
        };

        let mut config = match Self::try_load(&path).await {
            Ok(config) => {
                info!(
                    path = %path.display(),
                    base_url = %config.restapi_base_url,
                    interval_ms = config.restapi_query_interval_ms,
                    "Loaded configuration"
                );
                config
            }
            Err(err) => {
                warn!(error = ?err, "Failed to load config.json, using defaults");
                Self::default()
            }
        };
        config.apply_overrides(|key| env::var(key).ok());
        config
    }

    pub(super) async fn try_load(path: &Path) -> Result<Self, DashboardError> {
        if !path.exists() {
            warn!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .await
            .map_err(|err| DashboardError::Config(format!("Failed to read config file: {err}")))?;

        serde_json::from_str(&contents)
            .map_err(|err| DashboardError::Config(format!("Failed to parse config.json: {err}")))
    }

    /// Apply `SSM_API_URL` / `SSM_API_TOKEN` style overrides from `lookup`.
    pub(super) fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL) {
            let trimmed = url.trim();
            if !trimmed.is_empty() {
                self.restapi_base_url = trimmed.to_string();
            }
        }
        if let Some(token) = lookup(ENV_API_TOKEN) {
            let trimmed = token.trim();
            if !trimmed.is_empty() {
                self.api_token = Some(trimmed.to_string());
            }
        }
    }
}

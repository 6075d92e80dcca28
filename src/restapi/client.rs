use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::types::DashboardError;

use super::Transport;

/// HTTP transport for the SSM REST API.
#[derive(Clone)]
pub struct RestApi {
    http: Client,
    base_url: String,
    api_token: Option<String>,
}

impl RestApi {
    pub fn new(config: &Config) -> Result<Self, DashboardError> {
        let http = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(DashboardError::Http)?;

        Ok(Self {
            http,
            base_url: config.restapi_base_url.clone(),
            api_token: config.api_token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl Transport for RestApi {
    async fn get(&self, path: &str) -> Result<Value, DashboardError> {
        let url = self.url(path);
        debug!(url = %url, "GET");
        let response = self
            .authorize(self.http.get(url))
            .send()
            .await
            .map_err(DashboardError::Http)?;

        if !response.status().is_success() {
            return Err(DashboardError::Api {
                path: path.to_string(),
                status: response.status(),
            });
        }

        response.json::<Value>().await.map_err(DashboardError::Http)
    }

    async fn post(&self, path: &str) -> Result<(), DashboardError> {
        let url = self.url(path);
        debug!(url = %url, "POST");
        let response = self
            .authorize(self.http.post(url))
            .send()
            .await
            .map_err(DashboardError::Http)?;

        if !response.status().is_success() {
            return Err(DashboardError::Api {
                path: path.to_string(),
                status: response.status(),
            });
        }

        Ok(())
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

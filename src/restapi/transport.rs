use async_trait::async_trait;
use serde_json::Value;

use crate::types::DashboardError;

/// Request/response access to the SSM REST API.
///
/// Paths are relative to the API root (`rulelist`, `rules/3/detail`, ...).
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &str) -> Result<Value, DashboardError>;

    async fn post(&self, path: &str) -> Result<(), DashboardError>;

    async fn start_rule(&self, rule_id: i64) -> Result<(), DashboardError> {
        self.post(&format!("rules/{rule_id}/start")).await
    }

    async fn stop_rule(&self, rule_id: i64) -> Result<(), DashboardError> {
        self.post(&format!("rules/{rule_id}/stop")).await
    }
}

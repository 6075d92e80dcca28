use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::Config;
use crate::locator::Locator;
use crate::restapi::{self, RestApi, Transport};
use crate::scope::Scope;
use crate::types::DashboardError;

use super::alert::RuleAlertsDecoder;
use super::command::RuleCommandsDecoder;
use super::decode::Decode;
use super::model::{Model, ModelArgs};
use super::rule::{RuleDetailDecoder, RuleSummary, RulesDecoder};

/// Entry point of the model layer: fetches SSM resources as decoded models.
#[derive(Clone)]
pub struct Models {
    transport: Arc<dyn Transport>,
    locator: Locator,
    query_interval: Duration,
}

impl Models {
    pub fn new(transport: Arc<dyn Transport>, config: &Config) -> Self {
        Self {
            transport,
            locator: Locator::new(config.locator_prefix.clone()),
            query_interval: config.restapi_query_interval(),
        }
    }

    /// Models backed by the HTTP transport described by `config`.
    pub fn from_config(config: &Config) -> Result<Self, DashboardError> {
        let api = RestApi::new(config)?;
        Ok(Self::new(Arc::new(api), config))
    }

    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    pub fn query_interval(&self) -> Duration {
        self.query_interval
    }

    /// Fetch `path` once and decode it.
    pub async fn get<D: Decode>(
        &self,
        path: impl Into<String>,
        decoder: D,
        args: ModelArgs,
    ) -> Result<Model<D>, DashboardError> {
        let path = path.into();
        let raw = self.transport.get(&path).await?;
        let value = decoder.decode(raw)?;
        Ok(Model::new(
            path,
            decoder,
            args,
            value,
            self.transport.clone(),
            self.query_interval,
        ))
    }

    pub async fn rules(&self) -> Result<Model<RulesDecoder>, DashboardError> {
        self.get(
            "rulelist",
            RulesDecoder::new(self.locator.clone()),
            ModelArgs::default(),
        )
        .await
    }

    pub async fn rule(&self, rule_id: i64) -> Result<Model<RuleDetailDecoder>, DashboardError> {
        self.get(
            format!("rules/{rule_id}/detail"),
            RuleDetailDecoder,
            ModelArgs::default(),
        )
        .await
    }

    pub async fn rule_alerts(
        &self,
        rule_id: i64,
    ) -> Result<Model<RuleAlertsDecoder>, DashboardError> {
        self.get(
            format!("rules/{rule_id}/errors"),
            RuleAlertsDecoder,
            ModelArgs::default(),
        )
        .await
    }

    pub async fn rule_commands(
        &self,
        rule_id: i64,
    ) -> Result<Model<RuleCommandsDecoder>, DashboardError> {
        self.get(
            format!("rules/{rule_id}/commands"),
            RuleCommandsDecoder::new(self.locator.clone()),
            ModelArgs::default(),
        )
        .await
    }

    pub async fn start(&self, rule: &RuleSummary) -> Result<(), DashboardError> {
        self.transport.start_rule(rule.id()).await
    }

    pub async fn terminate(&self, rule: &RuleSummary) -> Result<(), DashboardError> {
        self.transport.stop_rule(rule.id()).await
    }

    /// Run `get_model` until it succeeds, waiting `period` (or the configured
    /// query interval) between attempts. Returns `None` if `scope` is
    /// destroyed first.
    pub async fn subscribe_with_retry<T, F, Fut>(
        &self,
        scope: &Scope,
        period: Option<Duration>,
        mut get_model: F,
    ) -> Option<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, DashboardError>>,
    {
        let period = period
            .unwrap_or(self.query_interval)
            .max(restapi::MIN_PERIOD);
        let mut attempt = 0u32;

        loop {
            if scope.is_destroyed() {
                break;
            }
            attempt = attempt.saturating_add(1);

            let fetched = tokio::select! {
                biased;
                _ = scope.destroyed() => break,
                result = get_model() => result,
            };

            match fetched {
                Ok(model) => return Some(model),
                Err(err) => {
                    warn!(
                        attempt,
                        error = %err,
                        delay_ms = period.as_millis() as u64,
                        "Model fetch failed, retrying"
                    );
                }
            }

            tokio::select! {
                biased;
                _ = scope.destroyed() => break,
                _ = tokio::time::sleep(period) => {}
            }
        }

        debug!(attempt, "Scope destroyed, giving up on model");
        None
    }
}

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::restapi::{self, Transport};
use crate::scope::Scope;
use crate::types::{DashboardError, DecodeError};

use super::decode::Decode;

/// Optional knobs for [`Models::get`](super::Models::get).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelArgs {
    /// Path to poll instead of the one the model was fetched from.
    pub path_override: Option<String>,
    /// Polling period; the configured query interval when unset.
    pub period: Option<Duration>,
}

/// What a subscription delivers.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelUpdate<T> {
    /// A decoded payload that differs from the previous delivery.
    Data(T),
    /// A payload the decoder rejected, handed over raw.
    Malformed { raw: Value, error: DecodeError },
}

/// A fetched and decoded REST resource.
pub struct Model<D: Decode> {
    path: String,
    decoder: D,
    args: ModelArgs,
    value: D::Output,
    transport: Arc<dyn Transport>,
    default_period: Duration,
}

impl<D: Decode> Model<D> {
    pub(super) fn new(
        path: String,
        decoder: D,
        args: ModelArgs,
        value: D::Output,
        transport: Arc<dyn Transport>,
        default_period: Duration,
    ) -> Self {
        Self {
            path,
            decoder,
            args,
            value,
            transport,
            default_period,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Owned snapshot of the decoded payload.
    pub fn data(&self) -> D::Output {
        self.value.clone()
    }

    /// The decoded payload as plain JSON.
    pub fn to_json(&self) -> Result<Value, DashboardError> {
        serde_json::to_value(&self.value)
            .map_err(|err| DashboardError::Decode(DecodeError::from(err)))
    }

    /// Poll the resource for as long as `scope` lives, yielding decoded
    /// payloads whenever they change.
    pub fn subscribe(&self, scope: &Scope) -> Subscription<D> {
        let path = self
            .args
            .path_override
            .clone()
            .unwrap_or_else(|| self.path.clone());
        let period = self
            .args
            .period
            .unwrap_or(self.default_period)
            .max(restapi::MIN_PERIOD);
        let token = scope.token().child_token();

        info!(path = %path, period_ms = period.as_millis() as u64, "Subscribing");
        let raw = restapi::poll(self.transport.clone(), path.clone(), period, token.clone());

        Subscription {
            path,
            decoder: self.decoder.clone(),
            raw,
            last: None,
            token,
        }
    }
}

/// Change-only stream of a polled model. Dropping it stops polling.
pub struct Subscription<D: Decode> {
    path: String,
    decoder: D,
    raw: mpsc::Receiver<Value>,
    last: Option<D::Output>,
    token: CancellationToken,
}

impl<D: Decode> Subscription<D> {
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Next update, or `None` once the scope is destroyed or the
    /// subscription is cancelled.
    pub async fn next(&mut self) -> Option<ModelUpdate<D::Output>> {
        loop {
            let raw = tokio::select! {
                biased;
                _ = self.token.cancelled() => return None,
                raw = self.raw.recv() => raw?,
            };
            if self.token.is_cancelled() {
                return None;
            }

            match self.decoder.decode(raw.clone()) {
                Ok(model) => {
                    if self.last.as_ref() == Some(&model) {
                        debug!(path = %self.path, "Payload unchanged");
                        continue;
                    }
                    self.last = Some(model.clone());
                    return Some(ModelUpdate::Data(model));
                }
                Err(error) => return Some(ModelUpdate::Malformed { raw, error }),
            }
        }
    }

    /// Like [`next`](Self::next) but drops malformed payloads after logging them.
    pub async fn next_data(&mut self) -> Option<D::Output> {
        loop {
            match self.next().await? {
                ModelUpdate::Data(model) => return Some(model),
                ModelUpdate::Malformed { error, .. } => {
                    warn!(path = %self.path, error = %error, "Dropping malformed payload");
                }
            }
        }
    }

    pub fn unsubscribe(self) {
        self.token.cancel();
    }

    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled()
    }
}

impl<D: Decode> Drop for Subscription<D> {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tokio::time::{timeout, Instant};

    use super::*;
    use crate::config::Config;
    use crate::models::{Models, RuleDetailDecoder, RulesDecoder};
    use crate::testing::ScriptedTransport;

    const DETAIL: &str = "rules/1/detail";

    fn rule(state: &str) -> Value {
        json!({"id": 1, "state": state})
    }

    async fn rule_model(transport: Arc<ScriptedTransport>) -> Model<RuleDetailDecoder> {
        Models::new(transport, &Config::default())
            .rule(1)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn data_and_json_snapshots_match() {
        let transport = ScriptedTransport::new();
        transport.reply(DETAIL, json!({"id": 1, "state": "ACTIVE", "ruleText": "x"}));
        let model = rule_model(transport).await;

        assert_eq!(model.path(), DETAIL);
        let json = model.to_json().unwrap();
        assert_eq!(json["ruleText"], "x");
        assert_eq!(json["ruleName"], model.data().rule_name);
    }

    #[tokio::test(start_paused = true)]
    async fn first_poll_is_always_delivered() {
        let transport = ScriptedTransport::new();
        transport.reply(DETAIL, rule("ACTIVE"));
        let model = rule_model(transport).await;
        let scope = Scope::new();

        let mut sub = model.subscribe(&scope);
        let update = sub.next().await.unwrap();
        assert_eq!(update, ModelUpdate::Data(model.data()));
    }

    #[tokio::test(start_paused = true)]
    async fn equal_payloads_are_suppressed() {
        let transport = ScriptedTransport::new();
        transport.reply(DETAIL, rule("ACTIVE"));
        let model = rule_model(transport.clone()).await;
        transport.reply(DETAIL, rule("ACTIVE"));
        transport.reply(DETAIL, rule("DISABLED"));
        let scope = Scope::new();

        let mut sub = model.subscribe(&scope);
        let first = sub.next_data().await.unwrap();
        assert!(first.is_running);

        let second = sub.next_data().await.unwrap();
        assert_eq!(second.status, "Disabled");

        // the last reply repeats forever and must never be delivered again
        assert!(timeout(Duration::from_secs(30), sub.next()).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn malformed_payload_is_handed_over_raw() {
        let transport = ScriptedTransport::new();
        transport.reply(DETAIL, rule("ACTIVE"));
        let model = rule_model(transport.clone()).await;
        transport.reply(DETAIL, json!({"state": "broken"}));
        transport.reply(DETAIL, rule("ACTIVE"));
        let scope = Scope::new();

        let mut sub = model.subscribe(&scope);
        assert!(matches!(sub.next().await, Some(ModelUpdate::Data(_))));

        match sub.next().await {
            Some(ModelUpdate::Malformed { raw, .. }) => {
                assert_eq!(raw, json!({"state": "broken"}))
            }
            other => panic!("expected malformed update, got {other:?}"),
        }

        // the malformed payload did not replace the last delivered model
        assert!(timeout(Duration::from_secs(30), sub.next()).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn next_data_skips_malformed_payloads() {
        let transport = ScriptedTransport::new();
        transport.reply(DETAIL, rule("ACTIVE"));
        let model = rule_model(transport.clone()).await;
        transport.reply(DETAIL, json!([]));
        transport.reply(DETAIL, rule("DRYRUN"));
        let scope = Scope::new();

        let mut sub = model.subscribe(&scope);
        assert_eq!(sub.next_data().await.unwrap().status, "Active");
        let rule = sub.next_data().await.unwrap();
        assert_eq!(rule.status, "Dryrun");
    }

    #[tokio::test(start_paused = true)]
    async fn path_override_and_period_are_honored() {
        let transport = ScriptedTransport::new();
        transport.reply("rulelist", json!([]));
        transport.reply("rulelist/active", json!([]));
        transport.reply("rulelist/active", json!([{"id": 2, "state": "ACTIVE"}]));
        let models = Models::new(transport.clone(), &Config::default());
        let args = ModelArgs {
            path_override: Some("rulelist/active".to_string()),
            period: Some(Duration::from_millis(300)),
        };
        let model = models
            .get("rulelist", RulesDecoder::default(), args)
            .await
            .unwrap();
        let scope = Scope::new();

        let start = Instant::now();
        let mut sub = model.subscribe(&scope);
        assert_eq!(sub.path(), "rulelist/active");
        assert!(sub.next_data().await.unwrap().is_empty());
        assert_eq!(sub.next_data().await.unwrap().len(), 1);
        assert_eq!(start.elapsed(), Duration::from_millis(300));
        assert_eq!(transport.get_count("rulelist"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_period_is_raised_to_the_minimum() {
        let transport = ScriptedTransport::new();
        transport.reply(DETAIL, rule("ACTIVE"));
        let models = Models::new(transport.clone(), &Config::default());
        let args = ModelArgs {
            path_override: None,
            period: Some(Duration::ZERO),
        };
        let model = models.get(DETAIL, RuleDetailDecoder::default(), args).await.unwrap();
        transport.reply(DETAIL, rule("DISABLED"));
        let scope = Scope::new();

        let mut sub = model.subscribe(&scope);
        assert_eq!(sub.next_data().await.unwrap().status, "Disabled");
        // keep draining so the poller never parks on a full channel
        let drain = tokio::spawn(async move { sub.next().await });

        let fetched = transport.get_count(DETAIL);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(transport.get_count(DETAIL) - fetched <= 11);

        scope.destroy();
        assert!(drain.await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_is_delivered_after_scope_destroyed() {
        let transport = ScriptedTransport::with_latency(Duration::from_millis(100));
        transport.reply(DETAIL, rule("ACTIVE"));
        let model = rule_model(transport.clone()).await;
        let scope = Scope::new();

        let mut sub = model.subscribe(&scope);
        // first poll is in flight
        tokio::time::sleep(Duration::from_millis(50)).await;
        scope.destroy();

        assert!(sub.next().await.is_none());
        assert!(!sub.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn buffered_payloads_are_dropped_on_destroy() {
        let transport = ScriptedTransport::new();
        transport.reply(DETAIL, rule("ACTIVE"));
        let model = rule_model(transport.clone()).await;
        let scope = Scope::new();

        let mut sub = model.subscribe(&scope);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(transport.get_count(DETAIL), 2);

        scope.destroy();
        assert!(sub.next().await.is_none());

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(transport.get_count(DETAIL), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn unsubscribe_stops_polling() {
        let transport = ScriptedTransport::new();
        transport.reply(DETAIL, rule("ACTIVE"));
        let model = rule_model(transport.clone()).await;
        let scope = Scope::new();

        let mut sub = model.subscribe(&scope);
        sub.next().await.unwrap();
        sub.unsubscribe();

        let fetched = transport.get_count(DETAIL);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(transport.get_count(DETAIL), fetched);
        assert!(!scope.is_destroyed());
    }
}

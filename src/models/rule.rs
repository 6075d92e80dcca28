use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::locator::Locator;
use crate::types::DecodeError;

use super::decode::{as_associative_map, strip_computed, Decode};

/// Rule fields as served by the REST API. Fields this crate does not
/// interpret are kept in `extra` and serialized back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleInfo {
    pub id: i64,
    #[serde(default)]
    pub state: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Row of the rule list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSummary {
    #[serde(flatten)]
    pub info: RuleInfo,
    pub is_running: bool,
    pub is_dead: bool,
    pub page_url: String,
}

/// Single rule page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleDetail {
    #[serde(flatten)]
    pub info: RuleInfo,
    pub status: String,
    pub rule_name: String,
    pub is_running: bool,
}

impl RuleSummary {
    pub fn id(&self) -> i64 {
        self.info.id
    }
}

impl RuleDetail {
    pub fn id(&self) -> i64 {
        self.info.id
    }
}

/// `ACTIVE` and `DRYRUN` rules are being evaluated by the server.
pub fn is_running_state(state: &str) -> bool {
    matches!(state, "ACTIVE" | "DRYRUN")
}

fn decode_info(raw: Value, computed: &[&str]) -> Result<RuleInfo, DecodeError> {
    let mut info: RuleInfo = serde_json::from_value(raw)?;
    strip_computed(&mut info.extra, computed);
    Ok(info)
}

fn humanize_state(state: &str) -> String {
    let mut chars = state.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => "Unknown".to_string(),
    }
}

#[derive(Debug, Clone, Default)]
pub struct RuleSummaryDecoder {
    locator: Locator,
}

impl RuleSummaryDecoder {
    pub fn new(locator: Locator) -> Self {
        Self { locator }
    }
}

impl Decode for RuleSummaryDecoder {
    type Output = RuleSummary;

    fn decode(&self, raw: Value) -> Result<RuleSummary, DecodeError> {
        let info = decode_info(raw, &["isRunning", "isDead", "pageUrl"])?;
        let is_running = is_running_state(&info.state);
        Ok(RuleSummary {
            page_url: self.locator.rule(info.id),
            is_running,
            is_dead: !is_running,
            info,
        })
    }
}

/// Rule list indexed by rule id.
#[derive(Debug, Clone, Default)]
pub struct RulesDecoder {
    summary: RuleSummaryDecoder,
}

impl RulesDecoder {
    pub fn new(locator: Locator) -> Self {
        Self {
            summary: RuleSummaryDecoder::new(locator),
        }
    }
}

impl Decode for RulesDecoder {
    type Output = BTreeMap<i64, RuleSummary>;

    fn decode(&self, raw: Value) -> Result<Self::Output, DecodeError> {
        as_associative_map(raw, |item| self.summary.decode(item), RuleSummary::id)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RuleDetailDecoder;

impl Decode for RuleDetailDecoder {
    type Output = RuleDetail;

    fn decode(&self, raw: Value) -> Result<RuleDetail, DecodeError> {
        let info = decode_info(raw, &["status", "ruleName", "isRunning"])?;
        let rule_name = info
            .extra
            .get("name")
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Rule{}", info.id));

        Ok(RuleDetail {
            status: humanize_state(&info.state),
            is_running: is_running_state(&info.state),
            rule_name,
            info,
        })
    }
}

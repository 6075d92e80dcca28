use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::types::DecodeError;

use super::decode::{type_name, Decode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Error,
}

/// Error reported by the server for a rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleAlert {
    pub severity: AlertSeverity,
    /// Milliseconds since the epoch.
    pub time: i64,
    pub message: String,
}

impl RuleAlert {
    pub fn occurred_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.time)
    }
}

/// Turns a rule's last error (`{time, error}`) into a list of alerts.
/// A missing, non-numeric or non-positive `time` means the rule has no error.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleAlertsDecoder;

impl Decode for RuleAlertsDecoder {
    type Output = Vec<RuleAlert>;

    fn decode(&self, raw: Value) -> Result<Vec<RuleAlert>, DecodeError> {
        let obj = match raw {
            Value::Object(obj) => obj,
            other => {
                return Err(DecodeError::InvalidField {
                    field: "errors",
                    reason: format!("expected an object, got {}", type_name(&other)),
                })
            }
        };

        let time = match obj.get("time").and_then(parse_time) {
            Some(time) if time > 0.0 => time,
            _ => return Ok(Vec::new()),
        };

        let message = match obj.get("error") {
            Some(Value::String(message)) => message.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };

        Ok(vec![RuleAlert {
            severity: AlertSeverity::Error,
            // sub-millisecond times round up so the alert keeps a positive time
            time: time.ceil() as i64,
            message,
        }])
    }
}

fn parse_time(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
}

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::locator::Locator;
use crate::types::DecodeError;

use super::decode::{as_associative_map, strip_computed, Decode};

/// Command fields as served by the REST API (`actionType`, `parameters`,
/// `generateTime`, ... are kept in `extra`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandInfo {
    pub cid: i64,
    pub rid: i64,
    #[serde(default)]
    pub state: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandSummary {
    #[serde(flatten)]
    pub info: CommandInfo,
    pub is_running: bool,
    pub page_url: String,
}

impl CommandSummary {
    pub fn cid(&self) -> i64 {
        self.info.cid
    }
}

#[derive(Debug, Clone, Default)]
pub struct CommandDecoder {
    locator: Locator,
}

impl CommandDecoder {
    pub fn new(locator: Locator) -> Self {
        Self { locator }
    }
}

impl Decode for CommandDecoder {
    type Output = CommandSummary;

    fn decode(&self, raw: Value) -> Result<CommandSummary, DecodeError> {
        let mut info: CommandInfo = serde_json::from_value(raw)?;
        strip_computed(&mut info.extra, &["isRunning", "pageUrl"]);
        Ok(CommandSummary {
            is_running: info.state == "EXECUTING",
            page_url: self.locator.command(info.rid, info.cid),
            info,
        })
    }
}

/// Commands of one rule indexed by command id.
#[derive(Debug, Clone, Default)]
pub struct RuleCommandsDecoder {
    command: CommandDecoder,
}

impl RuleCommandsDecoder {
    pub fn new(locator: Locator) -> Self {
        Self {
            command: CommandDecoder::new(locator),
        }
    }
}

impl Decode for RuleCommandsDecoder {
    type Output = BTreeMap<i64, CommandSummary>;

    fn decode(&self, raw: Value) -> Result<Self::Output, DecodeError> {
        as_associative_map(raw, |item| self.command.decode(item), CommandSummary::cid)
    }
}

mod alert;
mod client;
mod command;
mod decode;
mod helpers;
mod model;
mod rule;

pub use alert::{AlertSeverity, RuleAlert, RuleAlertsDecoder};
pub use client::Models;
pub use command::{CommandDecoder, CommandInfo, CommandSummary, RuleCommandsDecoder};
pub use decode::Decode;
pub use helpers::{parse_int_from_query_path_tail, usage};
pub use model::{Model, ModelArgs, ModelUpdate, Subscription};
pub use rule::{
    is_running_state, RuleDetail, RuleDetailDecoder, RuleInfo, RuleSummary, RuleSummaryDecoder,
    RulesDecoder,
};

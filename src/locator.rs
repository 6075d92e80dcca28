/// Builds dashboard page URLs for rules and commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    prefix: String,
}

impl Default for Locator {
    fn default() -> Self {
        Self::new("#")
    }
}

impl Locator {
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self {
            prefix: prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn rule(&self, rule_id: i64) -> String {
        format!("{}/rules/rule/{}", self.prefix, rule_id)
    }

    pub fn command(&self, rule_id: i64, command_id: i64) -> String {
        format!("{}/commands/{}", self.rule(rule_id), command_id)
    }
}

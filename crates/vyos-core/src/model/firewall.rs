// ── Firewall domain types ──

use serde::{Deserialize, Serialize};

/// A filter chain: a base chain (`forward`, `input`, `output`) or a named
/// ruleset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    pub name: String,
    pub default_action: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub disabled: bool,
    /// Ascending by `rule_id`, which is also evaluation order.
    pub rules: Vec<Rule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub rule_id: u32,
    pub action: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source_group: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub destination: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub destination_group: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub disabled: bool,
}

/// A rule addressed through its owning policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRule {
    pub policy: String,
    #[serde(flatten)]
    pub rule: Rule,
}

/// Answer to an enable/disable toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleState {
    pub disabled: bool,
}

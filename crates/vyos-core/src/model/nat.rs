use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Which NAT table a rule lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NatKind {
    Source,
    Destination,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NatRule {
    pub rule_id: u32,
    #[serde(rename = "type")]
    pub kind: NatKind,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub outbound_interface: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub inbound_interface: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub protocol: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source_address: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source_port: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub destination_address: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub destination_port: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub translation_address: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub translation_port: String,
    pub disabled: bool,
}

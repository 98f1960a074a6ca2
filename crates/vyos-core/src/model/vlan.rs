use serde::{Deserialize, Serialize};

/// An 802.1Q `vif` sub-interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vlan {
    pub interface: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub vlan_id: u32,
    pub addresses: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

use serde::{Deserialize, Serialize};

/// An interface and its IPv4/IPv6 addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    pub interface: String,
    /// Interface family: `ethernet`, `bonding`, `loopback`, ...
    #[serde(rename = "type")]
    pub kind: String,
    pub addresses: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

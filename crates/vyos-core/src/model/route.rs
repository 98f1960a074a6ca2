use serde::{Deserialize, Serialize};

/// A static IPv4 route. Only the first next-hop is reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// Destination prefix in CIDR notation.
    pub network: String,
    pub next_hop: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub distance: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

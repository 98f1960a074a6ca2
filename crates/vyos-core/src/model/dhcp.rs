use serde::{Deserialize, Serialize};

/// A DHCP shared network and its subnets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DhcpServer {
    pub name: String,
    pub subnets: Vec<DhcpSubnet>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DhcpSubnet {
    pub subnet: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub default_router: String,
    pub dns_servers: Vec<String>,
    /// Bounds of the first address range; further ranges are not reported.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub range_start: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub range_stop: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub lease: String,
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vrf {
    pub name: String,
    pub table: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

// ── Request bodies ──
//
// JSON bodies accepted by the mutation endpoints. Optional text fields
// default to the empty string, which every translator reads as "not
// supplied". `validate()` checks required-field presence only; anything
// else is left for the device to accept or refuse.

use serde::{Deserialize, Deserializer};

use crate::error::CoreError;

/// Fail with the names of every required field that is empty.
fn require(fields: &[(&str, bool)]) -> Result<(), CoreError> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, present)| !present)
        .map(|(name, _)| *name)
        .collect();
    match missing.as_slice() {
        [] => Ok(()),
        [one] => Err(CoreError::validation(format!("{one} is required"))),
        many => Err(CoreError::validation(format!(
            "{} are required",
            many.join(", ")
        ))),
    }
}

/// A JSON `null` reads as the field's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ── Networks ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateNetworkRequest {
    pub interface: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub address: String,
    pub description: String,
}

impl CreateNetworkRequest {
    pub fn validate(&self) -> Result<(), CoreError> {
        require(&[
            ("interface", !self.interface.is_empty()),
            ("type", !self.kind.is_empty()),
            ("address", !self.address.is_empty()),
        ])
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateNetworkRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub address: String,
    pub description: String,
}

impl UpdateNetworkRequest {
    pub fn validate(&self) -> Result<(), CoreError> {
        require(&[
            ("type", !self.kind.is_empty()),
            ("address", !self.address.is_empty()),
        ])
    }
}

// ── VRFs ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateVrfRequest {
    pub name: String,
    pub table: String,
    pub description: String,
}

impl CreateVrfRequest {
    pub fn validate(&self) -> Result<(), CoreError> {
        require(&[
            ("name", !self.name.is_empty()),
            ("table", !self.table.is_empty()),
        ])
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateVrfRequest {
    pub table: String,
    pub description: String,
}

// ── VLANs ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateVlanRequest {
    pub interface: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub vlan_id: u32,
    pub address: String,
    pub description: String,
}

impl CreateVlanRequest {
    pub fn validate(&self) -> Result<(), CoreError> {
        require(&[
            ("interface", !self.interface.is_empty()),
            ("type", !self.kind.is_empty()),
            ("vlan_id", self.vlan_id != 0),
        ])
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateVlanRequest {
    /// Defaults to `ethernet` when empty.
    #[serde(rename = "type")]
    pub kind: String,
    pub address: String,
    pub description: String,
}

// ── Firewall ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreatePolicyRequest {
    pub name: String,
    pub default_action: String,
    pub description: String,
}

impl CreatePolicyRequest {
    pub fn validate(&self) -> Result<(), CoreError> {
        require(&[
            ("name", !self.name.is_empty()),
            ("default_action", !self.default_action.is_empty()),
        ])
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdatePolicyRequest {
    pub default_action: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateRuleRequest {
    pub rule_id: u32,
    pub action: String,
    /// Takes precedence over `source_group` when both are given.
    pub source: String,
    pub source_group: String,
    /// Takes precedence over `destination_group` when both are given.
    pub destination: String,
    pub destination_group: String,
    pub description: String,
}

impl CreateRuleRequest {
    pub fn validate(&self) -> Result<(), CoreError> {
        require(&[
            ("rule_id", self.rule_id != 0),
            ("action", !self.action.is_empty()),
        ])
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateAddressGroupRequest {
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub addresses: Vec<String>,
    pub description: String,
}

impl CreateAddressGroupRequest {
    pub fn validate(&self) -> Result<(), CoreError> {
        require(&[("name", !self.name.is_empty())])
    }
}

/// Full replacement of a group's member list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateAddressGroupRequest {
    #[serde(deserialize_with = "null_as_default")]
    pub addresses: Vec<String>,
    pub description: String,
}

// ── NAT ─────────────────────────────────────────────────────────────

/// Rule fields shared by create and update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NatRuleFields {
    pub description: String,
    pub outbound_interface: String,
    pub inbound_interface: String,
    pub protocol: String,
    pub source_address: String,
    pub source_port: String,
    pub destination_address: String,
    pub destination_port: String,
    pub translation_address: String,
    pub translation_port: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateNatRuleRequest {
    pub rule_id: u32,
    #[serde(flatten)]
    pub fields: NatRuleFields,
}

impl CreateNatRuleRequest {
    pub fn validate(&self) -> Result<(), CoreError> {
        require(&[
            ("rule_id", self.rule_id != 0),
            ("translation_address", !self.fields.translation_address.is_empty()),
        ])
    }
}

pub type UpdateNatRuleRequest = NatRuleFields;

// ── Static routes ───────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateRouteRequest {
    pub network: String,
    pub next_hop: String,
    pub distance: String,
    pub description: String,
}

impl CreateRouteRequest {
    pub fn validate(&self) -> Result<(), CoreError> {
        require(&[
            ("network", !self.network.is_empty()),
            ("next_hop", !self.next_hop.is_empty()),
        ])
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateRouteRequest {
    pub next_hop: String,
    /// Applies to `next_hop`, so it cannot be sent alone.
    pub distance: String,
    pub description: String,
}

impl UpdateRouteRequest {
    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.distance.is_empty() && self.next_hop.is_empty() {
            return Err(CoreError::validation("distance requires next_hop"));
        }
        Ok(())
    }
}

// ── DHCP ────────────────────────────────────────────────────────────

/// One subnet of a shared network and its options.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DhcpSubnetRequest {
    pub subnet: String,
    pub default_router: String,
    #[serde(deserialize_with = "null_as_default")]
    pub dns_servers: Vec<String>,
    pub range_start: String,
    pub range_stop: String,
    pub lease: String,
}

impl DhcpSubnetRequest {
    pub fn validate(&self) -> Result<(), CoreError> {
        require(&[("subnet", !self.subnet.is_empty())])
    }

    /// Name servers with surrounding blanks trimmed and empty entries dropped.
    pub fn dns_servers(&self) -> impl Iterator<Item = &str> {
        self.dns_servers
            .iter()
            .map(|ns| ns.trim())
            .filter(|ns| !ns.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateDhcpServerRequest {
    pub name: String,
    #[serde(flatten)]
    pub subnet: DhcpSubnetRequest,
}

impl CreateDhcpServerRequest {
    pub fn validate(&self) -> Result<(), CoreError> {
        require(&[
            ("name", !self.name.is_empty()),
            ("subnet", !self.subnet.subnet.is_empty()),
        ])
    }
}

pub type UpdateDhcpServerRequest = DhcpSubnetRequest;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn missing_fields_are_named() {
        let req = CreateVrfRequest::default();
        assert_eq!(
            req.validate().unwrap_err().to_string(),
            "name, table are required"
        );

        let req: CreateVrfRequest = serde_json::from_value(json!({"name": "MGMT"})).unwrap();
        assert_eq!(req.validate().unwrap_err().to_string(), "table is required");
    }

    #[test]
    fn zero_ids_count_as_missing() {
        let req: CreateRuleRequest =
            serde_json::from_value(json!({"rule_id": 0, "action": "accept"})).unwrap();
        assert_eq!(req.validate().unwrap_err().to_string(), "rule_id is required");
    }

    #[test]
    fn type_field_is_renamed() {
        let req: CreateNetworkRequest = serde_json::from_value(json!({
            "interface": "eth1", "type": "ethernet", "address": "10.1.0.1/24"
        }))
        .unwrap();
        assert_eq!(req.kind, "ethernet");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn flattened_nat_fields() {
        let req: CreateNatRuleRequest = serde_json::from_value(json!({
            "rule_id": 100,
            "translation_address": "masquerade",
            "outbound_interface": "eth0"
        }))
        .unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.fields.outbound_interface, "eth0");
    }

    #[test]
    fn dhcp_name_servers_are_trimmed() {
        let req: CreateDhcpServerRequest = serde_json::from_value(json!({
            "name": "LAN",
            "subnet": "192.168.1.0/24",
            "dns_servers": [" 1.1.1.1 ", "", "8.8.8.8"]
        }))
        .unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(
            req.subnet.dns_servers().collect::<Vec<_>>(),
            vec!["1.1.1.1", "8.8.8.8"]
        );
    }

    #[test]
    fn null_lists_read_as_empty() {
        let req: UpdateAddressGroupRequest =
            serde_json::from_value(json!({"addresses": null, "description": "lab"})).unwrap();
        assert!(req.addresses.is_empty());

        let req: CreateDhcpServerRequest = serde_json::from_value(json!({
            "name": "LAN",
            "subnet": "192.168.1.0/24",
            "dns_servers": null
        }))
        .unwrap();
        assert_eq!(req.subnet.dns_servers().count(), 0);
    }

    #[test]
    fn distance_needs_next_hop() {
        let req = UpdateRouteRequest {
            distance: "10".into(),
            ..UpdateRouteRequest::default()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn wrong_json_type_fails_to_decode() {
        let result = serde_json::from_value::<CreateVlanRequest>(json!({"vlan_id": "ten"}));
        assert!(result.is_err());
    }
}

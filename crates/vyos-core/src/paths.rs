// ── Path templates ──
//
// One builder per resource kind. Every caller-supplied value goes through
// `ConfigPath::value`, so a request that cannot be expressed as a path is
// rejected here, before anything is sent to the device.

use std::str::FromStr;

use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use vyos_api::{ConfigPath, PathError};

use crate::model::NatKind;

// ── Interfaces ──────────────────────────────────────────────────────

pub fn interfaces() -> ConfigPath {
    ConfigPath::root("interfaces")
}

/// `interfaces <type> <name>`
pub fn interface(kind: &str, name: &str) -> Result<ConfigPath, PathError> {
    interfaces().value("type", kind)?.value("interface", name)
}

/// `interfaces <type> <name> vif <id>`
pub fn vif(kind: &str, name: &str, vlan_id: u32) -> Result<ConfigPath, PathError> {
    Ok(interface(kind, name)?.kw("vif").number(vlan_id))
}

// ── VRFs ────────────────────────────────────────────────────────────

pub fn vrfs() -> ConfigPath {
    ConfigPath::root("vrf").kw("name")
}

pub fn vrf(name: &str) -> Result<ConfigPath, PathError> {
    vrfs().value("name", name)
}

// ── Firewall ────────────────────────────────────────────────────────

/// The three built-in IPv4 filter chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum BaseChain {
    Forward,
    Input,
    Output,
}

/// A firewall policy as addressed by the REST surface: either a base
/// chain or a user-defined named ruleset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyRef<'a> {
    Base(BaseChain),
    Named(&'a str),
}

impl<'a> PolicyRef<'a> {
    pub fn parse(name: &'a str) -> Self {
        BaseChain::from_str(name).map_or(Self::Named(name), Self::Base)
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Base(chain) => (*chain).into(),
            Self::Named(name) => name,
        }
    }

    /// `firewall ipv4 <chain> filter` or `firewall ipv4 name <name>`.
    pub fn path(&self) -> Result<ConfigPath, PathError> {
        match self {
            Self::Base(chain) => Ok(ConfigPath::root("firewall")
                .kw("ipv4")
                .kw((*chain).into())
                .kw("filter")),
            Self::Named(name) => named_policies().value("policy", name),
        }
    }

    pub fn rule(&self, rule_id: u32) -> Result<ConfigPath, PathError> {
        Ok(self.path()?.kw("rule").number(rule_id))
    }
}

pub fn named_policies() -> ConfigPath {
    ConfigPath::root("firewall").kw("ipv4").kw("name")
}

pub fn address_groups() -> ConfigPath {
    ConfigPath::root("firewall").kw("group").kw("address-group")
}

pub fn address_group(name: &str) -> Result<ConfigPath, PathError> {
    address_groups().value("name", name)
}

// ── NAT ─────────────────────────────────────────────────────────────

pub fn nat_rules(kind: NatKind) -> ConfigPath {
    let root = ConfigPath::root("nat");
    match kind {
        NatKind::Source => root.kw("source"),
        NatKind::Destination => root.kw("destination"),
    }
    .kw("rule")
}

pub fn nat_rule(kind: NatKind, rule_id: u32) -> ConfigPath {
    nat_rules(kind).number(rule_id)
}

// ── Static routes ───────────────────────────────────────────────────

pub fn routes() -> ConfigPath {
    ConfigPath::root("protocols").kw("static").kw("route")
}

/// `protocols static route <prefix/len>`
pub fn route(network: &str) -> Result<ConfigPath, PathError> {
    routes().value("network", network)
}

// ── DHCP ────────────────────────────────────────────────────────────

pub fn dhcp_servers() -> ConfigPath {
    ConfigPath::root("service")
        .kw("dhcp-server")
        .kw("shared-network-name")
}

pub fn dhcp_server(name: &str) -> Result<ConfigPath, PathError> {
    dhcp_servers().value("name", name)
}

pub fn dhcp_subnet(name: &str, subnet: &str) -> Result<ConfigPath, PathError> {
    dhcp_server(name)?.kw("subnet").value("subnet", subnet)
}

// ── Service ─────────────────────────────────────────────────────────

/// Cheap read used to decide whether a device is reachable.
pub fn probe() -> ConfigPath {
    ConfigPath::root("system").kw("host-name")
}

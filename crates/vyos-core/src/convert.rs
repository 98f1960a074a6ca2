// ── Tree → domain conversions ──
//
// Each resource reads its fields out of the subtree at its own path. The
// identifier parts (name, rule number, interface type) come from the path
// and are passed in; the device does not repeat them inside the subtree.

use vyos_api::TreeNode;

use crate::model::{
    AddressGroup, DhcpServer, DhcpSubnet, NatKind, NatRule, Network, Policy, Rule, Route, Vlan,
    Vrf,
};
use crate::normalize::{field, keyed_children, numeric_children, presence_flag, scalar_list};

impl Network {
    pub fn from_tree(interface: &str, kind: &str, cfg: &TreeNode) -> Self {
        Self {
            interface: interface.to_owned(),
            kind: kind.to_owned(),
            addresses: scalar_list(cfg.get("address")),
            description: field(cfg, &["description"]),
        }
    }
}

impl Vlan {
    pub fn from_tree(interface: &str, kind: &str, vlan_id: u32, cfg: &TreeNode) -> Self {
        Self {
            interface: interface.to_owned(),
            kind: kind.to_owned(),
            vlan_id,
            addresses: scalar_list(cfg.get("address")),
            description: field(cfg, &["description"]),
        }
    }
}

impl Vrf {
    pub fn from_tree(name: &str, cfg: &TreeNode) -> Self {
        Self {
            name: name.to_owned(),
            table: field(cfg, &["table"]),
            description: field(cfg, &["description"]),
        }
    }
}

impl Policy {
    pub fn from_tree(name: &str, cfg: &TreeNode) -> Self {
        Self {
            name: name.to_owned(),
            default_action: field(cfg, &["default-action"]),
            description: field(cfg, &["description"]),
            disabled: presence_flag(cfg, "disable"),
            rules: numeric_children(cfg.get("rule"))
                .into_iter()
                .map(|(id, rule)| Rule::from_tree(id, rule))
                .collect(),
        }
    }

    /// Whether a base chain subtree carries anything worth listing.
    pub fn has_content(cfg: &TreeNode) -> bool {
        matches!(cfg.get("rule"), Some(TreeNode::Map(_)))
            || matches!(cfg.get("default-action"), Some(TreeNode::Scalar(_)))
    }
}

impl Rule {
    pub fn from_tree(rule_id: u32, cfg: &TreeNode) -> Self {
        Self {
            rule_id,
            action: field(cfg, &["action"]),
            source: field(cfg, &["source", "address"]),
            source_group: field(cfg, &["source", "group", "address-group"]),
            destination: field(cfg, &["destination", "address"]),
            destination_group: field(cfg, &["destination", "group", "address-group"]),
            description: field(cfg, &["description"]),
            disabled: presence_flag(cfg, "disable"),
        }
    }
}

impl AddressGroup {
    pub fn from_tree(name: &str, cfg: &TreeNode) -> Self {
        Self {
            name: name.to_owned(),
            addresses: scalar_list(cfg.get("address")),
            description: field(cfg, &["description"]),
        }
    }
}

impl NatRule {
    pub fn from_tree(kind: NatKind, rule_id: u32, cfg: &TreeNode) -> Self {
        Self {
            rule_id,
            kind,
            description: field(cfg, &["description"]),
            outbound_interface: field(cfg, &["outbound-interface", "name"]),
            inbound_interface: field(cfg, &["inbound-interface", "name"]),
            protocol: field(cfg, &["protocol"]),
            source_address: field(cfg, &["source", "address"]),
            source_port: field(cfg, &["source", "port"]),
            destination_address: field(cfg, &["destination", "address"]),
            destination_port: field(cfg, &["destination", "port"]),
            translation_address: field(cfg, &["translation", "address"]),
            translation_port: field(cfg, &["translation", "port"]),
            disabled: presence_flag(cfg, "disable"),
        }
    }
}

impl Route {
    pub fn from_tree(network: &str, cfg: &TreeNode) -> Self {
        let (next_hop, distance) = keyed_children(cfg.get("next-hop"))
            .next()
            .map(|(addr, hop)| (addr.to_owned(), field(hop, &["distance"])))
            .unwrap_or_default();
        Self {
            network: network.to_owned(),
            next_hop,
            distance,
            description: field(cfg, &["description"]),
        }
    }
}

impl DhcpServer {
    pub fn from_tree(name: &str, cfg: &TreeNode) -> Self {
        Self {
            name: name.to_owned(),
            subnets: keyed_children(cfg.get("subnet"))
                .map(|(subnet, scfg)| DhcpSubnet::from_tree(subnet, scfg))
                .collect(),
        }
    }
}

impl DhcpSubnet {
    pub fn from_tree(subnet: &str, cfg: &TreeNode) -> Self {
        // Ranges are keyed by index; "0" is the one the gateway manages.
        let range = numeric_children(cfg.get("range"))
            .into_iter()
            .next()
            .map(|(_, range)| range);
        Self {
            subnet: subnet.to_owned(),
            default_router: field(cfg, &["default-router"]),
            dns_servers: scalar_list(cfg.get("name-server")),
            range_start: range.map(|r| field(r, &["start"])).unwrap_or_default(),
            range_stop: range.map(|r| field(r, &["stop"])).unwrap_or_default(),
            lease: field(cfg, &["lease"]),
        }
    }
}

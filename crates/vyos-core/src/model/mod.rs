// ── Domain model ──
//
// Response shapes, one per resource kind. Every list-valued field is a
// `Vec` and always serializes as an array; optional text fields are empty
// strings that are left out of the JSON.

mod address_group;
mod device;
mod dhcp;
mod firewall;
mod nat;
mod network;
mod route;
mod vlan;
mod vrf;

pub use address_group::AddressGroup;
pub use device::{DeviceStatus, Health};
pub use dhcp::{DhcpServer, DhcpSubnet};
pub use firewall::{Policy, PolicyRule, Rule, ToggleState};
pub use nat::{NatKind, NatRule};
pub use network::Network;
pub use route::Route;
pub use vlan::Vlan;
pub use vrf::Vrf;

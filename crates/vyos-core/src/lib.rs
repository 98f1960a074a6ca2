//! Translation layer between flat REST resources and the VyOS
//! configuration tree.
//!
//! - **[`Gateway`]**: framework-free router. Takes a [`GatewayRequest`]
//!   (method, path, JSON body) plus a cancellation token and produces a
//!   [`GatewayResponse`] (status, JSON body).
//!
//! - **Resource translators** ([`resources`]): one module per resource
//!   kind, each composing the path templates ([`paths`]), the step
//!   sequencer ([`CompoundOp`]) and the tree normalizer ([`normalize`]).
//!
//! - **[`DeviceRegistry`]**: immutable id → device table built at startup
//!   and shared by reference.
//!
//! - **Error classification** ([`classify`]): separate entry points for
//!   reads and writes, so "path is empty" becomes `[]`, 404 or 422
//!   depending on who asked.
//!
//! Everything that talks to a device is generic over
//! [`vyos_api::ConfigStore`]; production uses [`vyos_api::VyosClient`].

pub mod classify;
pub mod convert;
pub mod error;
pub mod model;
pub mod normalize;
pub mod paths;
pub mod registry;
pub mod requests;
pub mod resources;
pub mod router;
pub mod sequence;
pub mod session;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod testing;

// ── Primary re-exports ──────────────────────────────────────────────
pub use error::CoreError;
pub use registry::{Device, DeviceRegistry};
pub use router::{Gateway, GatewayRequest, GatewayResponse};
pub use sequence::{CompoundOp, Step, StepOp, StepPolicy};
pub use session::DeviceSession;

pub use model::{
    AddressGroup, DeviceStatus, DhcpServer, DhcpSubnet, Health, NatKind, NatRule, Network, Policy,
    PolicyRule, Route, Rule, ToggleState, Vlan, Vrf,
};

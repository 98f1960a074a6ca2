// ── Resource translators ──
//
// One module per resource kind. Each composes the path templates, the
// sequencer and the normalizer into List/Get/Create/Update/Delete. Lists
// fetch the parent section once and split it locally; mutations build
// their whole step plan before touching the device.

pub mod address_group;
pub mod dhcp;
pub mod firewall;
pub mod nat;
pub mod network;
pub mod route;
pub mod service;
pub mod vlan;
pub mod vrf;

use vyos_api::{ConfigPath, ConfigStore};

use crate::classify::{QueryKind, QueryOutcome, classify_query};
use crate::error::CoreError;
use crate::session::DeviceSession;

/// Read `path` and classify the reply for `kind`.
async fn fetch<S: ConfigStore>(
    session: &DeviceSession<'_, S>,
    path: &ConfigPath,
    kind: QueryKind<'_>,
) -> Result<QueryOutcome, CoreError> {
    classify_query(session.show_config(path).await, kind)
}

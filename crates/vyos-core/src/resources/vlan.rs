// 802.1Q sub-interfaces (`interfaces <type> <name> vif <id>`).

use vyos_api::ConfigStore;

use super::fetch;
use crate::classify::{ListTolerance, QueryKind};
use crate::error::CoreError;
use crate::model::Vlan;
use crate::normalize::{keyed_children, numeric_children, unwrap_envelope};
use crate::paths;
use crate::requests::{CreateVlanRequest, UpdateVlanRequest};
use crate::sequence::CompoundOp;
use crate::session::DeviceSession;

const DEFAULT_KIND: &str = "ethernet";

pub async fn list<S: ConfigStore>(session: &DeviceSession<'_, S>) -> Result<Vec<Vlan>, CoreError> {
    let tree = fetch(
        session,
        &paths::interfaces(),
        QueryKind::List(ListTolerance::LogicalEmpty),
    )
    .await?
    .into_tree();
    let tree = unwrap_envelope(&tree, "interfaces");

    let mut vlans = Vec::new();
    for (kind, interfaces) in keyed_children(Some(tree)) {
        for (name, cfg) in keyed_children(Some(interfaces)) {
            vlans.extend(
                numeric_children(cfg.get("vif"))
                    .into_iter()
                    .map(|(id, vif)| Vlan::from_tree(name, kind, id, vif)),
            );
        }
    }
    Ok(vlans)
}

pub async fn get<S: ConfigStore>(
    session: &DeviceSession<'_, S>,
    kind: &str,
    interface: &str,
    vlan_id: u32,
) -> Result<Vlan, CoreError> {
    let path = paths::vif(kind, interface, vlan_id)?;
    let id = format!("{interface}.{vlan_id}");
    let tree = fetch(
        session,
        &path,
        QueryKind::Get {
            resource: "VLAN",
            id: &id,
        },
    )
    .await?
    .into_tree();
    Ok(Vlan::from_tree(interface, kind, vlan_id, &tree))
}

/// The anchor step creates the vif, with its address when one is given.
pub fn create_plan(req: &CreateVlanRequest) -> Result<CompoundOp, CoreError> {
    req.validate()?;
    let base = paths::vif(&req.kind, &req.interface, req.vlan_id)?;
    let anchor = if req.address.is_empty() {
        base.clone()
    } else {
        base.child("address").value("address", &req.address)?
    };
    Ok(CompoundOp::new()
        .set(anchor)
        .optional(&base, "description", "description", &req.description)?)
}

pub async fn create<S: ConfigStore>(
    session: &DeviceSession<'_, S>,
    req: &CreateVlanRequest,
) -> Result<Vlan, CoreError> {
    create_plan(req)?.run(session).await?;
    Ok(Vlan {
        interface: req.interface.clone(),
        kind: req.kind.clone(),
        vlan_id: req.vlan_id,
        addresses: single(&req.address),
        description: req.description.clone(),
    })
}

pub fn update_plan(
    interface: &str,
    vlan_id: u32,
    req: &UpdateVlanRequest,
) -> Result<CompoundOp, CoreError> {
    let base = paths::vif(kind_or_default(&req.kind), interface, vlan_id)?;
    let mut plan = CompoundOp::new();
    if !req.address.is_empty() {
        let addresses = base.child("address");
        plan = plan
            .try_delete(addresses.clone())
            .set(addresses.value("address", &req.address)?);
    }
    Ok(plan.optional(&base, "description", "description", &req.description)?)
}

pub async fn update<S: ConfigStore>(
    session: &DeviceSession<'_, S>,
    interface: &str,
    vlan_id: u32,
    req: &UpdateVlanRequest,
) -> Result<Vlan, CoreError> {
    update_plan(interface, vlan_id, req)?.run(session).await?;
    Ok(Vlan {
        interface: interface.to_owned(),
        kind: kind_or_default(&req.kind).to_owned(),
        vlan_id,
        addresses: single(&req.address),
        description: req.description.clone(),
    })
}

pub async fn delete<S: ConfigStore>(
    session: &DeviceSession<'_, S>,
    kind: &str,
    interface: &str,
    vlan_id: u32,
) -> Result<(), CoreError> {
    CompoundOp::new()
        .delete(paths::vif(kind, interface, vlan_id)?)
        .run(session)
        .await
}

fn kind_or_default(kind: &str) -> &str {
    if kind.is_empty() { DEFAULT_KIND } else { kind }
}

fn single(address: &str) -> Vec<String> {
    if address.is_empty() {
        Vec::new()
    } else {
        vec![address.to_owned()]
    }
}

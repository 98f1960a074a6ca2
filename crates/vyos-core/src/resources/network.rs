// Interfaces and their addresses (`interfaces <type> <name>`).

use vyos_api::ConfigStore;

use super::fetch;
use crate::classify::{ListTolerance, QueryKind};
use crate::error::CoreError;
use crate::model::Network;
use crate::normalize::{keyed_children, unwrap_envelope};
use crate::paths;
use crate::requests::{CreateNetworkRequest, UpdateNetworkRequest};
use crate::sequence::CompoundOp;
use crate::session::DeviceSession;

pub async fn list<S: ConfigStore>(session: &DeviceSession<'_, S>) -> Result<Vec<Network>, CoreError> {
    let tree = fetch(
        session,
        &paths::interfaces(),
        QueryKind::List(ListTolerance::LogicalEmpty),
    )
    .await?
    .into_tree();
    let tree = unwrap_envelope(&tree, "interfaces");

    Ok(keyed_children(Some(tree))
        .flat_map(|(kind, interfaces)| {
            keyed_children(Some(interfaces))
                .map(move |(name, cfg)| Network::from_tree(name, kind, cfg))
        })
        .collect())
}

pub async fn get<S: ConfigStore>(
    session: &DeviceSession<'_, S>,
    kind: &str,
    interface: &str,
) -> Result<Network, CoreError> {
    let path = paths::interface(kind, interface)?;
    let tree = fetch(
        session,
        &path,
        QueryKind::Get {
            resource: "interface",
            id: interface,
        },
    )
    .await?
    .into_tree();
    Ok(Network::from_tree(interface, kind, &tree))
}

pub fn create_plan(req: &CreateNetworkRequest) -> Result<CompoundOp, CoreError> {
    req.validate()?;
    let base = paths::interface(&req.kind, &req.interface)?;
    Ok(CompoundOp::new()
        .set(base.child("address").value("address", &req.address)?)
        .optional(&base, "description", "description", &req.description)?)
}

pub async fn create<S: ConfigStore>(
    session: &DeviceSession<'_, S>,
    req: &CreateNetworkRequest,
) -> Result<Network, CoreError> {
    create_plan(req)?.run(session).await?;
    Ok(Network {
        interface: req.interface.clone(),
        kind: req.kind.clone(),
        addresses: vec![req.address.clone()],
        description: req.description.clone(),
    })
}

/// Replace the interface's addresses with the single one in the request.
pub fn update_plan(interface: &str, req: &UpdateNetworkRequest) -> Result<CompoundOp, CoreError> {
    req.validate()?;
    let base = paths::interface(&req.kind, interface)?;
    let addresses = base.child("address");
    Ok(CompoundOp::new()
        .try_delete(addresses.clone())
        .set(addresses.value("address", &req.address)?)
        .optional(&base, "description", "description", &req.description)?)
}

pub async fn update<S: ConfigStore>(
    session: &DeviceSession<'_, S>,
    interface: &str,
    req: &UpdateNetworkRequest,
) -> Result<Network, CoreError> {
    update_plan(interface, req)?.run(session).await?;
    Ok(Network {
        interface: interface.to_owned(),
        kind: req.kind.clone(),
        addresses: vec![req.address.clone()],
        description: req.description.clone(),
    })
}

pub async fn delete<S: ConfigStore>(
    session: &DeviceSession<'_, S>,
    kind: &str,
    interface: &str,
) -> Result<(), CoreError> {
    CompoundOp::new()
        .delete(paths::interface(kind, interface)?)
        .run(session)
        .await
}

// VRFs (`vrf name <name>`).

use vyos_api::ConfigStore;

use super::fetch;
use crate::classify::{ListTolerance, QueryKind};
use crate::error::CoreError;
use crate::model::Vrf;
use crate::normalize::{keyed_children, unwrap_envelope};
use crate::paths;
use crate::requests::{CreateVrfRequest, UpdateVrfRequest};
use crate::sequence::CompoundOp;
use crate::session::DeviceSession;

pub async fn list<S: ConfigStore>(session: &DeviceSession<'_, S>) -> Result<Vec<Vrf>, CoreError> {
    let tree = fetch(
        session,
        &paths::vrfs(),
        QueryKind::List(ListTolerance::LogicalEmpty),
    )
    .await?
    .into_tree();
    Ok(keyed_children(Some(unwrap_envelope(&tree, "name")))
        .map(|(name, cfg)| Vrf::from_tree(name, cfg))
        .collect())
}

pub async fn get<S: ConfigStore>(session: &DeviceSession<'_, S>, name: &str) -> Result<Vrf, CoreError> {
    read(
        session,
        name,
        QueryKind::Get {
            resource: "VRF",
            id: name,
        },
    )
    .await
}

async fn read<S: ConfigStore>(
    session: &DeviceSession<'_, S>,
    name: &str,
    kind: QueryKind<'_>,
) -> Result<Vrf, CoreError> {
    let tree = fetch(session, &paths::vrf(name)?, kind).await?.into_tree();
    Ok(Vrf::from_tree(name, &tree))
}

pub fn create_plan(req: &CreateVrfRequest) -> Result<CompoundOp, CoreError> {
    req.validate()?;
    let base = paths::vrf(&req.name)?;
    Ok(CompoundOp::new()
        .set(base.child("table").value("table", &req.table)?)
        .optional(&base, "description", "description", &req.description)?)
}

/// Returns the request as created. An optional field the device refused
/// is still echoed; only a later `get` shows what was stored.
pub async fn create<S: ConfigStore>(
    session: &DeviceSession<'_, S>,
    req: &CreateVrfRequest,
) -> Result<Vrf, CoreError> {
    create_plan(req)?.run(session).await?;
    Ok(Vrf {
        name: req.name.clone(),
        table: req.table.clone(),
        description: req.description.clone(),
    })
}

pub fn update_plan(name: &str, req: &UpdateVrfRequest) -> Result<CompoundOp, CoreError> {
    let base = paths::vrf(name)?;
    let mut plan = CompoundOp::new();
    if !req.table.is_empty() {
        plan = plan.set(base.child("table").value("table", &req.table)?);
    }
    Ok(plan.optional(&base, "description", "description", &req.description)?)
}

/// Apply the changes, then answer with what the device now holds.
pub async fn update<S: ConfigStore>(
    session: &DeviceSession<'_, S>,
    name: &str,
    req: &UpdateVrfRequest,
) -> Result<Vrf, CoreError> {
    update_plan(name, req)?.run(session).await?;
    read(session, name, QueryKind::Refresh).await
}

pub async fn delete<S: ConfigStore>(session: &DeviceSession<'_, S>, name: &str) -> Result<(), CoreError> {
    CompoundOp::new().delete(paths::vrf(name)?).run(session).await
}

// Firewall address groups (`firewall group address-group <name>`).

use vyos_api::{ConfigPath, ConfigStore};

use super::fetch;
use crate::classify::{ListTolerance, QueryKind};
use crate::error::CoreError;
use crate::model::AddressGroup;
use crate::normalize::{keyed_children, unwrap_envelope};
use crate::paths;
use crate::requests::{CreateAddressGroupRequest, UpdateAddressGroupRequest};
use crate::sequence::CompoundOp;
use crate::session::DeviceSession;

pub async fn list<S: ConfigStore>(
    session: &DeviceSession<'_, S>,
) -> Result<Vec<AddressGroup>, CoreError> {
    let tree = fetch(
        session,
        &paths::address_groups(),
        QueryKind::List(ListTolerance::LogicalEmpty),
    )
    .await?
    .into_tree();
    Ok(keyed_children(Some(unwrap_envelope(&tree, "address-group")))
        .map(|(name, cfg)| AddressGroup::from_tree(name, cfg))
        .collect())
}

pub async fn get<S: ConfigStore>(
    session: &DeviceSession<'_, S>,
    name: &str,
) -> Result<AddressGroup, CoreError> {
    let tree = fetch(
        session,
        &paths::address_group(name)?,
        QueryKind::Get {
            resource: "address group",
            id: name,
        },
    )
    .await?
    .into_tree();
    Ok(AddressGroup::from_tree(name, &tree))
}

/// One required step per member. A group without members is created by
/// setting the bare group node.
pub fn create_plan(req: &CreateAddressGroupRequest) -> Result<CompoundOp, CoreError> {
    req.validate()?;
    let base = paths::address_group(&req.name)?;
    let plan = if req.addresses.is_empty() {
        CompoundOp::new().set(base.clone())
    } else {
        members(CompoundOp::new(), &base, &req.addresses)?
    };
    Ok(plan.optional(&base, "description", "description", &req.description)?)
}

fn members(mut plan: CompoundOp, base: &ConfigPath, addresses: &[String]) -> Result<CompoundOp, CoreError> {
    for address in addresses {
        plan = plan.set(base.child("address").value("addresses", address)?);
    }
    Ok(plan)
}

pub async fn create<S: ConfigStore>(
    session: &DeviceSession<'_, S>,
    req: &CreateAddressGroupRequest,
) -> Result<AddressGroup, CoreError> {
    create_plan(req)?.run(session).await?;
    Ok(AddressGroup {
        name: req.name.clone(),
        addresses: req.addresses.clone(),
        description: req.description.clone(),
    })
}

/// Replace the member list wholesale: drop every address, then add the
/// new ones back.
pub fn update_plan(name: &str, req: &UpdateAddressGroupRequest) -> Result<CompoundOp, CoreError> {
    let base = paths::address_group(name)?;
    let plan = members(
        CompoundOp::new().try_delete(base.child("address")),
        &base,
        &req.addresses,
    )?;
    Ok(plan.optional(&base, "description", "description", &req.description)?)
}

pub async fn update<S: ConfigStore>(
    session: &DeviceSession<'_, S>,
    name: &str,
    req: &UpdateAddressGroupRequest,
) -> Result<AddressGroup, CoreError> {
    update_plan(name, req)?.run(session).await?;
    Ok(AddressGroup {
        name: name.to_owned(),
        addresses: req.addresses.clone(),
        description: req.description.clone(),
    })
}

pub async fn delete<S: ConfigStore>(session: &DeviceSession<'_, S>, name: &str) -> Result<(), CoreError> {
    CompoundOp::new()
        .delete(paths::address_group(name)?)
        .run(session)
        .await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::sequence::{StepOp, StepPolicy};
    use crate::testing::ScriptedStore;

    fn session(store: &ScriptedStore) -> DeviceSession<'_, ScriptedStore> {
        DeviceSession::new(store, CancellationToken::new())
    }

    #[tokio::test]
    async fn list_normalizes_single_and_multiple_members() {
        let store = ScriptedStore::new().showing(
            "firewall group address-group",
            json!({"address-group": {
                "LAN": {"address": ["10.0.0.1", "10.0.0.2"]},
                "DMZ": {"address": "192.0.2.10", "description": "servers"},
                "EMPTY": {}
            }}),
        );
        let groups = list(&session(&store)).await.unwrap();
        let summary: Vec<(&str, usize)> = groups
            .iter()
            .map(|g| (g.name.as_str(), g.addresses.len()))
            .collect();
        assert_eq!(summary, vec![("DMZ", 1), ("EMPTY", 0), ("LAN", 2)]);
    }

    #[test]
    fn empty_group_sets_bare_node() {
        let req = CreateAddressGroupRequest {
            name: "EMPTY".into(),
            ..CreateAddressGroupRequest::default()
        };
        let plan = create_plan(&req).unwrap();
        assert_eq!(plan.steps().len(), 1);
        assert_eq!(
            plan.steps()[0].path.to_string(),
            "firewall group address-group EMPTY"
        );
    }

    #[tokio::test]
    async fn member_failure_stops_create() {
        let store = ScriptedStore::new().refusing(
            "set firewall group address-group LAN address 10.0.0.2",
            "invalid address",
        );
        let req = CreateAddressGroupRequest {
            name: "LAN".into(),
            addresses: vec!["10.0.0.1".into(), "10.0.0.2".into(), "10.0.0.3".into()],
            description: "lan".into(),
        };
        let err = create(&session(&store), &req).await.unwrap_err();
        assert_eq!(err.status_code(), 422);
        assert_eq!(store.calls().len(), 2);
    }

    #[test]
    fn update_is_delete_then_recreate() {
        let req = UpdateAddressGroupRequest {
            addresses: vec!["10.0.0.9".into()],
            description: String::new(),
        };
        let plan = update_plan("LAN", &req).unwrap();
        let steps: Vec<(StepOp, StepPolicy, String)> = plan
            .steps()
            .iter()
            .map(|s| (s.op, s.policy, s.path.to_string()))
            .collect();
        assert_eq!(
            steps,
            vec![
                (
                    StepOp::Delete,
                    StepPolicy::BestEffort,
                    "firewall group address-group LAN address".into()
                ),
                (
                    StepOp::Set,
                    StepPolicy::Required,
                    "firewall group address-group LAN address 10.0.0.9".into()
                ),
            ]
        );
    }

    #[test]
    fn member_with_whitespace_is_rejected_up_front() {
        let req = CreateAddressGroupRequest {
            name: "LAN".into(),
            addresses: vec!["10.0.0.1 10.0.0.2".into()],
            ..CreateAddressGroupRequest::default()
        };
        assert_eq!(create_plan(&req).unwrap_err().status_code(), 400);
    }
}

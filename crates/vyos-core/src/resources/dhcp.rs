// DHCP shared networks (`service dhcp-server shared-network-name <name>`).

use vyos_api::{ConfigPath, ConfigStore};

use super::fetch;
use crate::classify::{ListTolerance, QueryKind};
use crate::error::CoreError;
use crate::model::{DhcpServer, DhcpSubnet};
use crate::normalize::{keyed_children, unwrap_envelope};
use crate::paths;
use crate::requests::{CreateDhcpServerRequest, DhcpSubnetRequest, UpdateDhcpServerRequest};
use crate::sequence::CompoundOp;
use crate::session::DeviceSession;

pub async fn list<S: ConfigStore>(
    session: &DeviceSession<'_, S>,
) -> Result<Vec<DhcpServer>, CoreError> {
    let tree = fetch(
        session,
        &paths::dhcp_servers(),
        QueryKind::List(ListTolerance::AnyFailure),
    )
    .await?
    .into_tree();
    Ok(keyed_children(Some(unwrap_envelope(&tree, "shared-network-name")))
        .map(|(name, cfg)| DhcpServer::from_tree(name, cfg))
        .collect())
}

pub async fn get<S: ConfigStore>(
    session: &DeviceSession<'_, S>,
    name: &str,
) -> Result<DhcpServer, CoreError> {
    read(
        session,
        name,
        QueryKind::Get {
            resource: "DHCP server",
            id: name,
        },
    )
    .await
}

async fn read<S: ConfigStore>(
    session: &DeviceSession<'_, S>,
    name: &str,
    kind: QueryKind<'_>,
) -> Result<DhcpServer, CoreError> {
    let tree = fetch(session, &paths::dhcp_server(name)?, kind)
        .await?
        .into_tree();
    Ok(DhcpServer::from_tree(name, &tree))
}

/// The subnet node is the anchor; every option under it is best-effort.
fn subnet_plan(name: &str, req: &DhcpSubnetRequest) -> Result<CompoundOp, CoreError> {
    let subnet = paths::dhcp_subnet(name, &req.subnet)?;
    let mut plan = CompoundOp::new().set(subnet.clone()).optional(
        &subnet,
        "default-router",
        "default_router",
        &req.default_router,
    )?;
    for server in req.dns_servers() {
        plan = plan.try_set(subnet.child("name-server").value("dns_servers", server)?);
    }
    let range: ConfigPath = subnet.child("range").number(0);
    Ok(plan
        .optional(&range, "start", "range_start", &req.range_start)?
        .optional(&range, "stop", "range_stop", &req.range_stop)?
        .optional(&subnet, "lease", "lease", &req.lease)?)
}

pub fn create_plan(req: &CreateDhcpServerRequest) -> Result<CompoundOp, CoreError> {
    req.validate()?;
    subnet_plan(&req.name, &req.subnet)
}

pub async fn create<S: ConfigStore>(
    session: &DeviceSession<'_, S>,
    req: &CreateDhcpServerRequest,
) -> Result<DhcpServer, CoreError> {
    create_plan(req)?.run(session).await?;
    let subnet = &req.subnet;
    Ok(DhcpServer {
        name: req.name.clone(),
        subnets: vec![DhcpSubnet {
            subnet: subnet.subnet.clone(),
            default_router: subnet.default_router.clone(),
            dns_servers: subnet.dns_servers().map(str::to_owned).collect(),
            range_start: subnet.range_start.clone(),
            range_stop: subnet.range_stop.clone(),
            lease: subnet.lease.clone(),
        }],
    })
}

/// Adds or amends one subnet; other subnets are left alone.
pub fn update_plan(name: &str, req: &UpdateDhcpServerRequest) -> Result<CompoundOp, CoreError> {
    req.validate()?;
    subnet_plan(name, req)
}

pub async fn update<S: ConfigStore>(
    session: &DeviceSession<'_, S>,
    name: &str,
    req: &UpdateDhcpServerRequest,
) -> Result<DhcpServer, CoreError> {
    update_plan(name, req)?.run(session).await?;
    read(session, name, QueryKind::Refresh).await
}

pub async fn delete<S: ConfigStore>(session: &DeviceSession<'_, S>, name: &str) -> Result<(), CoreError> {
    CompoundOp::new()
        .delete(paths::dhcp_server(name)?)
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
    use crate::sequence::StepPolicy;
    use crate::testing::ScriptedStore;

    fn session(store: &ScriptedStore) -> DeviceSession<'_, ScriptedStore> {
        DeviceSession::new(store, CancellationToken::new())
    }

    fn lan() -> CreateDhcpServerRequest {
        serde_json::from_value(json!({
            "name": "LAN",
            "subnet": "192.168.1.0/24",
            "default_router": "192.168.1.1",
            "dns_servers": ["1.1.1.1", "  ", "9.9.9.9"],
            "range_start": "192.168.1.100",
            "range_stop": "192.168.1.200",
            "lease": "86400"
        }))
        .unwrap()
    }

    #[test]
    fn create_plan_sets_subnet_then_options() {
        let plan = create_plan(&lan()).unwrap();
        let lines: Vec<String> = plan.steps().iter().map(|s| s.path.to_string()).collect();
        let base = "service dhcp-server shared-network-name LAN subnet 192.168.1.0/24";
        assert_eq!(
            lines,
            vec![
                base.to_owned(),
                format!("{base} default-router 192.168.1.1"),
                format!("{base} name-server 1.1.1.1"),
                format!("{base} name-server 9.9.9.9"),
                format!("{base} range 0 start 192.168.1.100"),
                format!("{base} range 0 stop 192.168.1.200"),
                format!("{base} lease 86400"),
            ]
        );
        assert_eq!(plan.steps()[0].policy, StepPolicy::Required);
        assert!(
            plan.steps()[1..]
                .iter()
                .all(|s| s.policy == StepPolicy::BestEffort)
        );
    }

    #[tokio::test]
    async fn create_echoes_trimmed_name_servers() {
        let store = ScriptedStore::new();
        let server = create(&session(&store), &lan()).await.unwrap();
        assert_eq!(server.subnets[0].dns_servers, vec!["1.1.1.1", "9.9.9.9"]);
    }

    #[tokio::test]
    async fn refused_section_lists_nothing() {
        let store = ScriptedStore::new().refusing(
            "show service dhcp-server shared-network-name",
            "Configuration under specified path is empty",
        );
        assert!(list(&session(&store)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_needs_subnet() {
        let store = ScriptedStore::new();
        let err = update(&session(&store), "LAN", &UpdateDhcpServerRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "subnet is required");
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn update_returns_remote_state() {
        let store = ScriptedStore::new().showing(
            "service dhcp-server shared-network-name LAN",
            json!({"subnet": {"192.168.1.0/24": {"lease": "3600"}}}),
        );
        let req = UpdateDhcpServerRequest {
            subnet: "192.168.1.0/24".into(),
            lease: "3600".into(),
            ..UpdateDhcpServerRequest::default()
        };
        let server = update(&session(&store), "LAN", &req).await.unwrap();
        assert_eq!(server.subnets[0].lease, "3600");
        assert_eq!(store.calls().len(), 3);
    }

    #[tokio::test]
    async fn update_survives_refused_read_back() {
        let store = ScriptedStore::new().refusing(
            "show service dhcp-server shared-network-name LAN",
            "permission denied",
        );
        let req = UpdateDhcpServerRequest {
            subnet: "192.168.1.0/24".into(),
            ..UpdateDhcpServerRequest::default()
        };
        let server = update(&session(&store), "LAN", &req).await.unwrap();
        assert_eq!(server.name, "LAN");
        assert!(server.subnets.is_empty());
    }
}

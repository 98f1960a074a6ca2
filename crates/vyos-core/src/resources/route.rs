// Static IPv4 routes (`protocols static route <prefix>`).

use vyos_api::{ConfigPath, ConfigStore};

use super::fetch;
use crate::classify::{ListTolerance, QueryKind};
use crate::error::CoreError;
use crate::model::Route;
use crate::normalize::{keyed_children, unwrap_envelope};
use crate::paths;
use crate::requests::{CreateRouteRequest, UpdateRouteRequest};
use crate::sequence::CompoundOp;
use crate::session::DeviceSession;

/// Like NAT, an untouched `protocols static` section answers with an
/// HTTP error; any failure reads as "no routes".
pub async fn list<S: ConfigStore>(session: &DeviceSession<'_, S>) -> Result<Vec<Route>, CoreError> {
    let tree = fetch(
        session,
        &paths::routes(),
        QueryKind::List(ListTolerance::AnyFailure),
    )
    .await?
    .into_tree();
    Ok(keyed_children(Some(unwrap_envelope(&tree, "route")))
        .map(|(network, cfg)| Route::from_tree(network, cfg))
        .collect())
}

pub async fn get<S: ConfigStore>(session: &DeviceSession<'_, S>, network: &str) -> Result<Route, CoreError> {
    read(
        session,
        network,
        QueryKind::Get {
            resource: "route",
            id: network,
        },
    )
    .await
}

async fn read<S: ConfigStore>(
    session: &DeviceSession<'_, S>,
    network: &str,
    kind: QueryKind<'_>,
) -> Result<Route, CoreError> {
    let tree = fetch(session, &paths::route(network)?, kind)
        .await?
        .into_tree();
    Ok(Route::from_tree(network, &tree))
}

/// Required next-hop, then its distance, both under the route base.
fn next_hop(
    plan: CompoundOp,
    base: &ConfigPath,
    hop: &str,
    distance: &str,
) -> Result<CompoundOp, CoreError> {
    let hop = base.child("next-hop").value("next_hop", hop)?;
    Ok(plan
        .set(hop.clone())
        .optional(&hop, "distance", "distance", distance)?)
}

pub fn create_plan(req: &CreateRouteRequest) -> Result<CompoundOp, CoreError> {
    req.validate()?;
    let base = paths::route(&req.network)?;
    let plan = next_hop(CompoundOp::new(), &base, &req.next_hop, &req.distance)?;
    Ok(plan.optional(&base, "description", "description", &req.description)?)
}

pub async fn create<S: ConfigStore>(
    session: &DeviceSession<'_, S>,
    req: &CreateRouteRequest,
) -> Result<Route, CoreError> {
    create_plan(req)?.run(session).await?;
    Ok(Route {
        network: req.network.clone(),
        next_hop: req.next_hop.clone(),
        distance: req.distance.clone(),
        description: req.description.clone(),
    })
}

/// Adds the given next-hop alongside any existing ones.
pub fn update_plan(network: &str, req: &UpdateRouteRequest) -> Result<CompoundOp, CoreError> {
    req.validate()?;
    let base = paths::route(network)?;
    let mut plan = CompoundOp::new();
    if !req.next_hop.is_empty() {
        plan = next_hop(plan, &base, &req.next_hop, &req.distance)?;
    }
    Ok(plan.optional(&base, "description", "description", &req.description)?)
}

pub async fn update<S: ConfigStore>(
    session: &DeviceSession<'_, S>,
    network: &str,
    req: &UpdateRouteRequest,
) -> Result<Route, CoreError> {
    update_plan(network, req)?.run(session).await?;
    read(session, network, QueryKind::Refresh).await
}

pub async fn delete<S: ConfigStore>(session: &DeviceSession<'_, S>, network: &str) -> Result<(), CoreError> {
    CompoundOp::new()
        .delete(paths::route(network)?)
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
    use crate::testing::{Script, ScriptedStore};

    fn session(store: &ScriptedStore) -> DeviceSession<'_, ScriptedStore> {
        DeviceSession::new(store, CancellationToken::new())
    }

    #[tokio::test]
    async fn unreachable_device_lists_no_routes() {
        let store = ScriptedStore::new().on("show protocols static route", Script::Timeout);
        assert!(list(&session(&store)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_reads_next_hop_and_distance() {
        let store = ScriptedStore::new().showing(
            "protocols static route",
            json!({"route": {
                "0.0.0.0/0": {"next-hop": {"192.0.2.1": {"distance": "5"}}},
                "10.0.0.0/8": {"next-hop": {"10.255.0.1": {}}, "description": "core"}
            }}),
        );
        let routes = list(&session(&store)).await.unwrap();
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].distance, "5");
        assert_eq!(routes[1].next_hop, "10.255.0.1");
        assert_eq!(routes[1].distance, "");
    }

    #[test]
    fn distance_hangs_off_the_next_hop() {
        let req = CreateRouteRequest {
            network: "0.0.0.0/0".into(),
            next_hop: "192.0.2.1".into(),
            distance: "10".into(),
            description: "default".into(),
        };
        let plan = create_plan(&req).unwrap();
        let steps: Vec<(String, StepPolicy)> = plan
            .steps()
            .iter()
            .map(|s| (s.path.to_string(), s.policy))
            .collect();
        assert_eq!(
            steps,
            vec![
                (
                    "protocols static route 0.0.0.0/0 next-hop 192.0.2.1".into(),
                    StepPolicy::Required
                ),
                (
                    "protocols static route 0.0.0.0/0 next-hop 192.0.2.1 distance 10".into(),
                    StepPolicy::BestEffort
                ),
                (
                    "protocols static route 0.0.0.0/0 description default".into(),
                    StepPolicy::BestEffort
                ),
            ]
        );
    }

    #[tokio::test]
    async fn update_distance_without_next_hop_is_rejected() {
        let store = ScriptedStore::new();
        let req = UpdateRouteRequest {
            distance: "10".into(),
            ..UpdateRouteRequest::default()
        };
        let err = update(&session(&store), "0.0.0.0/0", &req).await.unwrap_err();
        assert_eq!(err.to_string(), "distance requires next_hop");
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn missing_route_is_not_found() {
        let store = ScriptedStore::new().refusing(
            "show protocols static route 172.16.0.0/12",
            "Configuration under specified path is empty",
        );
        let err = get(&session(&store), "172.16.0.0/12").await.unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn update_survives_refused_read_back() {
        let store = ScriptedStore::new().refusing(
            "show protocols static route 10.0.0.0/8",
            "permission denied",
        );
        let req = UpdateRouteRequest {
            description: "core".into(),
            ..UpdateRouteRequest::default()
        };
        let route = update(&session(&store), "10.0.0.0/8", &req).await.unwrap();
        assert_eq!(route.network, "10.0.0.0/8");
        assert_eq!(
            store.calls()[0],
            "set protocols static route 10.0.0.0/8 description core"
        );
    }
}

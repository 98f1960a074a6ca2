// Firewall policies and their rules.
//
// A policy is either one of the built-in IPv4 filter chains or a named
// ruleset; `PolicyRef` picks the path. Rules live inside the policy
// subtree, so rule reads fetch the whole policy and pick from it.

use strum::IntoEnumIterator;
use tracing::debug;
use vyos_api::{ConfigPath, ConfigStore, TreeNode};

use super::fetch;
use crate::classify::{ListTolerance, QueryKind};
use crate::error::CoreError;
use crate::model::{Policy, PolicyRule, Rule, ToggleState};
use crate::normalize::{keyed_children, unwrap_envelope};
use crate::paths::{self, BaseChain, PolicyRef};
use crate::requests::{CreatePolicyRequest, CreateRuleRequest, UpdatePolicyRequest};
use crate::sequence::CompoundOp;
use crate::session::DeviceSession;

// ── Policies ────────────────────────────────────────────────────────

/// Named policies followed by every base chain that has rules or a
/// default action.
pub async fn list<S: ConfigStore>(session: &DeviceSession<'_, S>) -> Result<Vec<Policy>, CoreError> {
    let tree = fetch(
        session,
        &paths::named_policies(),
        QueryKind::List(ListTolerance::LogicalEmpty),
    )
    .await?
    .into_tree();
    let mut policies: Vec<Policy> = keyed_children(Some(unwrap_envelope(&tree, "name")))
        .map(|(name, cfg)| Policy::from_tree(name, cfg))
        .collect();

    for chain in BaseChain::iter() {
        if let Some(policy) = base_chain(session, chain).await? {
            policies.push(policy);
        }
    }
    Ok(policies)
}

/// An unreadable or unconfigured base chain is simply left out.
async fn base_chain<S: ConfigStore>(
    session: &DeviceSession<'_, S>,
    chain: BaseChain,
) -> Result<Option<Policy>, CoreError> {
    let path = PolicyRef::Base(chain).path()?;
    let tree = match fetch(session, &path, QueryKind::List(ListTolerance::AnyFailure)).await {
        Ok(outcome) => outcome.into_tree(),
        Err(CoreError::RemoteRejected { message }) => {
            debug!(%chain, %message, "base chain not readable, skipping");
            return Ok(None);
        }
        Err(err) => return Err(err),
    };
    let body = unwrap_envelope(&tree, "filter");
    let name: &'static str = chain.into();
    Ok(Policy::has_content(body).then(|| Policy::from_tree(name, body)))
}

/// The policy subtree with any `filter` or `name <policy>` wrapper removed.
fn policy_body<'a>(tree: &'a TreeNode, name: &str) -> &'a TreeNode {
    match tree.at(&["name", name]) {
        Some(inner @ TreeNode::Map(_)) => inner,
        _ => unwrap_envelope(tree, "filter"),
    }
}

pub async fn get<S: ConfigStore>(session: &DeviceSession<'_, S>, name: &str) -> Result<Policy, CoreError> {
    read(
        session,
        name,
        QueryKind::Get {
            resource: "policy",
            id: name,
        },
    )
    .await
}

async fn read<S: ConfigStore>(
    session: &DeviceSession<'_, S>,
    name: &str,
    kind: QueryKind<'_>,
) -> Result<Policy, CoreError> {
    let path = PolicyRef::parse(name).path()?;
    let tree = fetch(session, &path, kind).await?.into_tree();
    Ok(Policy::from_tree(name, policy_body(&tree, name)))
}

pub fn create_plan(req: &CreatePolicyRequest) -> Result<CompoundOp, CoreError> {
    req.validate()?;
    let base = PolicyRef::parse(&req.name).path()?;
    Ok(CompoundOp::new()
        .set(
            base.child("default-action")
                .value("default_action", &req.default_action)?,
        )
        .optional(&base, "description", "description", &req.description)?)
}

pub async fn create<S: ConfigStore>(
    session: &DeviceSession<'_, S>,
    req: &CreatePolicyRequest,
) -> Result<Policy, CoreError> {
    create_plan(req)?.run(session).await?;
    Ok(Policy {
        name: req.name.clone(),
        default_action: req.default_action.clone(),
        description: req.description.clone(),
        disabled: false,
        rules: Vec::new(),
    })
}

pub fn update_plan(name: &str, req: &UpdatePolicyRequest) -> Result<CompoundOp, CoreError> {
    let base = PolicyRef::parse(name).path()?;
    let mut plan = CompoundOp::new();
    if !req.default_action.is_empty() {
        plan = plan.set(
            base.child("default-action")
                .value("default_action", &req.default_action)?,
        );
    }
    Ok(plan.optional(&base, "description", "description", &req.description)?)
}

pub async fn update<S: ConfigStore>(
    session: &DeviceSession<'_, S>,
    name: &str,
    req: &UpdatePolicyRequest,
) -> Result<Policy, CoreError> {
    update_plan(name, req)?.run(session).await?;
    read(session, name, QueryKind::Refresh).await
}

pub async fn delete<S: ConfigStore>(session: &DeviceSession<'_, S>, name: &str) -> Result<(), CoreError> {
    CompoundOp::new()
        .delete(PolicyRef::parse(name).path()?)
        .run(session)
        .await
}

/// Set or remove the policy's `disable` flag.
pub async fn set_disabled<S: ConfigStore>(
    session: &DeviceSession<'_, S>,
    name: &str,
    disabled: bool,
) -> Result<ToggleState, CoreError> {
    let flag = PolicyRef::parse(name).path()?.kw("disable");
    toggle(flag, disabled).run(session).await?;
    Ok(ToggleState { disabled })
}

// ── Rules ───────────────────────────────────────────────────────────

/// Rules of one policy, ascending by id.
pub async fn rules<S: ConfigStore>(
    session: &DeviceSession<'_, S>,
    policy: &str,
) -> Result<Vec<Rule>, CoreError> {
    Ok(get(session, policy).await?.rules)
}

pub async fn rule<S: ConfigStore>(
    session: &DeviceSession<'_, S>,
    policy: &str,
    rule_id: u32,
) -> Result<PolicyRule, CoreError> {
    get(session, policy)
        .await?
        .rules
        .into_iter()
        .find(|rule| rule.rule_id == rule_id)
        .map(|rule| PolicyRule {
            policy: policy.to_owned(),
            rule,
        })
        .ok_or_else(|| CoreError::not_found("rule", rule_id.to_string()))
}

/// The action is the anchor. Source and destination take either an
/// address or a group, with the address winning when both are given.
pub fn add_rule_plan(policy: &str, req: &CreateRuleRequest) -> Result<CompoundOp, CoreError> {
    req.validate()?;
    let base = PolicyRef::parse(policy).rule(req.rule_id)?;
    let mut plan = CompoundOp::new().set(base.child("action").value("action", &req.action)?);
    if let Some(path) = endpoint(&base, "source", &req.source, &req.source_group)? {
        plan = plan.try_set(path);
    }
    if let Some(path) = endpoint(&base, "destination", &req.destination, &req.destination_group)? {
        plan = plan.try_set(path);
    }
    Ok(plan.optional(&base, "description", "description", &req.description)?)
}

fn endpoint(
    base: &ConfigPath,
    side: &'static str,
    address: &str,
    group: &str,
) -> Result<Option<ConfigPath>, CoreError> {
    let side_path = base.child(side);
    if !address.is_empty() {
        return Ok(Some(side_path.kw("address").value(side, address)?));
    }
    if !group.is_empty() {
        return Ok(Some(
            side_path.kw("group").kw("address-group").value(side, group)?,
        ));
    }
    Ok(None)
}

pub async fn add_rule<S: ConfigStore>(
    session: &DeviceSession<'_, S>,
    policy: &str,
    req: &CreateRuleRequest,
) -> Result<PolicyRule, CoreError> {
    add_rule_plan(policy, req)?.run(session).await?;
    Ok(PolicyRule {
        policy: policy.to_owned(),
        rule: Rule {
            rule_id: req.rule_id,
            action: req.action.clone(),
            source: req.source.clone(),
            source_group: req.source_group.clone(),
            destination: req.destination.clone(),
            destination_group: req.destination_group.clone(),
            description: req.description.clone(),
            disabled: false,
        },
    })
}

pub async fn delete_rule<S: ConfigStore>(
    session: &DeviceSession<'_, S>,
    policy: &str,
    rule_id: u32,
) -> Result<(), CoreError> {
    CompoundOp::new()
        .delete(PolicyRef::parse(policy).rule(rule_id)?)
        .run(session)
        .await
}

pub async fn set_rule_disabled<S: ConfigStore>(
    session: &DeviceSession<'_, S>,
    policy: &str,
    rule_id: u32,
    disabled: bool,
) -> Result<ToggleState, CoreError> {
    let flag = PolicyRef::parse(policy).rule(rule_id)?.kw("disable");
    toggle(flag, disabled).run(session).await?;
    Ok(ToggleState { disabled })
}

/// Presence flags are switched by creating or removing the node itself.
fn toggle(flag: ConfigPath, disabled: bool) -> CompoundOp {
    if disabled {
        CompoundOp::new().set(flag)
    } else {
        CompoundOp::new().delete(flag)
    }
}

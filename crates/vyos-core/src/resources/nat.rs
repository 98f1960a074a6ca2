// Source and destination NAT rules (`nat <type> rule <id>`).

use vyos_api::{ConfigPath, ConfigStore};

use super::fetch;
use crate::classify::{ListTolerance, QueryKind};
use crate::error::CoreError;
use crate::model::{NatKind, NatRule};
use crate::normalize::{numeric_children, unwrap_envelope};
use crate::paths;
use crate::requests::{CreateNatRuleRequest, NatRuleFields, UpdateNatRuleRequest};
use crate::sequence::CompoundOp;
use crate::session::DeviceSession;

/// A device that never had NAT configured answers with an HTTP error
/// rather than an empty reply, so any failure reads as "no rules".
pub async fn list<S: ConfigStore>(
    session: &DeviceSession<'_, S>,
    kind: NatKind,
) -> Result<Vec<NatRule>, CoreError> {
    let tree = fetch(
        session,
        &paths::nat_rules(kind),
        QueryKind::List(ListTolerance::AnyFailure),
    )
    .await?
    .into_tree();
    Ok(numeric_children(Some(unwrap_envelope(&tree, "rule")))
        .into_iter()
        .map(|(id, cfg)| NatRule::from_tree(kind, id, cfg))
        .collect())
}

pub async fn get<S: ConfigStore>(
    session: &DeviceSession<'_, S>,
    kind: NatKind,
    rule_id: u32,
) -> Result<NatRule, CoreError> {
    let id = rule_id.to_string();
    read(
        session,
        kind,
        rule_id,
        QueryKind::Get {
            resource: "NAT rule",
            id: &id,
        },
    )
    .await
}

async fn read<S: ConfigStore>(
    session: &DeviceSession<'_, S>,
    kind: NatKind,
    rule_id: u32,
    query: QueryKind<'_>,
) -> Result<NatRule, CoreError> {
    let tree = fetch(session, &paths::nat_rule(kind, rule_id), query)
        .await?
        .into_tree();
    Ok(NatRule::from_tree(kind, rule_id, &tree))
}

/// Best-effort steps for every optional field, in a fixed order.
fn optional_fields(
    mut plan: CompoundOp,
    base: &ConfigPath,
    fields: &NatRuleFields,
) -> Result<CompoundOp, CoreError> {
    let translation = base.child("translation");
    plan = plan.optional(&translation, "port", "translation_port", &fields.translation_port)?;
    plan = plan.optional(base, "description", "description", &fields.description)?;
    plan = plan.optional(base, "protocol", "protocol", &fields.protocol)?;
    plan = plan.optional(
        &base.child("outbound-interface"),
        "name",
        "outbound_interface",
        &fields.outbound_interface,
    )?;
    plan = plan.optional(
        &base.child("inbound-interface"),
        "name",
        "inbound_interface",
        &fields.inbound_interface,
    )?;
    let source = base.child("source");
    plan = plan.optional(&source, "address", "source_address", &fields.source_address)?;
    plan = plan.optional(&source, "port", "source_port", &fields.source_port)?;
    let destination = base.child("destination");
    plan = plan.optional(
        &destination,
        "address",
        "destination_address",
        &fields.destination_address,
    )?;
    Ok(plan.optional(&destination, "port", "destination_port", &fields.destination_port)?)
}

fn translation_address(base: &ConfigPath, address: &str) -> Result<ConfigPath, CoreError> {
    Ok(base
        .child("translation")
        .kw("address")
        .value("translation_address", address)?)
}

pub fn create_plan(kind: NatKind, req: &CreateNatRuleRequest) -> Result<CompoundOp, CoreError> {
    req.validate()?;
    let base = paths::nat_rule(kind, req.rule_id);
    let anchor = translation_address(&base, &req.fields.translation_address)?;
    optional_fields(CompoundOp::new().set(anchor), &base, &req.fields)
}

pub async fn create<S: ConfigStore>(
    session: &DeviceSession<'_, S>,
    kind: NatKind,
    req: &CreateNatRuleRequest,
) -> Result<NatRule, CoreError> {
    create_plan(kind, req)?.run(session).await?;
    let fields = &req.fields;
    Ok(NatRule {
        rule_id: req.rule_id,
        kind,
        description: fields.description.clone(),
        outbound_interface: fields.outbound_interface.clone(),
        inbound_interface: fields.inbound_interface.clone(),
        protocol: fields.protocol.clone(),
        source_address: fields.source_address.clone(),
        source_port: fields.source_port.clone(),
        destination_address: fields.destination_address.clone(),
        destination_port: fields.destination_port.clone(),
        translation_address: fields.translation_address.clone(),
        translation_port: fields.translation_port.clone(),
        disabled: false,
    })
}

pub fn update_plan(
    kind: NatKind,
    rule_id: u32,
    req: &UpdateNatRuleRequest,
) -> Result<CompoundOp, CoreError> {
    let base = paths::nat_rule(kind, rule_id);
    let mut plan = CompoundOp::new();
    if !req.translation_address.is_empty() {
        plan = plan.set(translation_address(&base, &req.translation_address)?);
    }
    optional_fields(plan, &base, req)
}

pub async fn update<S: ConfigStore>(
    session: &DeviceSession<'_, S>,
    kind: NatKind,
    rule_id: u32,
    req: &UpdateNatRuleRequest,
) -> Result<NatRule, CoreError> {
    update_plan(kind, rule_id, req)?.run(session).await?;
    read(session, kind, rule_id, QueryKind::Refresh).await
}

pub async fn delete<S: ConfigStore>(
    session: &DeviceSession<'_, S>,
    kind: NatKind,
    rule_id: u32,
) -> Result<(), CoreError> {
    CompoundOp::new()
        .delete(paths::nat_rule(kind, rule_id))
        .run(session)
        .await
}

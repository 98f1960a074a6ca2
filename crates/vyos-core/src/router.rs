// ── Gateway router ──
//
// Framework-free request dispatch. An HTTP listener (or the CLI) turns its
// request into a `GatewayRequest`, hands it to `Gateway::handle` together
// with a cancellation token tied to the client connection, and writes the
// returned status and JSON body back out.
//
// Checks run in a fixed order: route, method, device, path parameters,
// body, required fields. Nothing reaches the device until all of them pass.

use std::borrow::Cow;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use percent_encoding::percent_decode_str;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use vyos_api::{ConfigStore, Method};

use crate::error::CoreError;
use crate::model::NatKind;
use crate::registry::DeviceRegistry;
use crate::resources::{
    address_group, dhcp, firewall, nat, network, route, service, vlan, vrf,
};
use crate::session::DeviceSession;

const DEFAULT_INTERFACE_TYPE: &str = "ethernet";

// ── Request / response ──────────────────────────────────────────────

/// One inbound call. `path` may carry a `?query`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<String>,
}

impl GatewayRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Status code and optional JSON document. `body` is `None` for 204.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayResponse {
    pub status: u16,
    pub body: Option<Value>,
}

impl GatewayResponse {
    fn json<T: Serialize>(status: u16, value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(body) => Self {
                status,
                body: Some(body),
            },
            Err(e) => Self::message(500, format!("failed to encode response: {e}")),
        }
    }

    fn message(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            body: Some(json!({ "error": message.into() })),
        }
    }

    fn no_content() -> Self {
        Self {
            status: 204,
            body: None,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl From<CoreError> for GatewayResponse {
    fn from(err: CoreError) -> Self {
        Self {
            status: err.status_code(),
            body: Some(err.to_body()),
        }
    }
}

fn ok<T: Serialize>(value: &T) -> Result<GatewayResponse, CoreError> {
    Ok(GatewayResponse::json(200, value))
}

fn created<T: Serialize>(value: &T) -> Result<GatewayResponse, CoreError> {
    Ok(GatewayResponse::json(201, value))
}

// ── Route table ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint<'a> {
    Health,
    Devices,
    Device {
        device: &'a str,
        resource: DeviceResource<'a>,
    },
}

/// Everything under `/devices/{device_id}`. Path parameters are kept as
/// raw text; they are parsed after the device lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeviceResource<'a> {
    Networks,
    Network { interface: &'a str },
    Vrfs,
    Vrf { name: &'a str },
    Vlans,
    Vlan { interface: &'a str, vlan_id: &'a str },
    Policies,
    Policy { policy: &'a str },
    PolicyToggle { policy: &'a str, disabled: bool },
    Rules { policy: &'a str },
    Rule { policy: &'a str, rule_id: &'a str },
    RuleToggle { policy: &'a str, rule_id: &'a str, disabled: bool },
    AddressGroups,
    AddressGroup { name: &'a str },
    NatRules { nat_type: &'a str },
    NatRule { nat_type: &'a str, rule_id: &'a str },
    Routes,
    Route { prefix: &'a str, mask: &'a str },
    DhcpServers,
    DhcpServer { name: &'a str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Collection,
    Item,
    ReadDeleteItem,
    Toggle,
    ReadOnly,
}

impl Shape {
    fn allows(self, method: &Method) -> bool {
        match self {
            Self::Collection => matches!(*method, Method::GET | Method::POST),
            Self::Item => matches!(*method, Method::GET | Method::PUT | Method::DELETE),
            Self::ReadDeleteItem => matches!(*method, Method::GET | Method::DELETE),
            Self::Toggle => *method == Method::PUT,
            Self::ReadOnly => *method == Method::GET,
        }
    }
}

/// Percent-decoded path segments. `None` for an empty segment or one that
/// does not decode to UTF-8.
fn segments(path: &str) -> Option<Vec<Cow<'_, str>>> {
    path.trim_matches('/')
        .split('/')
        .map(|raw| {
            if raw.is_empty() {
                return None;
            }
            percent_decode_str(raw).decode_utf8().ok()
        })
        .collect()
}

impl<'a> Endpoint<'a> {
    fn parse(segments: &[&'a str]) -> Option<Self> {
        match *segments {
            ["health"] => Some(Self::Health),
            ["devices"] => Some(Self::Devices),
            ["devices", device, ref rest @ ..] => {
                DeviceResource::parse(rest).map(|resource| Self::Device { device, resource })
            }
            _ => None,
        }
    }

    fn shape(&self) -> Shape {
        match self {
            Self::Health | Self::Devices => Shape::ReadOnly,
            Self::Device { resource, .. } => resource.shape(),
        }
    }
}

impl<'a> DeviceResource<'a> {
    fn parse(segments: &[&'a str]) -> Option<Self> {
        let resource = match *segments {
            ["networks"] => Self::Networks,
            ["networks", interface] => Self::Network { interface },
            ["vrfs"] => Self::Vrfs,
            ["vrfs", name] => Self::Vrf { name },
            ["vlans"] => Self::Vlans,
            ["vlans", interface, vlan_id] => Self::Vlan { interface, vlan_id },
            ["firewall", "policies"] => Self::Policies,
            ["firewall", "policies", policy] => Self::Policy { policy },
            ["firewall", "policies", policy, toggle @ ("disable" | "enable")] => {
                Self::PolicyToggle {
                    policy,
                    disabled: toggle == "disable",
                }
            }
            ["firewall", "policies", policy, "rules"] => Self::Rules { policy },
            ["firewall", "policies", policy, "rules", rule_id] => Self::Rule { policy, rule_id },
            ["firewall", "policies", policy, "rules", rule_id, toggle @ ("disable" | "enable")] => {
                Self::RuleToggle {
                    policy,
                    rule_id,
                    disabled: toggle == "disable",
                }
            }
            ["firewall", "address-groups"] => Self::AddressGroups,
            ["firewall", "address-groups", name] => Self::AddressGroup { name },
            ["nat", nat_type, "rules"] => Self::NatRules { nat_type },
            ["nat", nat_type, "rules", rule_id] => Self::NatRule { nat_type, rule_id },
            ["routes"] => Self::Routes,
            ["routes", prefix, mask] => Self::Route { prefix, mask },
            ["dhcp", "servers"] => Self::DhcpServers,
            ["dhcp", "servers", name] => Self::DhcpServer { name },
            _ => return None,
        };
        Some(resource)
    }

    fn shape(&self) -> Shape {
        match self {
            Self::Networks
            | Self::Vrfs
            | Self::Vlans
            | Self::Policies
            | Self::Rules { .. }
            | Self::AddressGroups
            | Self::NatRules { .. }
            | Self::Routes
            | Self::DhcpServers => Shape::Collection,
            Self::Network { .. }
            | Self::Vrf { .. }
            | Self::Vlan { .. }
            | Self::Policy { .. }
            | Self::AddressGroup { .. }
            | Self::NatRule { .. }
            | Self::Route { .. }
            | Self::DhcpServer { .. } => Shape::Item,
            Self::Rule { .. } => Shape::ReadDeleteItem,
            Self::PolicyToggle { .. } | Self::RuleToggle { .. } => Shape::Toggle,
        }
    }
}

// ── Parameter and body parsing ──────────────────────────────────────

fn rule_id(raw: &str) -> Result<u32, CoreError> {
    raw.parse()
        .map_err(|_| CoreError::validation("rule_id must be an integer"))
}

fn vlan_id(raw: &str) -> Result<u32, CoreError> {
    raw.parse()
        .map_err(|_| CoreError::validation("vlan_id must be an integer"))
}

fn nat_kind(raw: &str) -> Result<NatKind, CoreError> {
    NatKind::from_str(raw)
        .map_err(|_| CoreError::validation("nat_type must be 'source' or 'destination'"))
}

/// `?type=` from the query string, `ethernet` when absent or empty.
fn interface_type(query: &str) -> String {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "type")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_INTERFACE_TYPE.to_owned())
}

fn parse_body<T: DeserializeOwned>(body: Option<&str>) -> Result<T, CoreError> {
    serde_json::from_str(body.unwrap_or_default())
        .map_err(|e| CoreError::validation(format!("invalid JSON body: {e}")))
}

// ── Gateway ─────────────────────────────────────────────────────────

/// The front-end contract: `(request, cancellation) -> (status, JSON)`.
#[derive(Debug)]
pub struct Gateway<S> {
    registry: Arc<DeviceRegistry<S>>,
    probe_timeout: Duration,
}

impl<S> Clone for Gateway<S> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            probe_timeout: self.probe_timeout,
        }
    }
}

impl<S: ConfigStore> Gateway<S> {
    pub fn new(registry: Arc<DeviceRegistry<S>>) -> Self {
        Self {
            registry,
            probe_timeout: service::DEFAULT_PROBE_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_probe_timeout(mut self, probe_timeout: Duration) -> Self {
        self.probe_timeout = probe_timeout;
        self
    }

    pub fn registry(&self) -> &DeviceRegistry<S> {
        &self.registry
    }

    /// Handle one request. Never fails: every error becomes a status code
    /// and an `{"error": ...}` body.
    pub async fn handle(&self, req: &GatewayRequest, cancel: CancellationToken) -> GatewayResponse {
        let started = Instant::now();
        let response = self.route(req, cancel).await;
        info!(
            method = %req.method,
            path = %req.path,
            status = response.status,
            duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "request handled"
        );
        response
    }

    async fn route(&self, req: &GatewayRequest, cancel: CancellationToken) -> GatewayResponse {
        let (path, query) = req.path.split_once('?').unwrap_or((req.path.as_str(), ""));

        let decoded = segments(path).unwrap_or_default();
        let segments: Vec<&str> = decoded.iter().map(AsRef::as_ref).collect();
        let Some(endpoint) = Endpoint::parse(&segments) else {
            return GatewayResponse::message(404, format!("no route for {} {path}", req.method));
        };
        if !endpoint.shape().allows(&req.method) {
            return GatewayResponse::message(
                405,
                format!("method {} not allowed for {path}", req.method),
            );
        }

        match self
            .dispatch(&req.method, endpoint, query, req.body.as_deref(), cancel)
            .await
        {
            Ok(response) => response,
            Err(err) => {
                debug!(error = %err, "request failed");
                err.into()
            }
        }
    }

    #[allow(clippy::too_many_lines)]
    async fn dispatch(
        &self,
        method: &Method,
        endpoint: Endpoint<'_>,
        query: &str,
        body: Option<&str>,
        cancel: CancellationToken,
    ) -> Result<GatewayResponse, CoreError> {
        let (device_id, resource) = match endpoint {
            Endpoint::Health => return ok(&service::health()),
            Endpoint::Devices => {
                return ok(&service::devices(&self.registry, &cancel, self.probe_timeout).await?);
            }
            Endpoint::Device { device, resource } => (device, resource),
        };
        let device = self.registry.get(device_id)?;
        let session = DeviceSession::new(device.store(), cancel);
        let s = &session;

        match (method, resource) {
            // ── Networks ──
            (&Method::GET, DeviceResource::Networks) => ok(&network::list(s).await?),
            (&Method::POST, DeviceResource::Networks) => {
                created(&network::create(s, &parse_body(body)?).await?)
            }
            (&Method::GET, DeviceResource::Network { interface }) => {
                ok(&network::get(s, &interface_type(query), interface).await?)
            }
            (&Method::PUT, DeviceResource::Network { interface }) => {
                ok(&network::update(s, interface, &parse_body(body)?).await?)
            }
            (&Method::DELETE, DeviceResource::Network { interface }) => {
                network::delete(s, &interface_type(query), interface).await?;
                Ok(GatewayResponse::no_content())
            }

            // ── VRFs ──
            (&Method::GET, DeviceResource::Vrfs) => ok(&vrf::list(s).await?),
            (&Method::POST, DeviceResource::Vrfs) => created(&vrf::create(s, &parse_body(body)?).await?),
            (&Method::GET, DeviceResource::Vrf { name }) => ok(&vrf::get(s, name).await?),
            (&Method::PUT, DeviceResource::Vrf { name }) => {
                ok(&vrf::update(s, name, &parse_body(body)?).await?)
            }
            (&Method::DELETE, DeviceResource::Vrf { name }) => {
                vrf::delete(s, name).await?;
                Ok(GatewayResponse::no_content())
            }

            // ── VLANs ──
            (&Method::GET, DeviceResource::Vlans) => ok(&vlan::list(s).await?),
            (&Method::POST, DeviceResource::Vlans) => created(&vlan::create(s, &parse_body(body)?).await?),
            (&Method::GET, DeviceResource::Vlan { interface, vlan_id: raw }) => {
                let id = vlan_id(raw)?;
                ok(&vlan::get(s, &interface_type(query), interface, id).await?)
            }
            (&Method::PUT, DeviceResource::Vlan { interface, vlan_id: raw }) => {
                let id = vlan_id(raw)?;
                ok(&vlan::update(s, interface, id, &parse_body(body)?).await?)
            }
            (&Method::DELETE, DeviceResource::Vlan { interface, vlan_id: raw }) => {
                let id = vlan_id(raw)?;
                vlan::delete(s, &interface_type(query), interface, id).await?;
                Ok(GatewayResponse::no_content())
            }

            // ── Firewall policies ──
            (&Method::GET, DeviceResource::Policies) => ok(&firewall::list(s).await?),
            (&Method::POST, DeviceResource::Policies) => {
                created(&firewall::create(s, &parse_body(body)?).await?)
            }
            (&Method::GET, DeviceResource::Policy { policy }) => ok(&firewall::get(s, policy).await?),
            (&Method::PUT, DeviceResource::Policy { policy }) => {
                ok(&firewall::update(s, policy, &parse_body(body)?).await?)
            }
            (&Method::DELETE, DeviceResource::Policy { policy }) => {
                firewall::delete(s, policy).await?;
                Ok(GatewayResponse::no_content())
            }
            (&Method::PUT, DeviceResource::PolicyToggle { policy, disabled }) => {
                ok(&firewall::set_disabled(s, policy, disabled).await?)
            }

            // ── Firewall rules ──
            (&Method::GET, DeviceResource::Rules { policy }) => ok(&firewall::rules(s, policy).await?),
            (&Method::POST, DeviceResource::Rules { policy }) => {
                created(&firewall::add_rule(s, policy, &parse_body(body)?).await?)
            }
            (&Method::GET, DeviceResource::Rule { policy, rule_id: raw }) => {
                ok(&firewall::rule(s, policy, rule_id(raw)?).await?)
            }
            (&Method::DELETE, DeviceResource::Rule { policy, rule_id: raw }) => {
                firewall::delete_rule(s, policy, rule_id(raw)?).await?;
                Ok(GatewayResponse::no_content())
            }
            (&Method::PUT, DeviceResource::RuleToggle { policy, rule_id: raw, disabled }) => {
                ok(&firewall::set_rule_disabled(s, policy, rule_id(raw)?, disabled).await?)
            }

            // ── Address groups ──
            (&Method::GET, DeviceResource::AddressGroups) => ok(&address_group::list(s).await?),
            (&Method::POST, DeviceResource::AddressGroups) => {
                created(&address_group::create(s, &parse_body(body)?).await?)
            }
            (&Method::GET, DeviceResource::AddressGroup { name }) => {
                ok(&address_group::get(s, name).await?)
            }
            (&Method::PUT, DeviceResource::AddressGroup { name }) => {
                ok(&address_group::update(s, name, &parse_body(body)?).await?)
            }
            (&Method::DELETE, DeviceResource::AddressGroup { name }) => {
                address_group::delete(s, name).await?;
                Ok(GatewayResponse::no_content())
            }

            // ── NAT ──
            (&Method::GET, DeviceResource::NatRules { nat_type }) => {
                ok(&nat::list(s, nat_kind(nat_type)?).await?)
            }
            (&Method::POST, DeviceResource::NatRules { nat_type }) => {
                let kind = nat_kind(nat_type)?;
                created(&nat::create(s, kind, &parse_body(body)?).await?)
            }
            (&Method::GET, DeviceResource::NatRule { nat_type, rule_id: raw }) => {
                let kind = nat_kind(nat_type)?;
                ok(&nat::get(s, kind, rule_id(raw)?).await?)
            }
            (&Method::PUT, DeviceResource::NatRule { nat_type, rule_id: raw }) => {
                let kind = nat_kind(nat_type)?;
                let id = rule_id(raw)?;
                ok(&nat::update(s, kind, id, &parse_body(body)?).await?)
            }
            (&Method::DELETE, DeviceResource::NatRule { nat_type, rule_id: raw }) => {
                let kind = nat_kind(nat_type)?;
                nat::delete(s, kind, rule_id(raw)?).await?;
                Ok(GatewayResponse::no_content())
            }

            // ── Static routes ──
            (&Method::GET, DeviceResource::Routes) => ok(&route::list(s).await?),
            (&Method::POST, DeviceResource::Routes) => created(&route::create(s, &parse_body(body)?).await?),
            (&Method::GET, DeviceResource::Route { prefix, mask }) => {
                ok(&route::get(s, &format!("{prefix}/{mask}")).await?)
            }
            (&Method::PUT, DeviceResource::Route { prefix, mask }) => {
                ok(&route::update(s, &format!("{prefix}/{mask}"), &parse_body(body)?).await?)
            }
            (&Method::DELETE, DeviceResource::Route { prefix, mask }) => {
                route::delete(s, &format!("{prefix}/{mask}")).await?;
                Ok(GatewayResponse::no_content())
            }

            // ── DHCP ──
            (&Method::GET, DeviceResource::DhcpServers) => ok(&dhcp::list(s).await?),
            (&Method::POST, DeviceResource::DhcpServers) => created(&dhcp::create(s, &parse_body(body)?).await?),
            (&Method::GET, DeviceResource::DhcpServer { name }) => ok(&dhcp::get(s, name).await?),
            (&Method::PUT, DeviceResource::DhcpServer { name }) => {
                ok(&dhcp::update(s, name, &parse_body(body)?).await?)
            }
            (&Method::DELETE, DeviceResource::DhcpServer { name }) => {
                dhcp::delete(s, name).await?;
                Ok(GatewayResponse::no_content())
            }

            // Filtered out by `Shape::allows` before we get here.
            _ => Ok(GatewayResponse::message(405, format!("method {method} not allowed"))),
        }
    }
}

//! Shared configuration for the VyOS gateway.
//!
//! TOML device profiles, the `VYOS_HOSTS` device list, credential
//! resolution (env + keyring + plaintext), and translation of the whole
//! thing into a `vyos_core::DeviceRegistry` backed by HTTP clients.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use vyos_api::{TlsMode, TransportConfig, VyosClient};
use vyos_core::{Device, DeviceRegistry};

/// Keyring service name under which API keys are stored.
pub const KEYRING_SERVICE: &str = "vyos-gw";

/// Legacy comma-separated device list, `name:scheme://host:port:apikey`.
pub const HOSTS_ENV: &str = "VYOS_HOSTS";

/// Prefix of the environment layer; `VYOS_GW_CFG_DEFAULTS__TIMEOUT=60`
/// sets `defaults.timeout`. Kept apart from the CLI's own `VYOS_GW_*` flags.
pub const ENV_PREFIX: &str = "VYOS_GW_CFG_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for device '{device}'")]
    NoCredentials { device: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to build client for device '{device}': {source}")]
    Client {
        device: String,
        #[source]
        source: vyos_api::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Global defaults applied to every device.
    #[serde(default)]
    pub defaults: Defaults,

    /// Registered devices keyed by device id.
    #[serde(default)]
    pub devices: BTreeMap<String, DeviceProfile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    /// Per-call timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Accept self-signed certificates. VyOS ships with one.
    #[serde(default = "default_insecure")]
    pub insecure: bool,

    /// Upper bound for one `/devices` health probe, in seconds.
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            insecure: default_insecure(),
            probe_timeout: default_probe_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}
fn default_insecure() -> bool {
    true
}
fn default_probe_timeout() -> u64 {
    5
}

/// One device entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct DeviceProfile {
    /// Device base URL (e.g., "https://192.168.1.1:443").
    pub url: String,

    /// API key (plaintext; prefer keyring or env var).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Environment variable name containing the API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    /// Override insecure TLS setting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,

    /// Path to custom CA certificate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// Override timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl Config {
    /// Force flag-level overrides onto every device.
    pub fn apply_overrides(&mut self, insecure: bool, timeout: Option<u64>) {
        if let Some(secs) = timeout {
            self.defaults.timeout = secs;
        }
        for profile in self.devices.values_mut() {
            if insecure {
                profile.insecure = Some(true);
            }
            if timeout.is_some() {
                profile.timeout = timeout;
            }
        }
        if insecure {
            self.defaults.insecure = true;
        }
    }

    /// Add `VYOS_HOSTS` entries. Devices already configured keep their profile.
    pub fn merge_hosts(&mut self, hosts: impl IntoIterator<Item = HostEntry>) {
        for host in hosts {
            if self.devices.contains_key(&host.id) {
                debug!(device = %host.id, "VYOS_HOSTS entry shadowed by config file");
                continue;
            }
            self.devices.insert(
                host.id,
                DeviceProfile {
                    url: host.url,
                    api_key: Some(host.api_key),
                    insecure: Some(true),
                    ..DeviceProfile::default()
                },
            );
        }
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.defaults.probe_timeout)
    }
}

// ── VYOS_HOSTS ──────────────────────────────────────────────────────

/// One device parsed from `VYOS_HOSTS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEntry {
    pub id: String,
    pub url: String,
    pub api_key: String,
}

/// Parse a `VYOS_HOSTS` value. Malformed entries are skipped with a warning.
pub fn parse_hosts(raw: &str) -> Vec<HostEntry> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| {
            let parsed = parse_host(entry);
            if parsed.is_none() {
                warn!(
                    entry = %entry,
                    "skipping invalid VYOS_HOSTS entry (expected name:scheme://host:port:key)"
                );
            }
            parsed
        })
        .collect()
}

fn parse_host(entry: &str) -> Option<HostEntry> {
    // name : scheme : //host : port : key -- the key may itself contain ':'
    let parts: Vec<&str> = entry.splitn(5, ':').collect();
    let [id, scheme, host, port, key] = parts.as_slice() else {
        return None;
    };
    if id.is_empty() || key.is_empty() {
        return None;
    }
    let url = format!("{scheme}:{host}:{port}");
    Url::parse(&url).ok()?;
    Some(HostEntry {
        id: (*id).to_owned(),
        url,
        api_key: (*key).to_owned(),
    })
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("net", "valueiron", "vyos-gw").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("vyos-gw");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Defaults, then the TOML file, then `VYOS_GW_CFG_*` environment.
fn figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Load the full config from file + environment, then merge `VYOS_HOSTS`.
///
/// A missing file is not an error; the defaults and environment still apply.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.map_or_else(config_path, Path::to_path_buf);
    let mut config: Config = figment(&path).extract()?;
    if let Ok(raw) = std::env::var(HOSTS_ENV) {
        config.merge_hosts(parse_hosts(&raw));
    }
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path` (or the canonical path).
pub fn save_config(cfg: &Config, path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let path = path.map_or_else(config_path, Path::to_path_buf);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(path)
}

// ── Credentials ─────────────────────────────────────────────────────

fn keyring_entry(device: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{device}/api-key"))
}

/// Store a device API key in the system keyring.
pub fn store_api_key(device: &str, key: &str) -> Result<(), ConfigError> {
    keyring_entry(device)?.set_password(key)?;
    Ok(())
}

/// Resolve an API key: `api_key_env`, then keyring, then plaintext.
pub fn resolve_api_key(profile: &DeviceProfile, device: &str) -> Result<SecretString, ConfigError> {
    if let Some(ref env_name) = profile.api_key_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    if let Ok(entry) = keyring_entry(device) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    if let Some(ref key) = profile.api_key {
        return Ok(SecretString::from(key.clone()));
    }

    Err(ConfigError::NoCredentials {
        device: device.into(),
    })
}

// ── Registry construction ───────────────────────────────────────────

/// Transport settings for one device, falling back to the global defaults.
pub fn transport_config(profile: &DeviceProfile, defaults: &Defaults) -> TransportConfig {
    let tls = if profile.insecure == Some(true) {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else if profile.insecure.unwrap_or(defaults.insecure) {
        TlsMode::DangerAcceptInvalid
    } else {
        TlsMode::System
    };

    TransportConfig {
        tls,
        timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
    }
}

fn parse_url(device: &str, raw: &str) -> Result<Url, ConfigError> {
    raw.parse().map_err(|_| ConfigError::Validation {
        field: format!("devices.{device}.url"),
        reason: format!("invalid URL: {raw}"),
    })
}

/// Build one HTTP client per configured device.
pub fn build_registry(config: &Config) -> Result<DeviceRegistry<VyosClient>, ConfigError> {
    let mut devices = Vec::with_capacity(config.devices.len());
    for (id, profile) in &config.devices {
        let url = parse_url(id, &profile.url)?;
        let api_key = resolve_api_key(profile, id)?;
        let transport = transport_config(profile, &config.defaults);
        let client = VyosClient::new(url.clone(), api_key, &transport).map_err(|source| {
            ConfigError::Client {
                device: id.clone(),
                source,
            }
        })?;
        devices.push(Device::new(id.clone(), url, client));
    }
    Ok(DeviceRegistry::new(devices))
}

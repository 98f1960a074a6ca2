// ── Device registry ──
//
// Built once at startup, read-only afterwards. Handlers receive it by
// reference; nothing in the core reaches for a global.

use std::collections::BTreeMap;

use tracing::info;
use url::Url;
use vyos_api::ConfigStore;

use crate::error::CoreError;

/// One registered device and the store that talks to it.
#[derive(Debug)]
pub struct Device<S> {
    id: String,
    url: Url,
    store: S,
}

impl<S> Device<S> {
    pub fn new(id: impl Into<String>, url: Url, store: S) -> Self {
        Self {
            id: id.into(),
            url,
            store,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

/// Lookup table from device id to device, iterated in id order.
#[derive(Debug)]
pub struct DeviceRegistry<S> {
    devices: BTreeMap<String, Device<S>>,
}

impl<S: ConfigStore> DeviceRegistry<S> {
    /// Build the registry. A later device with a duplicate id replaces the
    /// earlier one.
    pub fn new(devices: impl IntoIterator<Item = Device<S>>) -> Self {
        let devices: BTreeMap<String, Device<S>> = devices
            .into_iter()
            .map(|device| {
                info!(device = %device.id, url = %device.url, "registered VyOS device");
                (device.id.clone(), device)
            })
            .collect();
        Self { devices }
    }

    pub fn get(&self, id: &str) -> Result<&Device<S>, CoreError> {
        self.devices
            .get(id)
            .ok_or_else(|| CoreError::DeviceNotRegistered { id: id.to_owned() })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Device<S>> {
        self.devices.values()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

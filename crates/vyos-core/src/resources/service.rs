// Service endpoints: liveness of the gateway itself and reachability of
// every registered device.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;
use vyos_api::ConfigStore;

use crate::error::CoreError;
use crate::model::{DeviceStatus, Health};
use crate::paths;
use crate::registry::{Device, DeviceRegistry};
use crate::session::DeviceSession;

/// Default bound on a single reachability probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

pub fn health() -> Health {
    Health::ok()
}

/// Probe every device in id order. Devices are probed one after another;
/// a cancelled request stops the walk.
pub async fn devices<S: ConfigStore>(
    registry: &DeviceRegistry<S>,
    cancel: &CancellationToken,
    probe_timeout: Duration,
) -> Result<Vec<DeviceStatus>, CoreError> {
    let mut statuses = Vec::with_capacity(registry.len());
    for device in registry.iter() {
        let healthy = probe(device, cancel, probe_timeout).await?;
        statuses.push(DeviceStatus {
            id: device.id().to_owned(),
            url: device.url().to_string(),
            healthy,
        });
    }
    Ok(statuses)
}

/// Healthy iff `system host-name` answers with `success: true` in time.
async fn probe<S: ConfigStore>(
    device: &Device<S>,
    cancel: &CancellationToken,
    probe_timeout: Duration,
) -> Result<bool, CoreError> {
    let session = DeviceSession::new(device.store(), cancel.clone());
    match tokio::time::timeout(probe_timeout, session.show_config(&paths::probe())).await {
        Ok(Ok(reply)) => Ok(reply.success),
        Ok(Err(vyos_api::Error::Cancelled)) => Err(CoreError::Cancelled),
        Ok(Err(err)) => {
            debug!(device = device.id(), error = %err, "probe failed");
            Ok(false)
        }
        Err(_) => {
            debug!(device = device.id(), ?probe_timeout, "probe timed out");
            Ok(false)
        }
    }
}

// ── Device session ──
//
// All remote calls made on behalf of one inbound request. The session owns
// the request's cancellation token; once it fires, the in-flight call is
// dropped and every later call fails fast with `Error::Cancelled`.

use std::future::Future;

use tokio_util::sync::CancellationToken;
use vyos_api::{ConfigPath, ConfigStore, StoreReply};

use crate::sequence::StepOp;

pub struct DeviceSession<'a, S> {
    store: &'a S,
    cancel: CancellationToken,
}

impl<'a, S: ConfigStore> DeviceSession<'a, S> {
    pub fn new(store: &'a S, cancel: CancellationToken) -> Self {
        Self { store, cancel }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub async fn show_config(&self, path: &ConfigPath) -> Result<StoreReply, vyos_api::Error> {
        self.guard(self.store.show_config(path)).await
    }

    pub async fn apply(&self, op: StepOp, path: &ConfigPath) -> Result<StoreReply, vyos_api::Error> {
        match op {
            StepOp::Set => self.guard(self.store.set(path)).await,
            StepOp::Delete => self.guard(self.store.delete(path)).await,
        }
    }

    async fn guard(
        &self,
        call: impl Future<Output = Result<StoreReply, vyos_api::Error>>,
    ) -> Result<StoreReply, vyos_api::Error> {
        if self.cancel.is_cancelled() {
            return Err(vyos_api::Error::Cancelled);
        }
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(vyos_api::Error::Cancelled),
            result = call => result,
        }
    }
}

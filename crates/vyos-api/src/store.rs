// ── Config store capability ──
//
// The three primitive operations the gateway needs from a device. The HTTP
// client implements this; tests substitute scripted doubles.

use std::future::Future;

use serde::Serialize;

use crate::error::Error;
use crate::path::ConfigPath;
use crate::tree::TreeNode;

/// Discriminator carried in the `op` field of every API request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    ShowConfig,
    Set,
    Delete,
}

impl Operation {
    /// API endpoint that accepts this operation.
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::ShowConfig => "retrieve",
            Self::Set | Self::Delete => "configure",
        }
    }
}

/// A decoded response envelope: the transport succeeded, the device answered.
///
/// `success: false` is the device refusing the request (or reporting an
/// empty/missing path); what that means depends on the caller.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StoreReply {
    pub success: bool,
    pub data: Option<TreeNode>,
    pub error: Option<String>,
}

impl StoreReply {
    pub fn ok(data: Option<TreeNode>) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }

    /// The device's error text, or an empty string.
    pub fn error_text(&self) -> &str {
        self.error.as_deref().unwrap_or("")
    }
}

/// A transactionless key-path configuration store.
///
/// Implementations must be safe for concurrent use by independent requests.
pub trait ConfigStore: Send + Sync {
    /// Fetch the subtree at `path`.
    fn show_config(
        &self,
        path: &ConfigPath,
    ) -> impl Future<Output = Result<StoreReply, Error>> + Send;

    /// Create `path` (the last segments usually carry the value).
    fn set(&self, path: &ConfigPath) -> impl Future<Output = Result<StoreReply, Error>> + Send;

    /// Remove the node at `path` and everything below it.
    fn delete(&self, path: &ConfigPath)
    -> impl Future<Output = Result<StoreReply, Error>> + Send;
}

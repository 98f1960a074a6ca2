// ── Core error types ──
//
// Every failure a translator can report, already classified. The gateway
// maps each variant to exactly one HTTP status; consumers never see raw
// transport errors.

use serde_json::{Value, json};
use thiserror::Error;
use vyos_api::PathError;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Request errors ───────────────────────────────────────────────
    /// A required field is missing or a value cannot become a path segment.
    /// Always detected before any remote call.
    #[error("{message}")]
    Validation { message: String },

    #[error("device not found: {id}")]
    DeviceNotRegistered { id: String },

    // ── Remote errors ────────────────────────────────────────────────
    #[error("device communication error: {message}")]
    RemoteUnreachable { message: String },

    #[error("device rejected operation: {message}")]
    RemoteRejected { message: String },

    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: String },

    #[error("request cancelled")]
    Cancelled,
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            id: id.into(),
        }
    }

    /// HTTP status the front end answers with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation { .. } => 400,
            Self::DeviceNotRegistered { .. } | Self::NotFound { .. } => 404,
            Self::RemoteRejected { .. } => 422,
            // Non-standard, but widely understood as "client closed request".
            Self::Cancelled => 499,
            Self::RemoteUnreachable { .. } => 502,
        }
    }

    /// The `{"error": "..."}` document sent alongside the status.
    pub fn to_body(&self) -> Value {
        json!({ "error": self.to_string() })
    }
}

impl From<vyos_api::Error> for CoreError {
    fn from(err: vyos_api::Error) -> Self {
        match err {
            vyos_api::Error::Cancelled => Self::Cancelled,
            other => Self::RemoteUnreachable {
                message: other.to_string(),
            },
        }
    }
}

impl From<PathError> for CoreError {
    fn from(err: PathError) -> Self {
        Self::Validation {
            message: err.to_string(),
        }
    }
}

//! CLI error types with miette diagnostics.
//!
//! Maps configuration failures and non-2xx gateway responses into
//! user-facing errors with actionable help text and stable exit codes.

use miette::Diagnostic;
use serde_json::Value;
use thiserror::Error;

use vyos_api::StatusCode;
use vyos_config::ConfigError;
use vyos_core::GatewayResponse;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const REJECTED: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const CONFIG: i32 = 8;
    pub const CANCELLED: i32 = 130;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Gateway ──────────────────────────────────────────────────────

    #[error("{status} {reason}: {message}")]
    #[diagnostic(
        code(vyos_gw::gateway),
        help("Registered devices: vyos-gw devices\nMore detail: rerun with -vv")
    )]
    Gateway {
        status: u16,
        reason: String,
        message: String,
    },

    // ── Credentials ──────────────────────────────────────────────────

    #[error("No API key configured for device '{device}'")]
    #[diagnostic(
        code(vyos_gw::no_credentials),
        help(
            "Store one with: vyos-gw config set-key {device}\n\
             Or set api_key_env for the device in the config file."
        )
    )]
    NoCredentials { device: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(vyos_gw::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Configuration file already exists at {path}")]
    #[diagnostic(
        code(vyos_gw::config_exists),
        help("Pass --force to overwrite it.")
    )]
    ConfigExists { path: String },

    #[error("Device '{id}' not found in configuration")]
    #[diagnostic(
        code(vyos_gw::device_not_configured),
        help("List configured devices with: vyos-gw config show")
    )]
    DeviceNotConfigured { id: String },

    #[error(transparent)]
    #[diagnostic(
        code(vyos_gw::config),
        help("Check the config file (vyos-gw config path) and VYOS_GW_CFG_* variables.")
    )]
    Config(ConfigError),

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(vyos_gw::json))]
    Json(#[from] serde_json::Error),

    #[error("YAML rendering failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML rendering failed: {0}")]
    Toml(#[from] toml::ser::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Gateway { status, .. } => match *status {
                400 | 405 => exit_code::USAGE,
                404 => exit_code::NOT_FOUND,
                422 => exit_code::REJECTED,
                499 => exit_code::CANCELLED,
                502 => exit_code::CONNECTION,
                _ => exit_code::GENERAL,
            },
            Self::Validation { .. } => exit_code::USAGE,
            Self::DeviceNotConfigured { .. } => exit_code::NOT_FOUND,
            Self::NoCredentials { .. } | Self::ConfigExists { .. } | Self::Config(_) => {
                exit_code::CONFIG
            }
            _ => exit_code::GENERAL,
        }
    }

    /// Turn a non-2xx gateway answer into an error; 2xx passes through.
    pub fn check(response: GatewayResponse) -> Result<GatewayResponse, Self> {
        if response.is_success() {
            return Ok(response);
        }
        let message = response
            .body
            .as_ref()
            .and_then(|body| body.get("error"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();
        Err(Self::Gateway {
            status: response.status,
            reason: reason_phrase(response.status).into(),
            message,
        })
    }
}

fn reason_phrase(status: u16) -> &'static str {
    if status == 499 {
        return "Client Closed Request";
    }
    StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("Unknown Status")
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { device } => Self::NoCredentials { device },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::Io(e) => Self::Io(e),
            other => Self::Config(other),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn response(status: u16, message: &str) -> GatewayResponse {
        GatewayResponse {
            status,
            body: Some(json!({ "error": message })),
        }
    }

    #[test]
    fn success_passes_through() {
        let ok = GatewayResponse {
            status: 204,
            body: None,
        };
        assert!(CliError::check(ok).is_ok());
    }

    #[test]
    fn status_maps_to_exit_code() {
        let cases = [
            (400, exit_code::USAGE),
            (404, exit_code::NOT_FOUND),
            (405, exit_code::USAGE),
            (422, exit_code::REJECTED),
            (499, exit_code::CANCELLED),
            (502, exit_code::CONNECTION),
            (500, exit_code::GENERAL),
        ];
        for (status, code) in cases {
            let err = CliError::check(response(status, "boom")).unwrap_err();
            assert_eq!(err.exit_code(), code, "status {status}");
        }
    }

    #[test]
    fn message_carries_reason_and_error_text() {
        let err = CliError::check(response(404, "device not found: r9")).unwrap_err();
        assert_eq!(err.to_string(), "404 Not Found: device not found: r9");

        let err = CliError::check(response(499, "request cancelled")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "499 Client Closed Request: request cancelled"
        );
    }

    #[test]
    fn missing_key_is_a_config_problem() {
        let err = CliError::from(ConfigError::NoCredentials {
            device: "r1".into(),
        });
        assert_eq!(err.exit_code(), exit_code::CONFIG);
    }
}

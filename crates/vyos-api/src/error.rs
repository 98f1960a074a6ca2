use thiserror::Error;

/// Top-level error type for the `vyos-api` crate.
///
/// Every variant is a *transport-class* failure: the device could not be
/// asked, or did not answer with a usable envelope. A well-formed envelope
/// with `success: false` is not an error at this layer -- it is returned as
/// a [`StoreReply`](crate::StoreReply) and interpreted by `vyos-core`.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// The device answered with a non-2xx status.
    ///
    /// VyOS answers HTTP 400 when the requested path has never existed in
    /// the configuration tree, so callers may inspect `status`.
    #[error("VyOS API: unexpected status {status}{}", message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Status { status: u16, message: Option<String> },

    /// The caller gave up on the request before it completed.
    #[error("Request cancelled")]
    Cancelled,

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the device reported that the addressed section does
    /// not exist at all (as opposed to existing but being empty).
    pub fn is_missing_path(&self) -> bool {
        matches!(self, Self::Status { status: 400, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_display_includes_message() {
        let err = Error::Status {
            status: 400,
            message: Some("path is not valid".into()),
        };
        assert_eq!(
            err.to_string(),
            "VyOS API: unexpected status 400: path is not valid"
        );
    }

    #[test]
    fn status_display_without_message() {
        let err = Error::Status {
            status: 502,
            message: None,
        };
        assert_eq!(err.to_string(), "VyOS API: unexpected status 502");
        assert!(!err.is_missing_path());
    }

    #[test]
    fn missing_path_is_status_400_only() {
        assert!(
            Error::Status {
                status: 400,
                message: None
            }
            .is_missing_path()
        );
        assert!(!Error::Timeout { timeout_secs: 5 }.is_missing_path());
        assert!(!Error::Cancelled.is_missing_path());
    }
}

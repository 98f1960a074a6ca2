// VyOS HTTP API client
//
// Wraps `reqwest::Client` with VyOS request encoding (form fields `data`
// and `key`) and envelope decoding. Logical failures (`success: false`)
// are returned to the caller untouched; only transport-class problems
// become `Error`s.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::path::ConfigPath;
use crate::store::{ConfigStore, Operation, StoreReply};
use crate::transport::TransportConfig;
use crate::tree::TreeNode;

/// JSON document carried in the `data` form field.
#[derive(Serialize)]
struct RequestBody<'a> {
    op: Operation,
    path: &'a ConfigPath,
}

/// The `{success, data, error}` envelope every endpoint answers with.
#[derive(Deserialize)]
struct Envelope {
    success: bool,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}

/// `error` is usually a string but older images send arbitrary JSON.
fn error_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn preview(body: &str) -> &str {
    let end = body
        .char_indices()
        .nth(200)
        .map_or(body.len(), |(idx, _)| idx);
    &body[..end]
}

/// HTTP client for one VyOS device.
///
/// Cheap to share by reference; the inner `reqwest::Client` pools
/// connections and is safe for concurrent requests.
#[derive(Debug, Clone)]
pub struct VyosClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: SecretString,
    timeout_secs: u64,
}

impl VyosClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` is the device root, e.g. `https://192.168.1.1:443`.
    pub fn new(
        base_url: Url,
        api_key: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            api_key,
            timeout_secs: transport.timeout_secs(),
        })
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, api_key: SecretString) -> Self {
        Self {
            http,
            base_url,
            api_key,
            timeout_secs: 0,
        }
    }

    /// The device base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint_url(&self, endpoint: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/{endpoint}"))?)
    }

    fn map_transport(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            Error::Transport(err)
        }
    }

    /// Send one operation and decode the envelope.
    async fn call(&self, op: Operation, path: &ConfigPath) -> Result<StoreReply, Error> {
        let url = self.endpoint_url(op.endpoint())?;
        debug!(?op, %path, "POST {}", url);

        let data = serde_json::to_string(&RequestBody { op, path }).map_err(|e| {
            Error::Deserialization {
                message: format!("failed to encode request: {e}"),
                body: String::new(),
            }
        })?;

        let resp = self
            .http
            .post(url)
            .form(&[("data", data.as_str()), ("key", self.api_key.expose_secret())])
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| self.map_transport(e))?;
        trace!(%status, body = preview(&body), "VyOS response");

        if !status.is_success() {
            let message = serde_json::from_str::<Envelope>(&body)
                .ok()
                .and_then(|env| env.error.and_then(error_text))
                .or_else(|| {
                    let trimmed = preview(&body).trim();
                    (!trimmed.is_empty()).then(|| trimmed.to_owned())
                });
            return Err(Error::Status {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: Envelope =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: format!("{e} (body preview: {:?})", preview(&body)),
                body: body.clone(),
            })?;

        Ok(StoreReply {
            success: envelope.success,
            data: envelope.data.map(TreeNode::from),
            error: envelope.error.and_then(error_text),
        })
    }
}

impl ConfigStore for VyosClient {
    async fn show_config(&self, path: &ConfigPath) -> Result<StoreReply, Error> {
        self.call(Operation::ShowConfig, path).await
    }

    async fn set(&self, path: &ConfigPath) -> Result<StoreReply, Error> {
        self.call(Operation::Set, path).await
    }

    async fn delete(&self, path: &ConfigPath) -> Result<StoreReply, Error> {
        self.call(Operation::Delete, path).await
    }
}

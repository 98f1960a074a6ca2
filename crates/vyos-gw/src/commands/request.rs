//! `request` handler: one call through the gateway, printed as JSON.

use std::path::Path;

use tokio_util::sync::CancellationToken;
use tracing::debug;
use vyos_api::VyosClient;
use vyos_core::{Gateway, GatewayRequest};

use crate::cli::{GlobalOpts, RequestArgs};
use crate::error::CliError;
use crate::output;

/// Read the raw body for `--data-file`. Parsing is left to the gateway so
/// malformed files get the same 400 as malformed inline data.
fn read_body_file(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|e| CliError::Validation {
        field: "data-file".into(),
        reason: format!("cannot read {}: {e}", path.display()),
    })
}

pub async fn handle(
    gateway: &Gateway<VyosClient>,
    args: RequestArgs,
    cancel: CancellationToken,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let body = match (args.data, args.data_file) {
        (Some(data), _) => Some(data),
        (None, Some(path)) => Some(read_body_file(&path)?),
        (None, None) => None,
    };

    let mut req = GatewayRequest::new(args.method, args.path);
    if let Some(body) = body {
        req = req.with_body(body);
    }

    let response = CliError::check(gateway.handle(&req, cancel).await)?;
    debug!(status = response.status, "gateway answered");

    let Some(body) = response.body else {
        return Ok(());
    };
    let out = output::render_single(&global.output, &body, output::render_json_pretty)?;
    output::print_output(&out, global.quiet);
    Ok(())
}

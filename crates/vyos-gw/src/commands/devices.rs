//! `devices` handler: registered devices and their reachability.

use owo_colors::OwoColorize;
use tabled::Tabled;
use tokio_util::sync::CancellationToken;
use vyos_api::{Method, VyosClient};
use vyos_core::{DeviceStatus, Gateway, GatewayRequest};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "URL")]
    url: String,
    #[tabled(rename = "Healthy")]
    healthy: String,
}

fn row(status: &DeviceStatus, color: bool) -> DeviceRow {
    let healthy = match (status.healthy, color) {
        (true, true) => "yes".green().to_string(),
        (false, true) => "no".red().to_string(),
        (true, false) => "yes".into(),
        (false, false) => "no".into(),
    };
    DeviceRow {
        id: status.id.clone(),
        url: status.url.clone(),
        healthy,
    }
}

pub async fn handle(
    gateway: &Gateway<VyosClient>,
    cancel: CancellationToken,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let req = GatewayRequest::new(Method::GET, "/devices");
    let response = CliError::check(gateway.handle(&req, cancel).await)?;
    let statuses: Vec<DeviceStatus> =
        serde_json::from_value(response.body.unwrap_or_default())?;

    let color = output::should_color(&global.color);
    let out = output::render_list(&global.output, &statuses, |s| row(s, color))?;
    output::print_output(&out, global.quiet);
    Ok(())
}

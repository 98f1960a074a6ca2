//! Command dispatch: bridges CLI args -> gateway requests -> output formatting.

pub mod config_cmd;
pub mod devices;
pub mod request;

use tokio_util::sync::CancellationToken;
use vyos_api::VyosClient;
use vyos_core::Gateway;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a gateway-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    gateway: &Gateway<VyosClient>,
    cancel: CancellationToken,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Request(args) => request::handle(gateway, args, cancel, global).await,
        Command::Devices => devices::handle(gateway, cancel, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}

mod cli;
mod commands;
mod error;
mod output;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use vyos_api::VyosClient;
use vyos_core::Gateway;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose, cli.global.log_json);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8, json: bool) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands never touch a device
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "vyos-gw", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let gateway = build_gateway(&cli.global)?;
            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &gateway, cancel_on_ctrl_c(), &cli.global).await
        }
    }
}

/// Load configuration, apply flag overrides, and build the device registry.
fn build_gateway(global: &cli::GlobalOpts) -> Result<Gateway<VyosClient>, CliError> {
    let mut cfg = vyos_config::load_config(global.config.as_deref())?;
    cfg.apply_overrides(global.insecure, global.timeout);

    let registry = vyos_config::build_registry(&cfg)?;
    if registry.is_empty() {
        warn!("no devices configured; only /health will answer");
    }

    let probe_timeout = global
        .probe_timeout
        .map_or_else(|| cfg.probe_timeout(), Duration::from_secs);
    Ok(Gateway::new(Arc::new(registry)).with_probe_timeout(probe_timeout))
}

/// A token that fires on Ctrl-C, aborting the in-flight request.
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });
    token
}

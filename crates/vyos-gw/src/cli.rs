//! Clap derive structures for the `vyos-gw` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use vyos_api::Method;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// vyos-gw -- REST-style access to VyOS configuration trees
#[derive(Debug, Parser)]
#[command(
    name = "vyos-gw",
    version,
    about = "Drive VyOS routers through a resource-oriented gateway",
    long_about = "Translates resource requests (networks, VRFs, VLANs, firewall,\n\
        NAT, static routes, DHCP) into VyOS configuration-tree operations\n\
        against the devices registered in the config file or VYOS_HOSTS.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "VYOS_GW_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "VYOS_GW_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept self-signed TLS certificates on every device
    #[arg(long, short = 'k', env = "VYOS_GW_INSECURE", global = true)]
    pub insecure: bool,

    /// Per-call timeout in seconds (overrides config)
    #[arg(long, env = "VYOS_GW_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Reachability probe timeout in seconds (overrides config)
    #[arg(long, global = true)]
    pub probe_timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table where the data allows it, pretty JSON otherwise
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Send one request through the gateway, e.g. `GET /devices/r1/vrfs`
    #[command(alias = "req", alias = "r")]
    Request(RequestArgs),

    /// List registered devices and probe their reachability
    #[command(alias = "dev", alias = "d")]
    Devices,

    /// Manage gateway configuration and devices
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Request ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RequestArgs {
    /// HTTP method (GET, POST, PUT, DELETE)
    #[arg(value_parser = parse_method)]
    pub method: Method,

    /// Resource path, optionally with a query (e.g. /devices/r1/networks?type=bonding)
    pub path: String,

    /// JSON request body
    #[arg(long, short = 'd', conflicts_with = "data_file")]
    pub data: Option<String>,

    /// Read the JSON request body from a file
    #[arg(long, short = 'f')]
    pub data_file: Option<PathBuf>,
}

fn parse_method(raw: &str) -> Result<Method, String> {
    Method::from_bytes(raw.to_ascii_uppercase().as_bytes())
        .map_err(|_| format!("invalid HTTP method: {raw}"))
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Display the resolved configuration (file, environment and VYOS_HOSTS)
    Show,

    /// Write a config file with default settings
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Register a device in the config file
    AddDevice {
        /// Device id used in request paths
        id: String,

        /// Device base URL (e.g. https://192.168.1.1:443)
        #[arg(long)]
        url: String,

        /// Environment variable holding the API key
        #[arg(long)]
        api_key_env: Option<String>,

        /// Custom CA certificate (PEM)
        #[arg(long)]
        ca_cert: Option<PathBuf>,

        /// Verify the device certificate against the system store
        #[arg(long)]
        verify_tls: bool,

        /// Per-call timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Remove a device from the config file
    RemoveDevice {
        /// Device id
        id: String,
    },

    /// Store a device API key in the system keyring
    SetKey {
        /// Device id
        id: String,

        /// API key (read from stdin when omitted)
        key: Option<String>,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

//! Config subcommand handlers.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use vyos_config::{self as config, Config, DeviceProfile};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

const REDACTED: &str = "********";

// ── Helpers ─────────────────────────────────────────────────────────

fn target_path(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(config::config_path)
}

/// The file as written, without environment or `VYOS_HOSTS` layered in,
/// so edits never persist values that came from elsewhere.
fn load_file(path: &Path) -> Result<Config, CliError> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let raw = std::fs::read_to_string(path)?;
    toml::from_str(&raw).map_err(|e| CliError::Validation {
        field: "config".into(),
        reason: format!("{}: {e}", path.display()),
    })
}

fn redacted(mut cfg: Config) -> Config {
    for profile in cfg.devices.values_mut() {
        if profile.api_key.is_some() {
            profile.api_key = Some(REDACTED.into());
        }
    }
    cfg
}

fn read_key_from_stdin() -> Result<String, CliError> {
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let key = line.trim().to_owned();
    if key.is_empty() {
        return Err(CliError::Validation {
            field: "api_key".into(),
            reason: "API key cannot be empty".into(),
        });
    }
    Ok(key)
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = target_path(global);
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&path.display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = redacted(config::load_config(Some(&path))?);
            let out = output::render_single(&global.output, &cfg, |c| {
                Ok(toml::to_string_pretty(c)?)
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Init { force } => {
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }
            let written = config::save_config(&Config::default(), Some(&path))?;
            eprintln!("✓ Configuration written to {}", written.display());
            eprintln!("  Add a device: vyos-gw config add-device <id> --url https://<host>:443");
            Ok(())
        }

        ConfigCommand::AddDevice {
            id,
            url,
            api_key_env,
            ca_cert,
            verify_tls,
            timeout,
        } => {
            url.parse::<url::Url>().map_err(|e| CliError::Validation {
                field: "url".into(),
                reason: format!("invalid URL {url}: {e}"),
            })?;
            let mut cfg = load_file(&path)?;
            cfg.devices.insert(
                id.clone(),
                DeviceProfile {
                    url,
                    api_key: None,
                    api_key_env,
                    insecure: verify_tls.then_some(false),
                    ca_cert,
                    timeout,
                },
            );
            config::save_config(&cfg, Some(&path))?;
            eprintln!("✓ Device '{id}' added to {}", path.display());
            eprintln!("  Store its API key: vyos-gw config set-key {id}");
            Ok(())
        }

        ConfigCommand::RemoveDevice { id } => {
            let mut cfg = load_file(&path)?;
            if cfg.devices.remove(&id).is_none() {
                return Err(CliError::DeviceNotConfigured { id });
            }
            config::save_config(&cfg, Some(&path))?;
            eprintln!("✓ Device '{id}' removed");
            Ok(())
        }

        ConfigCommand::SetKey { id, key } => {
            let key = match key {
                Some(key) => key,
                None => read_key_from_stdin()?,
            };
            config::store_api_key(&id, &key)?;
            eprintln!("✓ API key for '{id}' stored in system keyring");
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn plaintext_keys_are_hidden() {
        let mut cfg = Config::default();
        cfg.devices.insert(
            "r1".into(),
            DeviceProfile {
                url: "https://10.0.0.1:443".into(),
                api_key: Some("secret".into()),
                ..DeviceProfile::default()
            },
        );
        let shown = redacted(cfg);
        assert_eq!(shown.devices["r1"].api_key.as_deref(), Some(REDACTED));
    }

    #[test]
    fn missing_file_loads_as_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_file(&dir.path().join("none.toml")).unwrap();
        assert_eq!(cfg, Config::default());
    }
}

//! Configuration loading from `~/.credflow/config.toml` with defaults.
//!
//! After the file is read, the agent environment variables used by existing
//! deployments (`LEDGER_URL`, `SERVER_AGENT_IP`, ...) override it.

use crate::error::{KernelError, KernelResult};
use credflow_types::config::{AgentEndpoint, ControllerConfig};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Load controller configuration from a TOML file, with defaults.
pub fn load_config(path: Option<&Path>) -> ControllerConfig {
    let config_path = path
        .map(|p| p.to_path_buf())
        .unwrap_or_else(default_config_path);

    if config_path.exists() {
        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match toml::from_str::<ControllerConfig>(&contents) {
                Ok(config) => {
                    info!(path = %config_path.display(), "Loaded configuration");
                    return config;
                }
                Err(e) => {
                    warn!(
                        error = %e,
                        path = %config_path.display(),
                        "Failed to parse config, using defaults"
                    );
                }
            },
            Err(e) => {
                warn!(
                    error = %e,
                    path = %config_path.display(),
                    "Failed to read config file, using defaults"
                );
            }
        }
    } else {
        info!(
            path = %config_path.display(),
            "Config file not found, using defaults"
        );
    }

    ControllerConfig::default()
}

/// Override config values from environment variables.
///
/// An agent URL is only replaced when both its IP and admin port are set.
pub fn apply_env_overrides<F>(config: &mut ControllerConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup("LEDGER_URL").filter(|v| !v.is_empty()) {
        config.ledger_url = url;
    }
    override_agent(&mut config.issuer, "SERVER_AGENT_IP", "SERVER_AGENT_ADMIN_PORT", &lookup);
    override_agent(&mut config.holder, "CLIENT_AGENT_IP", "CLIENT_AGENT_ADMIN_PORT", &lookup);
}

fn override_agent<F>(agent: &mut AgentEndpoint, ip_var: &str, port_var: &str, lookup: &F)
where
    F: Fn(&str) -> Option<String>,
{
    match (lookup(ip_var), lookup(port_var)) {
        (Some(ip), Some(port)) => {
            agent.admin_url = format!("http://{ip}:{port}");
        }
        (Some(_), None) | (None, Some(_)) => {
            warn!(
                agent = %agent.ident,
                "Only one of {ip_var} and {port_var} is set, keeping {}",
                agent.admin_url
            );
        }
        (None, None) => {}
    }
}

/// Reject configurations that cannot drive a session.
pub fn validate_config(config: &ControllerConfig) -> KernelResult<()> {
    if config.ledger_url.trim().is_empty() {
        return Err(KernelError::Config("ledger_url is empty".to_string()));
    }
    for agent in [&config.issuer, &config.holder] {
        if agent.admin_url.trim().is_empty() {
            return Err(KernelError::Config(format!(
                "admin_url of agent '{}' is empty",
                agent.ident
            )));
        }
        if agent.ident.trim().is_empty() {
            return Err(KernelError::Config("agent ident is empty".to_string()));
        }
    }

    let polling = &config.polling;
    if polling.discovery_attempts == 0 {
        return Err(KernelError::Config(
            "polling.discovery_attempts must be at least 1".to_string(),
        ));
    }
    if polling.time_unit_ms == 0 {
        return Err(KernelError::Config(
            "polling.time_unit_ms must be positive".to_string(),
        ));
    }
    for (name, units) in [
        ("discovery_interval_units", polling.discovery_interval_units),
        ("connection_interval_units", polling.connection_interval_units),
        ("exchange_interval_units", polling.exchange_interval_units),
    ] {
        if units.is_nan() || units <= 0.0 {
            return Err(KernelError::Config(format!(
                "polling.{name} must be positive, got {units}"
            )));
        }
    }
    Ok(())
}

/// Get the default config file path.
pub fn default_config_path() -> PathBuf {
    credflow_home().join("config.toml")
}

/// Get the default credflow home directory.
pub fn credflow_home() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".credflow")
}

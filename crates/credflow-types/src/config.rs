//! Controller configuration types.
//!
//! Loaded from TOML by `credflow-kernel::config`; every field has a default so
//! a partial file (or none at all) still yields a usable config.

use serde::{Deserialize, Serialize};

/// Ledger used when nothing else is configured.
pub const DEFAULT_LEDGER_URL: &str = "http://dev.greenlight.bcovrin.vonx.io";

/// Top-level controller configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Log level when `RUST_LOG` is not set.
    pub log_level: String,
    /// Base URL of the ledger registration service.
    pub ledger_url: String,
    /// The issuing agent.
    pub issuer: AgentEndpoint,
    /// The holding agent.
    pub holder: AgentEndpoint,
    /// Schema registered by `credflow run`.
    pub schema: SchemaConfig,
    pub polling: PollingConfig,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            ledger_url: DEFAULT_LEDGER_URL.to_string(),
            issuer: AgentEndpoint {
                ident: "ServerController".to_string(),
                admin_url: "http://localhost:8021".to_string(),
            },
            holder: AgentEndpoint {
                ident: "ClientController".to_string(),
                admin_url: "http://localhost:8031".to_string(),
            },
            schema: SchemaConfig::default(),
            polling: PollingConfig::default(),
        }
    }
}

/// One agent's admin endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentEndpoint {
    /// Controller identity; used as the DID alias and in default tags.
    pub ident: String,
    /// Base URL of the agent's admin API.
    pub admin_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    pub name: String,
    pub attributes: Vec<String>,
    pub version: String,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            name: "NDNSchema".to_string(),
            attributes: vec!["Attr1".to_string(), "Attr2".to_string()],
            version: "1.0".to_string(),
        }
    }
}

/// Polling cadence. Intervals are expressed in time units so the whole
/// cadence can be scaled by changing `time_unit_ms`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Length of one time unit in milliseconds.
    pub time_unit_ms: u64,
    /// Listing polls allowed while waiting for an endorsed schema or cred def.
    pub discovery_attempts: u32,
    pub discovery_interval_units: f64,
    /// Interval while waiting for a connection to become visible.
    pub connection_interval_units: f64,
    /// Interval while waiting for credential exchange records.
    pub exchange_interval_units: f64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            time_unit_ms: 1_000,
            discovery_attempts: 3,
            discovery_interval_units: 1.0,
            connection_interval_units: 1.0,
            exchange_interval_units: 0.1,
        }
    }
}

impl PollingConfig {
    /// Convert a number of time units into milliseconds.
    pub fn units_to_ms(&self, units: f64) -> u64 {
        (self.time_unit_ms as f64 * units).round() as u64
    }
}

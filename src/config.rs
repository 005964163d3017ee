//! Worker configuration.
//!
//! Values are read from `WORKER_*` environment variables, falling back to
//! the defaults below. A port of `0` asks the OS for any free port; the
//! worker reports the port it actually bound.

use std::env;

use serde::{Deserialize, Serialize};

use crate::error::{WorkerError, WorkerResult};

pub const ENV_HOSTNAME: &str = "WORKER_HOSTNAME";
pub const ENV_BIND_HOST: &str = "WORKER_BIND_HOST";
pub const ENV_RPC_PORT: &str = "WORKER_RPC_PORT";
pub const ENV_DATA_PORT: &str = "WORKER_DATA_PORT";
pub const ENV_WEB_PORT: &str = "WORKER_WEB_PORT";
pub const ENV_DOMAIN_SOCKET: &str = "WORKER_DATA_DOMAIN_SOCKET";
pub const ENV_RACK: &str = "WORKER_RACK";
pub const ENV_STORAGE_TIERS: &str = "WORKER_TIERED_STORE_ALIASES";

/// Configuration consumed by worker factories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Hostname advertised to the master.
    #[serde(default = "default_hostname")]
    pub hostname: String,
    /// Host all listeners bind to.
    #[serde(default = "default_bind_host")]
    pub bind_host: String,
    #[serde(default = "default_rpc_port")]
    pub rpc_port: u16,
    #[serde(default = "default_data_port")]
    pub data_port: u16,
    #[serde(default = "default_web_port")]
    pub web_port: u16,
    /// Optional domain socket path for short-circuit data reads.
    #[serde(default)]
    pub domain_socket_path: Option<String>,
    /// Rack locality, if known.
    #[serde(default)]
    pub rack: Option<String>,
    /// Storage tier aliases, fastest first.
    #[serde(default = "default_storage_tiers")]
    pub storage_tiers: Vec<String>,
}

fn default_hostname() -> String { "localhost".to_string() }
fn default_bind_host() -> String { "0.0.0.0".to_string() }
fn default_rpc_port() -> u16 { 29998 }
fn default_data_port() -> u16 { 29999 }
fn default_web_port() -> u16 { 30000 }
fn default_storage_tiers() -> Vec<String> { vec!["MEM".to_string()] }

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            hostname: default_hostname(),
            bind_host: default_bind_host(),
            rpc_port: default_rpc_port(),
            data_port: default_data_port(),
            web_port: default_web_port(),
            domain_socket_path: None,
            rack: None,
            storage_tiers: default_storage_tiers(),
        }
    }
}

impl WorkerConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> WorkerResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> WorkerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut conf = Self::default();

        if let Some(hostname) = non_empty(lookup(ENV_HOSTNAME)) {
            conf.hostname = hostname;
        }
        if let Some(bind_host) = non_empty(lookup(ENV_BIND_HOST)) {
            conf.bind_host = bind_host;
        }
        if let Some(port) = non_empty(lookup(ENV_RPC_PORT)) {
            conf.rpc_port = parse_port(ENV_RPC_PORT, &port)?;
        }
        if let Some(port) = non_empty(lookup(ENV_DATA_PORT)) {
            conf.data_port = parse_port(ENV_DATA_PORT, &port)?;
        }
        if let Some(port) = non_empty(lookup(ENV_WEB_PORT)) {
            conf.web_port = parse_port(ENV_WEB_PORT, &port)?;
        }
        conf.domain_socket_path = non_empty(lookup(ENV_DOMAIN_SOCKET));
        conf.rack = non_empty(lookup(ENV_RACK));
        if let Some(tiers) = non_empty(lookup(ENV_STORAGE_TIERS)) {
            conf.storage_tiers = tiers
                .split(',')
                .map(|t| t.trim().to_uppercase())
                .filter(|t| !t.is_empty())
                .collect();
            if conf.storage_tiers.is_empty() {
                return Err(WorkerError::Config(format!(
                    "{ENV_STORAGE_TIERS} must name at least one tier"
                )));
            }
        }

        Ok(conf)
    }

    /// Loopback configuration with every port left to the OS.
    pub fn ephemeral() -> Self {
        Self {
            hostname: "localhost".to_string(),
            bind_host: "127.0.0.1".to_string(),
            rpc_port: 0,
            data_port: 0,
            web_port: 0,
            ..Self::default()
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_port(key: &str, value: &str) -> WorkerResult<u16> {
    value
        .parse::<u16>()
        .map_err(|e| WorkerError::Config(format!("{key}={value:?} is not a valid port: {e}")))
}

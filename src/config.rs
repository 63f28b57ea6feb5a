//! Configuration: a TOML file merged with CLI flags.
//!
//! CLI flags win over the config file; the config file wins over defaults.

use crate::cli::ConnectArgs;
use crate::client::DEFAULT_SESSION_BUDGET;
use crate::proto;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_ADDRESS: &str = "localhost:50051";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub target: TargetSection,
    #[serde(default)]
    pub session: SessionSection,
}

#[derive(Debug, Deserialize, Default)]
pub struct TargetSection {
    pub address: Option<String>,
    pub service: Option<String>,
    #[serde(default)]
    pub tls: bool,
    #[serde(default, with = "humantime_serde::option")]
    pub timeout: Option<Duration>,
    #[serde(default, with = "humantime_serde::option")]
    pub connect_timeout: Option<Duration>,
}

#[derive(Debug, Deserialize, Default)]
pub struct SessionSection {
    #[serde(default, with = "humantime_serde::option")]
    pub budget: Option<Duration>,
}

/// Connection settings handed to the transport.
#[derive(Debug, Clone)]
pub struct TargetConfig {
    pub address: String,
    pub service: String,
    pub tls: bool,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

/// Final merged settings.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub target: TargetConfig,
    pub session_budget: Duration,
}

pub fn load_config(path: &Path) -> Result<TomlConfig, String> {
    let content =
        fs::read_to_string(path).map_err(|e| format!("Failed to read config file: {}", e))?;

    toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {}", e))
}

pub fn merge_config(cli: &ConnectArgs, toml: Option<TomlConfig>) -> ClientConfig {
    let toml = toml.unwrap_or_default();

    let address = if cli.address != DEFAULT_ADDRESS {
        cli.address.clone()
    } else {
        toml.target
            .address
            .unwrap_or_else(|| DEFAULT_ADDRESS.to_string())
    };

    let service = if cli.service != proto::SERVICE_NAME {
        cli.service.clone()
    } else {
        toml.target
            .service
            .unwrap_or_else(|| proto::SERVICE_NAME.to_string())
    };

    let tls = cli.tls || toml.target.tls;

    let timeout = if cli.timeout != DEFAULT_TIMEOUT {
        cli.timeout
    } else {
        toml.target.timeout.unwrap_or(DEFAULT_TIMEOUT)
    };

    let connect_timeout = if cli.connect_timeout != DEFAULT_CONNECT_TIMEOUT {
        cli.connect_timeout
    } else {
        toml.target
            .connect_timeout
            .unwrap_or(DEFAULT_CONNECT_TIMEOUT)
    };

    let session_budget = match cli.budget {
        Some(budget) => budget,
        None => toml.session.budget.unwrap_or(DEFAULT_SESSION_BUDGET),
    };

    ClientConfig {
        target: TargetConfig {
            address,
            service,
            tls,
            timeout,
            connect_timeout,
        },
        session_budget,
    }
}

/// Starter config written by `sayhi init`.
pub fn config_template(address: &str) -> String {
    format!(
        r#"# sayhi configuration

[target]
address = "{address}"
service = "sayhi.SayHiService"
# tls = false
timeout = "30s"
connect_timeout = "2s"

[session]
# Wall-clock budget for a bidirectional session.
budget = "2s"
"#
    )
}

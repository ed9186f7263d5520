//! Configuration loading

use anyhow::{Context, Result};
use dhm_discovery::ScannerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub scan: ScanConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Reported host name (defaults to the machine name)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    /// Seconds between inventory syncs
    #[serde(default = "default_sync_interval")]
    pub sync_interval_secs: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            hostname: None,
            sync_interval_secs: default_sync_interval(),
        }
    }
}

fn default_sync_interval() -> u64 {
    300
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Collector sync endpoint
    #[serde(default = "default_server_url")]
    pub url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: default_server_url(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_server_url() -> String {
    "http://127.0.0.1:8000/api/devices/sync".to_string()
}

fn default_timeout() -> u64 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    #[serde(default = "default_true")]
    pub disk: bool,
    #[serde(default = "default_true")]
    pub monitor: bool,
    #[serde(default = "default_true")]
    pub printer: bool,
    #[serde(default = "default_true")]
    pub network_adapter: bool,
    #[serde(default = "default_true")]
    pub service_tag: bool,
    /// Replay a recorded inventory snapshot instead of querying the host
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<PathBuf>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            disk: true,
            monitor: true,
            printer: true,
            network_adapter: true,
            service_tag: true,
            snapshot: None,
        }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.agent.sync_interval_secs.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.timeout_secs)
    }

    /// Host name to report: config override, then the environment
    pub fn resolve_hostname(&self) -> String {
        resolve_hostname_with(self.agent.hostname.as_deref(), |key| std::env::var(key).ok())
    }

    /// Convert to ScannerConfig
    pub fn to_scanner_config(&self) -> ScannerConfig {
        ScannerConfig {
            hostname: self.resolve_hostname(),
            disk: self.scan.disk,
            monitor: self.scan.monitor,
            printer: self.scan.printer,
            network_adapter: self.scan.network_adapter,
            service_tag: self.scan.service_tag,
        }
    }
}

fn resolve_hostname_with(
    configured: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> String {
    let non_blank = |s: String| {
        let s = s.trim().to_string();
        (!s.is_empty()).then_some(s)
    };

    configured
        .map(ToString::to_string)
        .and_then(non_blank)
        .or_else(|| env("COMPUTERNAME").and_then(non_blank))
        .or_else(|| env("HOSTNAME").and_then(non_blank))
        .unwrap_or_else(|| "unknown-host".to_string())
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(Config::default())
    }
}

/// Save default configuration to file
pub fn save_default_config(path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(&Config::default())?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

//! Agent configuration
//!
//! Handles:
//! - Feature enablement and the OS user each feature probes as
//! - Execution switches (parallel vs sequential, statistics refresh)
//! - Probe scripts location and time limit
//! - Defaulting of invalid or missing values

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Hostname value meaning "use the probed hostname"
pub const DEFAULT_HOSTNAME: &str = "default";
pub const DEFAULT_PERIOD_HOURS: u32 = 24;
pub const DEFAULT_ORATAB: &str = "/etc/oratab";
const CONFIG_ENV_VAR: &str = "INVENTORY_AGENT_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub hostname: String,
    pub environment: String,
    pub location: String,
    pub tags: Vec<String>,
    pub period: u32,
    pub verbose: bool,
    pub parallelize_requests: bool,
    pub fetchers_dir: PathBuf,
    pub probe_timeout_secs: u64,
    pub output_path: String,
    pub features: Features,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Features {
    pub oracle_database: OracleDatabaseFeature,
    pub oracle_exadata: OracleExadataFeature,
    pub virtualization: VirtualizationFeature,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleDatabaseFeature {
    pub enabled: bool,
    pub fetcher_user: String,
    pub oratab: String,
    pub awr: u32,
    pub force_stats: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleExadataFeature {
    pub enabled: bool,
    pub fetcher_user: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VirtualizationFeature {
    pub enabled: bool,
    pub fetcher_user: String,
    pub hypervisors: Vec<Hypervisor>,
}

/// Connection parameters of one hypervisor manager
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hypervisor {
    #[serde(rename = "type")]
    pub hypervisor_type: HypervisorType,
    pub endpoint: String,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing)] // Never serialize passwords
    pub password: String,
    #[serde(default)]
    pub ovm_user_key: String,
    #[serde(default)]
    pub ovm_control: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HypervisorType {
    Vmware,
    Ovm,
    Olvm,
}

impl HypervisorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            HypervisorType::Vmware => "vmware",
            HypervisorType::Ovm => "ovm",
            HypervisorType::Olvm => "olvm",
        }
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            hostname: DEFAULT_HOSTNAME.to_string(),
            environment: String::new(),
            location: String::new(),
            tags: Vec::new(),
            period: DEFAULT_PERIOD_HOURS,
            verbose: false,
            parallelize_requests: true,
            fetchers_dir: PathBuf::from("/opt/inventory-agent/fetch"),
            probe_timeout_secs: 0,
            output_path: String::new(),
            features: Features::default(),
        }
    }
}

impl Default for OracleDatabaseFeature {
    fn default() -> Self {
        Self {
            enabled: false,
            fetcher_user: String::new(),
            oratab: DEFAULT_ORATAB.to_string(),
            awr: 30,
            force_stats: false,
        }
    }
}

impl Configuration {
    /// Load config from `INVENTORY_AGENT_CONFIG` or the OS-specific location,
    /// falling back to defaults when no file exists
    pub async fn load() -> Result<Self, ConfigError> {
        let config_path = match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) => PathBuf::from(path),
            Err(_) => match Self::config_file_path() {
                Some(path) => path,
                None => {
                    warn!("Could not find config directory, using default configuration");
                    return Ok(Self::default());
                }
            },
        };

        if config_path.exists() {
            Self::load_from_path(&config_path).await
        } else {
            warn!("No configuration at {}, using default configuration", config_path.display());
            Ok(Self::default())
        }
    }

    /// Read, parse and check a configuration file
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;

        let mut config = Self::from_toml(&content)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
        config.check()?;

        debug!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Apply defaults to invalid values, reject what cannot be repaired
    pub fn check(&mut self) -> Result<(), ConfigError> {
        if self.period == 0 {
            warn!(
                "Period has invalid value [{}], set to default value [{}]",
                self.period, DEFAULT_PERIOD_HOURS
            );
            self.period = DEFAULT_PERIOD_HOURS;
        }

        if self.features.oracle_database.oratab.trim().is_empty() {
            self.features.oracle_database.oratab = DEFAULT_ORATAB.to_string();
        }

        if self.hostname.trim().is_empty() {
            self.hostname = DEFAULT_HOSTNAME.to_string();
        }

        let virtualization = &self.features.virtualization;
        if virtualization.enabled {
            if let Some(hv) = virtualization.hypervisors.iter().find(|hv| hv.endpoint.trim().is_empty()) {
                return Err(ConfigError::Invalid(format!(
                    "{} hypervisor without endpoint",
                    hv.hypervisor_type.as_str()
                )));
            }
        }

        Ok(())
    }

    /// Hostname forced by configuration, if any
    pub fn hostname_override(&self) -> Option<&str> {
        if self.hostname == DEFAULT_HOSTNAME {
            None
        } else {
            Some(self.hostname.as_str())
        }
    }

    /// Get OS-specific config file path
    pub fn config_file_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir()?;
        path.push("inventory-agent");
        path.push("config.toml");
        Some(path)
    }
}

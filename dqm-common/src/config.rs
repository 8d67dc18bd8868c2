//! Configuration loading and root folder resolution

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Service configuration loaded from the TOML config file.
///
/// Minimal by design: bootstrap concerns only. Everything here is fixed
/// for the lifetime of the process.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Root folder holding the database (overridden by CLI/env)
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Check policy thresholds
    #[serde(default)]
    pub checks: ChecksConfig,
}

/// Tunable check policy.
///
/// These are policy defaults, not contract: the identifiers and ordering of
/// the checks never change, only their thresholds.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ChecksConfig {
    /// Standard-deviation multiplier for the anomaly check
    #[serde(default = "default_anomaly_sigma")]
    pub anomaly_sigma: f64,

    /// Violating rows tolerated before a check FAILs
    #[serde(default)]
    pub tolerance: u64,
}

fn default_port() -> u16 {
    8000
}

fn default_anomaly_sigma() -> f64 {
    3.0
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            root_folder: None,
            port: default_port(),
            checks: ChecksConfig::default(),
        }
    }
}

impl Default for ChecksConfig {
    fn default() -> Self {
        Self {
            anomaly_sigma: default_anomaly_sigma(),
            tolerance: 0,
        }
    }
}

impl ServerConfig {
    /// Load configuration from the platform config file, or defaults if no
    /// file exists. A malformed file is an error; a missing file is not.
    pub fn load() -> Result<Self> {
        match find_config_file() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific TOML file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }
}

/// Resolve the root folder following the priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&Path>, config: &ServerConfig) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var("DQM_ROOT_FOLDER") {
        return PathBuf::from(path);
    }

    // Priority 3: TOML config file
    if let Some(path) = &config.root_folder {
        return path.clone();
    }

    // Priority 4: OS-dependent compiled default
    default_root_folder()
}

/// Database file path inside the root folder
pub fn database_path(root_folder: &Path) -> PathBuf {
    root_folder.join("dqm.db")
}

/// Locate the config file for the platform.
///
/// Linux checks the user config directory first, then /etc/dqm.
fn find_config_file() -> Option<PathBuf> {
    if let Some(path) = dirs::config_dir().map(|d| d.join("dqm").join("config.toml")) {
        if path.exists() {
            return Some(path);
        }
    }
    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/dqm/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }
    None
}

/// OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("dqm"))
        .unwrap_or_else(|| PathBuf::from("./dqm_data"))
}

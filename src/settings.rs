//! Runtime settings
//!
//! Paths and tool names the ZFS backend depends on. Loaded from a JSON
//! file, e.g.:
//!
//! ```json
//! {
//!   "hostid": { "spl_hostid_path": "/sys/module/spl/parameters/spl_hostid" },
//!   "tools": { "zpool": "/usr/sbin/zpool" }
//! }
//! ```
//!
//! Missing keys fall back to their defaults.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::zfs_management::{Result, ZfsError};

pub const SPL_HOSTID_PATH: &str = "/sys/module/spl/parameters/spl_hostid";
pub const HOSTID_PATH: &str = "/etc/hostid";

/// Settings loaded from settings.json
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub hostid: HostIdSettings,
    pub tools: ToolSettings,
}

/// Where the host identifier is read from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostIdSettings {
    /// Host id as seen by the SPL kernel module
    pub spl_hostid_path: PathBuf,
    /// Binary host id file consulted when the module reports 0
    pub hostid_path: PathBuf,
}

impl Default for HostIdSettings {
    fn default() -> Self {
        HostIdSettings {
            spl_hostid_path: PathBuf::from(SPL_HOSTID_PATH),
            hostid_path: PathBuf::from(HOSTID_PATH),
        }
    }
}

/// External commands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    pub zpool: String,
    pub zfs: String,
    pub modprobe: String,
}

impl Default for ToolSettings {
    fn default() -> Self {
        ToolSettings {
            zpool: "zpool".to_string(),
            zfs: "zfs".to_string(),
            modprobe: "/sbin/modprobe".to_string(),
        }
    }
}

impl Settings {
    /// Read settings from `path`, failing on a missing or malformed file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| ZfsError::Io {
            context: format!("Failed to read settings {}", path.display()),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ZfsError::Settings {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Load settings from `path` or use defaults
pub fn load_settings(path: &Path) -> Settings {
    if !path.exists() {
        info!("{} not found, using default values", path.display());
        return Settings::default();
    }

    match Settings::from_file(path) {
        Ok(settings) => settings,
        Err(e) => {
            warn!("{}. Using defaults.", e);
            Settings::default()
        }
    }
}

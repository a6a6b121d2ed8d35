//! On-disk configuration file
//!
//! Fields are deserialized loosely (flags as strings, paths as plain
//! strings) and only become typed once [`super::ConfigValidator`] accepts
//! them.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::errors::{ConfigError, ConfigResult};

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Source datasets, processed in this order
    #[serde(default)]
    pub datasets: Vec<String>,

    /// "yes" or "no" (default: "yes")
    #[serde(default = "default_yes")]
    pub auto_snapshot: String,

    /// "yes" or "no" (default: "yes")
    #[serde(default = "default_yes")]
    pub autoprune: String,

    /// "yes" or "no" (default: "no")
    #[serde(default = "default_no")]
    pub replication: String,

    /// "local", "remote" or "both" (default: "local")
    #[serde(default = "default_destination")]
    pub destination: String,

    /// "strict" or "basic" (default: "strict")
    #[serde(default = "default_mirror_mode")]
    pub mirror_mode: String,

    /// Parent dataset for local replicas
    #[serde(default)]
    pub local_base: Option<String>,

    /// Parent dataset for remote replicas
    #[serde(default)]
    pub remote_base: Option<String>,

    #[serde(default)]
    pub remote_user: Option<String>,

    #[serde(default)]
    pub remote_host: Option<String>,

    #[serde(default)]
    pub retention: RetentionConfig,

    /// "yes" or "no" (default: "no")
    #[serde(default = "default_no")]
    pub dry_run: String,

    /// "all", "error" or "none" (default: "all")
    #[serde(default = "default_notify")]
    pub notify: String,

    /// External notification program; the structured log is used when unset
    #[serde(default)]
    pub notify_command: Option<String>,

    /// Directory holding one scheduler config directory per dataset
    #[serde(default = "default_config_root")]
    pub config_root: String,

    /// Persisted dataset set (default: `<config_root>/datasets.state`)
    #[serde(default)]
    pub state_file: Option<String>,

    /// Replaces '/' when flattening dataset names (default: "_")
    #[serde(default = "default_separator_substitute")]
    pub separator_substitute: String,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u32,

    /// Program whose presence is probed on the remote endpoint
    #[serde(default = "default_remote_tool")]
    pub remote_tool: String,

    #[serde(default)]
    pub programs: ProgramsConfig,
}

/// Snapshots kept per tier. Signed so negative values reach validation
/// and are reported by field name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionConfig {
    #[serde(default = "default_hourly")]
    pub hourly: i64,
    #[serde(default = "default_daily")]
    pub daily: i64,
    #[serde(default = "default_weekly")]
    pub weekly: i64,
    #[serde(default = "default_monthly")]
    pub monthly: i64,
    #[serde(default)]
    pub yearly: i64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            hourly: default_hourly(),
            daily: default_daily(),
            weekly: default_weekly(),
            monthly: default_monthly(),
            yearly: 0,
        }
    }
}

/// External program paths
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramsConfig {
    #[serde(default = "default_zfs")]
    pub zfs: String,
    #[serde(default = "default_sanoid")]
    pub sanoid: String,
    #[serde(default = "default_syncoid")]
    pub syncoid: String,
    #[serde(default = "default_ssh")]
    pub ssh: String,
}

impl Default for ProgramsConfig {
    fn default() -> Self {
        Self {
            zfs: default_zfs(),
            sanoid: default_sanoid(),
            syncoid: default_syncoid(),
            ssh: default_ssh(),
        }
    }
}

fn default_yes() -> String {
    "yes".to_string()
}
fn default_no() -> String {
    "no".to_string()
}
fn default_destination() -> String {
    "local".to_string()
}
fn default_mirror_mode() -> String {
    "strict".to_string()
}
fn default_notify() -> String {
    "all".to_string()
}
fn default_config_root() -> String {
    "/etc/zmirror".to_string()
}
fn default_separator_substitute() -> String {
    "_".to_string()
}
fn default_connect_timeout_secs() -> u32 {
    5
}
fn default_remote_tool() -> String {
    "zfs".to_string()
}
fn default_hourly() -> i64 {
    24
}
fn default_daily() -> i64 {
    7
}
fn default_weekly() -> i64 {
    4
}
fn default_monthly() -> i64 {
    3
}
fn default_zfs() -> String {
    "zfs".to_string()
}
fn default_sanoid() -> String {
    "sanoid".to_string()
}
fn default_syncoid() -> String {
    "syncoid".to_string()
}
fn default_ssh() -> String {
    "ssh".to_string()
}

impl Config {
    /// Load configuration from file. Does not validate.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = Config::from_json(r#"{"datasets": ["cache/appdata"]}"#).unwrap();
        assert_eq!(config.auto_snapshot, "yes");
        assert_eq!(config.replication, "no");
        assert_eq!(config.destination, "local");
        assert_eq!(config.mirror_mode, "strict");
        assert_eq!(config.notify, "all");
        assert_eq!(config.separator_substitute, "_");
        assert_eq!(config.connect_timeout_secs, 5);
        assert_eq!(config.retention.hourly, 24);
        assert_eq!(config.retention.yearly, 0);
        assert_eq!(config.programs.syncoid, "syncoid");
    }

    #[test]
    fn test_partial_nested_sections() {
        let config = Config::from_json(
            r#"{"datasets": [], "retention": {"daily": 30}, "programs": {"zfs": "/sbin/zfs"}}"#,
        )
        .unwrap();
        assert_eq!(config.retention.daily, 30);
        assert_eq!(config.retention.hourly, 24);
        assert_eq!(config.programs.zfs, "/sbin/zfs");
        assert_eq!(config.programs.ssh, "ssh");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"datasets": ["tank/a"], "replication": "yes"}}"#).unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.datasets, vec!["tank/a"]);
        assert_eq!(config.replication, "yes");
    }

    #[test]
    fn test_load_errors() {
        let err = Config::load(Path::new("/nonexistent/zmirror.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();
        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert_eq!(err.code(), "ZM_CONFIG_PARSE");
    }
}

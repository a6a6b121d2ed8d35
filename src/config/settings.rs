//! Validated, typed run settings

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::dataset::{DatasetName, PathCodec, Zfs};
use crate::notify::NotificationSeverity;
use crate::remote::{RemoteEndpoint, SshTransport};

/// Where replicas are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DestinationTopology {
    Local,
    Remote,
    Both,
}

impl DestinationTopology {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "local" => Some(DestinationTopology::Local),
            "remote" => Some(DestinationTopology::Remote),
            "both" => Some(DestinationTopology::Both),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DestinationTopology::Local => "local",
            DestinationTopology::Remote => "remote",
            DestinationTopology::Both => "both",
        }
    }

    pub fn includes_local(&self) -> bool {
        matches!(self, DestinationTopology::Local | DestinationTopology::Both)
    }

    pub fn includes_remote(&self) -> bool {
        matches!(self, DestinationTopology::Remote | DestinationTopology::Both)
    }
}

impl fmt::Display for DestinationTopology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether destination-only snapshots survive replication
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MirrorMode {
    /// Destination-only snapshots are deleted
    StrictMirror,
    /// Destination-only snapshots are kept
    Basic,
}

impl MirrorMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "strict" => Some(MirrorMode::StrictMirror),
            "basic" => Some(MirrorMode::Basic),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MirrorMode::StrictMirror => "strict",
            MirrorMode::Basic => "basic",
        }
    }
}

/// Which notifications reach the sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyLevel {
    All,
    Error,
    None,
}

impl NotifyLevel {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "all" => Some(NotifyLevel::All),
            "error" => Some(NotifyLevel::Error),
            "none" => Some(NotifyLevel::None),
            _ => None,
        }
    }

    pub fn permits(&self, severity: NotificationSeverity) -> bool {
        match self {
            NotifyLevel::All => true,
            NotifyLevel::Error => severity == NotificationSeverity::Alert,
            NotifyLevel::None => false,
        }
    }
}

/// Snapshots kept per tier. Passed through to the scheduler verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RetentionPolicy {
    pub hourly: u32,
    pub daily: u32,
    pub weekly: u32,
    pub monthly: u32,
    pub yearly: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Programs {
    pub zfs: String,
    pub sanoid: String,
    pub syncoid: String,
    pub ssh: String,
}

/// Parent datasets replicas are created under
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DestinationBases {
    pub local: Option<DatasetName>,
    pub remote: Option<DatasetName>,
}

/// Everything a run needs, fixed for its duration.
#[derive(Debug, Clone)]
pub struct Settings {
    pub datasets: Vec<DatasetName>,
    pub auto_snapshot: bool,
    pub autoprune: bool,
    pub replication: bool,
    pub topology: DestinationTopology,
    pub mirror_mode: MirrorMode,
    pub bases: DestinationBases,
    /// Present exactly when the topology includes the remote side
    pub remote: Option<RemoteEndpoint>,
    pub retention: RetentionPolicy,
    pub dry_run: bool,
    pub notify: NotifyLevel,
    pub notify_command: Option<String>,
    pub config_root: PathBuf,
    pub state_file: PathBuf,
    pub codec: PathCodec,
    pub connect_timeout_secs: u32,
    pub remote_tool: String,
    pub programs: Programs,
}

impl Settings {
    pub fn transport(&self) -> SshTransport {
        SshTransport::new(self.programs.ssh.clone(), self.connect_timeout_secs)
    }

    pub fn zfs(&self) -> Zfs {
        Zfs::new(self.programs.zfs.clone(), self.transport())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topology_sides() {
        assert!(DestinationTopology::Local.includes_local());
        assert!(!DestinationTopology::Local.includes_remote());
        assert!(DestinationTopology::Both.includes_local());
        assert!(DestinationTopology::Both.includes_remote());
        assert!(!DestinationTopology::Remote.includes_local());
        assert_eq!(DestinationTopology::parse("yes"), None);
    }

    #[test]
    fn test_notify_level_filter() {
        assert!(NotifyLevel::All.permits(NotificationSeverity::Normal));
        assert!(!NotifyLevel::Error.permits(NotificationSeverity::Normal));
        assert!(NotifyLevel::Error.permits(NotificationSeverity::Alert));
        assert!(!NotifyLevel::None.permits(NotificationSeverity::Alert));
    }

    #[test]
    fn test_mirror_mode_parse() {
        assert_eq!(MirrorMode::parse("strict"), Some(MirrorMode::StrictMirror));
        assert_eq!(MirrorMode::parse("basic"), Some(MirrorMode::Basic));
        assert_eq!(MirrorMode::parse("Strict"), None);
    }
}

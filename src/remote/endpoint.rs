//! Remote endpoint addressing and the ssh transport

use std::fmt;

use serde::Serialize;

use crate::exec::CommandSpec;

/// `user@host` pair a remote destination is reached through
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RemoteEndpoint {
    pub user: String,
    pub host: String,
}

impl RemoteEndpoint {
    pub fn new(user: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            host: host.into(),
        }
    }

    /// Address a dataset on this endpoint the way the transfer tool expects
    /// (`user@host:dataset`).
    pub fn address(&self, dataset: &str) -> String {
        format!("{}:{}", self, dataset)
    }
}

impl fmt::Display for RemoteEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.user, self.host)
    }
}

/// Where a storage command runs
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Location {
    Local,
    Remote(RemoteEndpoint),
}

impl Location {
    pub fn is_remote(&self) -> bool {
        matches!(self, Location::Remote(_))
    }

    /// Short label for logs
    pub fn label(&self) -> String {
        match self {
            Location::Local => "local".to_string(),
            Location::Remote(endpoint) => endpoint.to_string(),
        }
    }
}

/// Non-interactive ssh with a bounded connect timeout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshTransport {
    program: String,
    connect_timeout_secs: u32,
}

impl SshTransport {
    pub fn new(program: impl Into<String>, connect_timeout_secs: u32) -> Self {
        Self {
            program: program.into(),
            connect_timeout_secs,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Options shared by every remote invocation, including the ones the
    /// transfer tool makes on our behalf.
    pub fn options(&self) -> Vec<String> {
        vec![
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            format!("ConnectTimeout={}", self.connect_timeout_secs),
        ]
    }

    /// Wrap `inner` so it runs on `endpoint`. The remote shell receives the
    /// rendered command as a single argument.
    pub fn wrap(&self, endpoint: &RemoteEndpoint, inner: &CommandSpec) -> CommandSpec {
        CommandSpec::new(self.program.clone())
            .args(self.options())
            .arg(endpoint.to_string())
            .arg(inner.to_string())
    }

    /// `inner` as-is for local, ssh-wrapped for remote.
    pub fn at(&self, location: &Location, inner: CommandSpec) -> CommandSpec {
        match location {
            Location::Local => inner,
            Location::Remote(endpoint) => self.wrap(endpoint, &inner),
        }
    }
}

impl Default for SshTransport {
    fn default() -> Self {
        Self::new("ssh", 5)
    }
}

//! Remote endpoint probes

use crate::exec::{CommandRunner, CommandSpec};
use crate::observability::{log_event_with_fields, Event};

use super::endpoint::{RemoteEndpoint, SshTransport};
use super::errors::{ConnectivityError, ConnectivityResult};

/// Verifies a remote endpoint before any dataset is touched.
///
/// Both probes are read-only and run in dry-run mode as well.
pub struct ConnectivityChecker<'a> {
    transport: &'a SshTransport,
    tool: &'a str,
}

impl<'a> ConnectivityChecker<'a> {
    pub fn new(transport: &'a SshTransport, tool: &'a str) -> Self {
        Self { transport, tool }
    }

    pub fn reachability_probe(&self, endpoint: &RemoteEndpoint) -> CommandSpec {
        self.transport.wrap(endpoint, &CommandSpec::new("true"))
    }

    pub fn tool_probe(&self, endpoint: &RemoteEndpoint) -> CommandSpec {
        self.transport
            .wrap(endpoint, &CommandSpec::new("which").arg(self.tool))
    }

    /// Reachability first; the tool probe only runs against a reachable host.
    pub fn check(
        &self,
        runner: &CommandRunner<'_>,
        endpoint: &RemoteEndpoint,
    ) -> ConnectivityResult<()> {
        let label = endpoint.to_string();
        let unusable = |err: ConnectivityError| {
            let reason = err.to_string();
            log_event_with_fields(
                Event::RemoteUnusable,
                &[("endpoint", label.as_str()), ("reason", reason.as_str())],
            );
            err
        };

        let reach = runner
            .query(&self.reachability_probe(endpoint))
            .map_err(|e| {
                unusable(ConnectivityError::Unreachable {
                    endpoint: endpoint.to_string(),
                    reason: e.to_string(),
                })
            })?;
        if !reach.is_success() {
            let reason = match reach.stderr.trim() {
                "" => format!("probe exited with {:?}", reach.code),
                stderr => stderr.to_string(),
            };
            return Err(unusable(ConnectivityError::Unreachable {
                endpoint: endpoint.to_string(),
                reason,
            }));
        }

        let tool = runner.query(&self.tool_probe(endpoint)).map_err(|e| {
            unusable(ConnectivityError::Unreachable {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })
        })?;
        if !tool.is_success() {
            return Err(unusable(ConnectivityError::ToolMissing {
                endpoint: endpoint.to_string(),
                tool: self.tool.to_string(),
            }));
        }

        log_event_with_fields(
            Event::RemoteVerified,
            &[("endpoint", label.as_str()), ("tool", self.tool)],
        );
        Ok(())
    }
}

//! Idempotent destination creation

use crate::dataset::Zfs;
use crate::exec::CommandRunner;
use crate::observability::{log_event_with_fields, Event, RunMetrics};

use super::destination::DestinationTarget;
use super::errors::{ReplicationError, ReplicationResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureOutcome {
    /// Target already existed, nothing was run
    Present,
    /// Target and any missing parents were created
    Created,
}

/// Makes sure a target dataset exists before anything is sent to it.
pub struct PathEnsurer<'a> {
    zfs: &'a Zfs,
    metrics: &'a RunMetrics,
}

impl<'a> PathEnsurer<'a> {
    pub fn new(zfs: &'a Zfs, metrics: &'a RunMetrics) -> Self {
        Self { zfs, metrics }
    }

    pub fn ensure(
        &self,
        runner: &CommandRunner<'_>,
        target: &DestinationTarget,
    ) -> ReplicationResult<EnsureOutcome> {
        let address = target.address();
        let exists = self
            .zfs
            .exists(runner, &target.location, &target.dataset)
            .map_err(|source| ReplicationError::PathQuery {
                target: address.clone(),
                source,
            })?;
        if exists {
            log_event_with_fields(Event::PathPresent, &[("target", address.as_str())]);
            return Ok(EnsureOutcome::Present);
        }

        self.zfs
            .create(runner, &target.location, &target.dataset)
            .map_err(|source| ReplicationError::PathCreation {
                target: address.clone(),
                source,
            })?;
        self.metrics.increment_paths_created();
        log_event_with_fields(Event::PathCreated, &[("target", address.as_str())]);
        Ok(EnsureOutcome::Created)
    }
}

//! Snapshot listing and selection

use serde::Serialize;

use crate::exec::CommandRunner;
use crate::remote::Location;

use super::errors::{DatasetError, DatasetResult};
use super::name::DatasetName;
use super::zfs::Zfs;

/// Prefix of the transfer tool's own synchronization snapshots
pub const SYNC_HELPER_PREFIX: &str = "syncoid_";

/// One snapshot of one dataset.
///
/// `order` is the position in creation order (0 = oldest) as reported by the
/// storage tool. It is the only ordering signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotRecord {
    pub dataset: DatasetName,
    pub name: String,
    pub order: usize,
}

impl SnapshotRecord {
    /// `dataset@name`
    pub fn full_name(&self) -> String {
        format!("{}@{}", self.dataset, self.name)
    }
}

pub struct SnapshotSelector<'a> {
    zfs: &'a Zfs,
}

impl<'a> SnapshotSelector<'a> {
    pub fn new(zfs: &'a Zfs) -> Self {
        Self { zfs }
    }

    /// Snapshots of `dataset`, oldest first, helper snapshots excluded
    pub fn list(
        &self,
        runner: &CommandRunner<'_>,
        location: &Location,
        dataset: &DatasetName,
    ) -> DatasetResult<Vec<SnapshotRecord>> {
        let prefix = format!("{}@", dataset);
        let records = self
            .zfs
            .list_snapshots(runner, location, dataset)?
            .iter()
            .filter_map(|line| line.strip_prefix(prefix.as_str()))
            .filter(|snap| !snap.is_empty() && !snap.starts_with(SYNC_HELPER_PREFIX))
            .enumerate()
            .map(|(order, snap)| SnapshotRecord {
                dataset: dataset.clone(),
                name: snap.to_string(),
                order,
            })
            .collect();
        Ok(records)
    }

    /// Newest snapshot, `NoSnapshot` when there is none
    pub fn latest(
        &self,
        runner: &CommandRunner<'_>,
        location: &Location,
        dataset: &DatasetName,
    ) -> DatasetResult<SnapshotRecord> {
        self.select(runner, location, dataset, None)
    }

    /// The explicit snapshot if given and present, else the newest.
    pub fn select(
        &self,
        runner: &CommandRunner<'_>,
        location: &Location,
        dataset: &DatasetName,
        explicit: Option<&str>,
    ) -> DatasetResult<SnapshotRecord> {
        let mut records = self.list(runner, location, dataset)?;
        if records.is_empty() {
            return Err(DatasetError::NoSnapshot {
                dataset: dataset.to_string(),
            });
        }

        match explicit {
            Some(wanted) => {
                let wanted = wanted
                    .strip_prefix(&format!("{}@", dataset))
                    .unwrap_or(wanted);
                records
                    .into_iter()
                    .find(|record| record.name == wanted)
                    .ok_or_else(|| DatasetError::SnapshotNotFound {
                        dataset: dataset.to_string(),
                        snapshot: wanted.to_string(),
                    })
            }
            None => records.pop().ok_or_else(|| DatasetError::NoSnapshot {
                dataset: dataset.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::{CommandOutput, ScriptedExecutor};
    use crate::remote::SshTransport;

    const LISTING: &str = "cache/appdata@autosnap_2024-01-01_00:00:01_daily\n\
cache/appdata@syncoid_nas_2024-01-01:00:05:00\n\
cache/appdata@autosnap_2024-01-02_00:00:01_daily\n";

    fn name(s: &str) -> DatasetName {
        DatasetName::parse(s).unwrap()
    }

    fn setup(listing: &str) -> (ScriptedExecutor, Zfs) {
        let exec = ScriptedExecutor::new();
        exec.respond("-t snapshot", CommandOutput::success(listing));
        (exec, Zfs::new("zfs", SshTransport::default()))
    }

    #[test]
    fn test_list_in_creation_order_without_helpers() {
        let (exec, zfs) = setup(LISTING);
        let runner = CommandRunner::new(&exec, false);

        let records = SnapshotSelector::new(&zfs)
            .list(&runner, &Location::Local, &name("cache/appdata"))
            .unwrap();

        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["autosnap_2024-01-01_00:00:01_daily", "autosnap_2024-01-02_00:00:01_daily"]
        );
        assert_eq!(records[1].order, 1);
    }

    #[test]
    fn test_latest_is_newest() {
        let (exec, zfs) = setup(LISTING);
        let runner = CommandRunner::new(&exec, false);

        let latest = SnapshotSelector::new(&zfs)
            .latest(&runner, &Location::Local, &name("cache/appdata"))
            .unwrap();
        assert_eq!(
            latest.full_name(),
            "cache/appdata@autosnap_2024-01-02_00:00:01_daily"
        );
    }

    #[test]
    fn test_no_snapshots() {
        let (exec, zfs) = setup("");
        let runner = CommandRunner::new(&exec, false);

        let err = SnapshotSelector::new(&zfs)
            .latest(&runner, &Location::Local, &name("cache/appdata"))
            .unwrap_err();
        assert!(matches!(err, DatasetError::NoSnapshot { .. }));
    }

    #[test]
    fn test_only_helper_snapshots_counts_as_none() {
        let (exec, zfs) = setup("cache/appdata@syncoid_nas_2024\n");
        let runner = CommandRunner::new(&exec, false);

        let err = SnapshotSelector::new(&zfs)
            .latest(&runner, &Location::Local, &name("cache/appdata"))
            .unwrap_err();
        assert!(matches!(err, DatasetError::NoSnapshot { .. }));
    }

    #[test]
    fn test_select_explicit() {
        let (exec, zfs) = setup(LISTING);
        let runner = CommandRunner::new(&exec, false);
        let selector = SnapshotSelector::new(&zfs);
        let ds = name("cache/appdata");

        let chosen = selector
            .select(&runner, &Location::Local, &ds, Some("autosnap_2024-01-01_00:00:01_daily"))
            .unwrap();
        assert_eq!(chosen.order, 0);

        let qualified = selector
            .select(
                &runner,
                &Location::Local,
                &ds,
                Some("cache/appdata@autosnap_2024-01-01_00:00:01_daily"),
            )
            .unwrap();
        assert_eq!(qualified, chosen);

        let err = selector
            .select(&runner, &Location::Local, &ds, Some("nope"))
            .unwrap_err();
        assert!(matches!(err, DatasetError::SnapshotNotFound { .. }));
    }
}

//! Hierarchy enumeration

use crate::exec::CommandRunner;
use crate::remote::Location;

use super::errors::DatasetResult;
use super::name::DatasetName;
use super::zfs::Zfs;

/// Enumerates a dataset and its descendants.
pub struct DatasetTraverser<'a> {
    zfs: &'a Zfs,
}

impl<'a> DatasetTraverser<'a> {
    pub fn new(zfs: &'a Zfs) -> Self {
        Self { zfs }
    }

    /// `root` first, then every descendant in lexical order.
    ///
    /// The order depends only on the names present, so re-listing unchanged
    /// storage yields the same sequence. Lines outside `root`'s subtree are
    /// dropped.
    pub fn list(
        &self,
        runner: &CommandRunner<'_>,
        location: &Location,
        root: &DatasetName,
    ) -> DatasetResult<Vec<DatasetName>> {
        let mut descendants = Vec::new();
        for line in self.zfs.list_tree(runner, location, root)? {
            let name = DatasetName::parse(&line)?;
            if name != *root && root.contains(&name) {
                descendants.push(name);
            }
        }
        descendants.sort();
        descendants.dedup();

        let mut ordered = Vec::with_capacity(descendants.len() + 1);
        ordered.push(root.clone());
        ordered.extend(descendants);
        Ok(ordered)
    }
}

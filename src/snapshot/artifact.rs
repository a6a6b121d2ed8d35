//! Per-dataset scheduler configuration
//!
//! Each configured dataset owns `<config_root>/<encoded name>/sanoid.conf`.
//! The file is rewritten only when its rendered content changes, so the
//! scheduler never sees a modification it did not need.

use std::path::{Path, PathBuf};

use crate::config::RetentionPolicy;
use crate::dataset::{DatasetName, PathCodec};
use crate::exec::CommandRunner;
use crate::state::{read_optional, write_atomic};

use super::errors::{SnapshotError, SnapshotResult};

pub const ARTIFACT_FILE_NAME: &str = "sanoid.conf";
const TEMPLATE: &str = "zmirror";

/// Directory holding the artifact of `dataset`
pub fn artifact_dir(config_root: &Path, codec: &PathCodec, dataset: &DatasetName) -> PathBuf {
    config_root.join(codec.encode(dataset))
}

/// Everything that goes into one artifact
#[derive(Debug, Clone, Copy)]
pub struct ArtifactSpec<'a> {
    pub dataset: &'a DatasetName,
    pub retention: &'a RetentionPolicy,
    pub autosnap: bool,
    pub autoprune: bool,
}

impl ArtifactSpec<'_> {
    pub fn render(&self) -> String {
        let yes_no = |flag: bool| if flag { "yes" } else { "no" };
        let r = self.retention;
        format!(
            "[{dataset}]\n\
             \tuse_template = {template}\n\
             \trecursive = yes\n\
             \n\
             [template_{template}]\n\
             \thourly = {hourly}\n\
             \tdaily = {daily}\n\
             \tweekly = {weekly}\n\
             \tmonthly = {monthly}\n\
             \tyearly = {yearly}\n\
             \tautosnap = {autosnap}\n\
             \tautoprune = {autoprune}\n",
            dataset = self.dataset,
            template = TEMPLATE,
            hourly = r.hourly,
            daily = r.daily,
            weekly = r.weekly,
            monthly = r.monthly,
            yearly = r.yearly,
            autosnap = yes_no(self.autosnap),
            autoprune = yes_no(self.autoprune),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactStatus {
    Written,
    Unchanged,
}

/// Bring the artifact in `dir` up to date with `content`.
pub fn sync_artifact(
    runner: &CommandRunner<'_>,
    dir: &Path,
    content: &str,
) -> SnapshotResult<ArtifactStatus> {
    let path = dir.join(ARTIFACT_FILE_NAME);
    let current = read_optional(&path).map_err(|source| SnapshotError::ArtifactRead {
        path: path.display().to_string(),
        source,
    })?;
    if current.as_deref() == Some(content) {
        return Ok(ArtifactStatus::Unchanged);
    }

    runner
        .apply(&format!("write {}", path.display()), || {
            write_atomic(&path, content)
        })
        .map_err(SnapshotError::ArtifactWrite)?;
    Ok(ArtifactStatus::Written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::ScriptedExecutor;
    use std::fs;
    use tempfile::TempDir;

    fn retention() -> RetentionPolicy {
        RetentionPolicy {
            hourly: 24,
            daily: 7,
            weekly: 4,
            monthly: 3,
            yearly: 0,
        }
    }

    #[test]
    fn test_render() {
        let dataset = DatasetName::parse("cache/appdata").unwrap();
        let retention = retention();
        let content = ArtifactSpec {
            dataset: &dataset,
            retention: &retention,
            autosnap: true,
            autoprune: false,
        }
        .render();

        assert!(content.starts_with("[cache/appdata]\n\tuse_template = zmirror\n\trecursive = yes\n\n"));
        assert!(content.contains("[template_zmirror]\n\thourly = 24\n"));
        assert!(content.contains("\tyearly = 0\n"));
        assert!(content.contains("\tautosnap = yes\n"));
        assert!(content.ends_with("\tautoprune = no\n"));
    }

    #[test]
    fn test_artifact_dir_uses_encoded_name() {
        let dataset = DatasetName::parse("cache/appdata").unwrap();
        assert_eq!(
            artifact_dir(Path::new("/etc/zmirror"), &PathCodec::default(), &dataset),
            PathBuf::from("/etc/zmirror/cache_appdata")
        );
    }

    #[test]
    fn test_sync_writes_only_on_change() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("cache_appdata");
        let exec = ScriptedExecutor::new();
        let runner = CommandRunner::new(&exec, false);

        assert_eq!(sync_artifact(&runner, &dir, "a").unwrap(), ArtifactStatus::Written);
        assert_eq!(sync_artifact(&runner, &dir, "a").unwrap(), ArtifactStatus::Unchanged);
        assert_eq!(sync_artifact(&runner, &dir, "b").unwrap(), ArtifactStatus::Written);
        assert_eq!(fs::read_to_string(dir.join(ARTIFACT_FILE_NAME)).unwrap(), "b");
    }

    #[test]
    fn test_sync_dry_run_previews() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("cache_appdata");
        let exec = ScriptedExecutor::new();
        let runner = CommandRunner::new(&exec, true);

        assert_eq!(sync_artifact(&runner, &dir, "a").unwrap(), ArtifactStatus::Written);
        assert!(!dir.exists());
        assert_eq!(
            runner.previews(),
            vec![format!("write {}", dir.join(ARTIFACT_FILE_NAME).display())]
        );
    }
}

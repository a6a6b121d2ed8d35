//! Snapshot lifecycle
//!
//! Snapshot timestamps and expiry belong to the external scheduler. This
//! module only prepares its per-dataset configuration and invokes it:
//!
//! - `artifact`: render and sync `<config_root>/<encoded>/sanoid.conf`
//! - `scheduler`: take / prune invocations
//! - `phase`: the per-dataset sequence run by the coordinator

mod artifact;
mod errors;
mod phase;
mod scheduler;

pub use artifact::{
    artifact_dir, sync_artifact, ArtifactSpec, ArtifactStatus, ARTIFACT_FILE_NAME,
};
pub use errors::{SnapshotError, SnapshotResult};
pub use phase::{SnapshotPhase, SnapshotReport};
pub use scheduler::Scheduler;

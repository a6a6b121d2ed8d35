//! Replication to local and remote destinations
//!
//! - `DestinationResolver`: source dataset to concrete targets
//! - `PathEnsurer`: idempotent target creation
//! - `ReplicationExecutor`: snapshot-guarded transfers, one outcome per target
//!
//! Failures here are never fatal to a run. They are reported per dataset or
//! per target by the coordinator.

mod destination;
mod ensure;
mod errors;
mod transfer;

pub use destination::{DestinationResolver, DestinationTarget};
pub use ensure::{EnsureOutcome, PathEnsurer};
pub use errors::{ReplicationError, ReplicationResult};
pub use transfer::{
    mirror_flags, ReplicationExecutor, TargetOutcome, TransferRecord, TransferTool, BASE_FLAGS,
    STRICT_FLAGS,
};

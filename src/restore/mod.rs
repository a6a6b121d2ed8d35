//! Restore from a replica
//!
//! Restore reverses replication: each dataset of a backup tree is streamed
//! back into place from one snapshot, forcing an overwrite of whatever is
//! there. Overwriting an existing dataset needs explicit confirmation.

mod confirm;
mod errors;
mod restorer;

pub use confirm::{is_affirmative, AssumeYes, Confirmer, ScriptedConfirmer};
pub use errors::{RestoreError, RestoreResult};
pub use restorer::{
    NodeStatus, RestoreRequest, RestoreSource, RestoreSummary, RestoredNode, Restorer,
};

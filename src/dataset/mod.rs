//! Datasets, names, and snapshots
//!
//! - `DatasetName`: validated hierarchical identifier
//! - `PathCodec`: flat destination segment encoding
//! - `Zfs`: storage command primitives (local or remote)
//! - `DatasetTraverser`: root-first hierarchy listing
//! - `SnapshotSelector`: creation-ordered snapshot selection

mod codec;
mod errors;
mod name;
mod snapshots;
mod traverse;
mod zfs;

pub use codec::{CodecError, PathCodec, DEFAULT_SUBSTITUTE, ESCAPE};
pub use errors::{DatasetError, DatasetResult};
pub use name::{DatasetName, InvalidDatasetName, SEPARATOR};
pub use snapshots::{SnapshotRecord, SnapshotSelector, SYNC_HELPER_PREFIX};
pub use traverse::DatasetTraverser;
pub use zfs::Zfs;

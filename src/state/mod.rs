//! Persisted run state
//!
//! - `RunState`: the dataset set recorded by the previous run
//! - `StateReconciler`: orphan cleanup and the single state write per run
//! - `write_atomic`: temp-file-and-rename replacement used for every file
//!   this crate writes

mod atomic;
mod errors;
mod file;
mod reconciler;

pub use atomic::{read_optional, write_atomic};
pub use errors::{StateError, StateResult};
pub use file::RunState;
pub use reconciler::{ReconcileReport, StateReconciler};

//! Run coordination
//!
//! The coordinator owns the lifecycle of one invocation. Per-dataset state
//! lives in a [`DatasetContext`] created for each iteration; results are
//! collected into a [`RunSummary`].

mod context;
mod coordinator;
mod errors;
mod result;

pub use context::DatasetContext;
pub use coordinator::RunCoordinator;
pub use errors::RunError;
pub use result::{DatasetOutcome, Failure, Phase, RunResult, RunSummary};

//! zmirror - snapshot lifecycle and multi-destination replication for
//! hierarchical datasets
//!
//! One run validates its configuration, brings every configured dataset's
//! snapshots up to date, cleans up after datasets that are no longer
//! configured, and mirrors each dataset to a local and/or remote replica.
//! A companion restore flow streams a replica back into place.

pub mod cli;
pub mod config;
pub mod dataset;
pub mod errors;
pub mod exec;
pub mod notify;
pub mod observability;
pub mod remote;
pub mod replication;
pub mod restore;
pub mod run;
pub mod snapshot;
pub mod state;

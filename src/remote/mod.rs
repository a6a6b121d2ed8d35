//! Remote endpoints
//!
//! Addressing (`user@host`, `user@host:dataset`), the non-interactive ssh
//! transport every remote command is wrapped in, and the startup probes.

mod connectivity;
mod endpoint;
mod errors;

pub use connectivity::ConnectivityChecker;
pub use endpoint::{Location, RemoteEndpoint, SshTransport};
pub use errors::{ConnectivityError, ConnectivityResult};

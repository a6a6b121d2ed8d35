//! Run configuration
//!
//! A JSON file is loaded into [`Config`] and turned into typed [`Settings`]
//! exactly once by [`ConfigValidator`]. Downstream code only ever sees the
//! typed form.

mod errors;
mod file;
mod settings;
mod validator;

pub use errors::{ConfigError, ConfigResult};
pub use file::{Config, ProgramsConfig, RetentionConfig};
pub use settings::{
    DestinationBases, DestinationTopology, MirrorMode, NotifyLevel, Programs, RetentionPolicy,
    Settings,
};
pub use validator::ConfigValidator;

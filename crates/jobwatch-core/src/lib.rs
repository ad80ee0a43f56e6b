//! jobwatch-core — configuration and data model shared by every jobwatch crate.
//!
//! A single invocation of the monitor produces exactly one [`CheckResult`].
//! The prober yields a [`Probe`], the orchestrator stamps it with the
//! invocation time and target URL, and the recorder and dispatcher only
//! ever read the finished record.

pub mod config;
pub mod error;
pub mod types;

pub use config::MonitorConfig;
pub use error::{ConfigError, ConfigResult};
pub use types::*;

//! jobwatch-alert — best-effort failure notifications.
//!
//! The webhook's payload schema is not known ahead of time, so the
//! dispatcher walks an ordered list of [`PayloadShape`]s and stops at the
//! first one the endpoint accepts. Total failure is swallowed.

pub mod dispatcher;

pub use dispatcher::{dispatch, dispatch_with, PayloadShape};

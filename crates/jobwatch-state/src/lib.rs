//! jobwatch-state — durable result log for jobwatch.
//!
//! Each invocation appends one row to a comma-delimited UTF-8 file. The
//! header is written only when the file is empty; existing rows are never
//! read, rewritten or reordered.
//!
//! Rows are written with a single `write_all` on a file opened in append
//! mode, so overlapping invocations interleave whole rows. There is no
//! file locking.

pub mod error;
pub mod recorder;

pub use error::{RecordError, RecordResult};
pub use recorder::ResultRecorder;

//! jobwatch-health — one-shot health probing for jobwatch.
//!
//! Issues a single GET against the target API, measures latency, and
//! classifies the response into a [`Probe`](jobwatch_core::Probe).
//!
//! # Architecture
//!
//! ```text
//! probe(url, field, timeout)
//!   ├── HttpClient::get()  (reqwest, rustls, up to 5 redirects)
//!   ├── status check       (!= 200 → DOWN "Non-200 status: <code>")
//!   └── count_jobs()       (JSON body → length of the job array)
//! ```
//!
//! No failure escapes the prober: transport errors, timeouts and
//! malformed bodies all become `ProbeOutcome::Down`.

pub mod client;
pub mod probe;

pub use client::{HttpClient, HttpError, HttpResponse};
pub use probe::{probe, probe_with};

//! Check result model.
//!
//! The prober reports a [`Probe`]; [`CheckResult::from_probe`] is the only
//! way to build the record, so an `UP` result can never carry an error and
//! a `DOWN` result can never carry a job count.

use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

/// Maximum length (in characters) of a recorded failure description.
pub const MAX_ERROR_CHARS: usize = 200;

/// Column order of the result log and the printed record.
pub const FIELD_NAMES: [&str; 7] = [
    "timestamp",
    "target_url",
    "status",
    "http_code",
    "latency_ms",
    "jobs_count",
    "error",
];

/// Overall outcome of one check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CheckStatus {
    Up,
    Down,
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckStatus::Up => f.write_str("UP"),
            CheckStatus::Down => f.write_str("DOWN"),
        }
    }
}

/// Classified outcome of a single probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The endpoint answered 200 with a readable job listing.
    Up { http_code: u16, jobs_count: u64 },
    /// Anything else. `http_code` is set iff a response was received.
    Down {
        http_code: Option<u16>,
        error: String,
    },
}

impl ProbeOutcome {
    /// Build a `Down` outcome, truncating the description.
    pub fn down(http_code: Option<u16>, error: impl AsRef<str>) -> Self {
        ProbeOutcome::Down {
            http_code,
            error: truncate_error(error.as_ref()),
        }
    }

    pub fn status(&self) -> CheckStatus {
        match self {
            ProbeOutcome::Up { .. } => CheckStatus::Up,
            ProbeOutcome::Down { .. } => CheckStatus::Down,
        }
    }
}

/// Outcome of a probe together with how long it took to determine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Probe {
    pub outcome: ProbeOutcome,
    pub latency: Duration,
}

/// Immutable record of one check-log-alert cycle.
///
/// Serializes with the fields in [`FIELD_NAMES`] order; absent optionals
/// become empty CSV cells or JSON `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    #[serde(serialize_with = "serialize_timestamp")]
    timestamp: DateTime<Utc>,
    target_url: String,
    status: CheckStatus,
    http_code: Option<u16>,
    latency_ms: u64,
    jobs_count: Option<u64>,
    error: Option<String>,
}

impl CheckResult {
    /// Stamp a probe with the invocation time and the probed URL.
    pub fn from_probe(timestamp: DateTime<Utc>, target_url: impl Into<String>, probe: Probe) -> Self {
        let latency_ms = u64::try_from(probe.latency.as_millis()).unwrap_or(u64::MAX);
        let (status, http_code, jobs_count, error) = match probe.outcome {
            ProbeOutcome::Up {
                http_code,
                jobs_count,
            } => (CheckStatus::Up, Some(http_code), Some(jobs_count), None),
            ProbeOutcome::Down { http_code, error } => {
                (CheckStatus::Down, http_code, None, Some(truncate_error(&error)))
            }
        };

        Self {
            timestamp,
            target_url: target_url.into(),
            status,
            http_code,
            latency_ms,
            jobs_count,
            error,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn target_url(&self) -> &str {
        &self.target_url
    }

    pub fn status(&self) -> CheckStatus {
        self.status
    }

    pub fn is_up(&self) -> bool {
        self.status == CheckStatus::Up
    }

    pub fn http_code(&self) -> Option<u16> {
        self.http_code
    }

    pub fn latency_ms(&self) -> u64 {
        self.latency_ms
    }

    pub fn jobs_count(&self) -> Option<u64> {
        self.jobs_count
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Human-readable alert text for a failed check.
    pub fn alert_message(&self) -> String {
        let http = self.http_code.map(|c| c.to_string()).unwrap_or_default();
        format!(
            "🚨 Job API Monitor Alert\n\
             API: {}\n\
             Status: {}\n\
             HTTP: {}\n\
             Latency: {}ms\n\
             Error: {}",
            self.target_url,
            self.status,
            http,
            self.latency_ms,
            self.error.as_deref().unwrap_or_default(),
        )
    }
}

/// RFC 3339 with microseconds and a `+00:00` offset.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, false)
}

fn serialize_timestamp<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format_timestamp(ts))
}

/// Cap a failure description at [`MAX_ERROR_CHARS`] characters.
pub fn truncate_error(error: &str) -> String {
    match error.char_indices().nth(MAX_ERROR_CHARS) {
        Some((idx, _)) => error[..idx].to_string(),
        None => error.to_string(),
    }
}

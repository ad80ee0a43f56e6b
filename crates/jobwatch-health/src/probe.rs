//! Health probe logic.
//!
//! Performs one GET against the target API and classifies the result.
//! Every failure (transport, timeout, status, body) becomes a `Down`
//! outcome; nothing is returned as an error.

use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::debug;

use jobwatch_core::{Probe, ProbeOutcome};

use crate::client::{HttpClient, HttpResponse};

/// Probe `url` once with a fresh client.
pub async fn probe(url: &str, jobs_field: &str, timeout: Duration) -> Probe {
    let started = Instant::now();
    match HttpClient::new() {
        Ok(client) => probe_with(&client, url, jobs_field, timeout).await,
        Err(e) => {
            debug!(error = %e, "http client setup failed");
            Probe {
                outcome: ProbeOutcome::down(None, e.to_string()),
                latency: started.elapsed(),
            }
        }
    }
}

/// Probe `url` once using `client`.
///
/// Latency covers the request and, on a 200, parsing the body.
pub async fn probe_with(client: &HttpClient, url: &str, jobs_field: &str, timeout: Duration) -> Probe {
    let started = Instant::now();

    let outcome = match client.get(url, timeout).await {
        Ok(response) => classify(&response, jobs_field),
        Err(e) => {
            debug!(error = %e, %url, "health probe request failed");
            ProbeOutcome::down(None, e.to_string())
        }
    };

    Probe {
        outcome,
        latency: started.elapsed(),
    }
}

/// Classify a received response.
fn classify(response: &HttpResponse, jobs_field: &str) -> ProbeOutcome {
    if response.status != 200 {
        debug!(status = response.status, "health probe non-200");
        return ProbeOutcome::down(
            Some(response.status),
            format!("Non-200 status: {}", response.status),
        );
    }

    match count_jobs(&response.body, jobs_field) {
        Ok(jobs_count) => ProbeOutcome::Up {
            http_code: response.status,
            jobs_count,
        },
        Err(e) => {
            debug!(error = %e, "health probe body unreadable");
            ProbeOutcome::down(Some(response.status), e)
        }
    }
}

/// Count the entries of `field` in a JSON object body.
///
/// A missing or `null` field counts as zero jobs.
fn count_jobs(body: &[u8], field: &str) -> Result<u64, String> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| format!("invalid JSON body: {e}"))?;
    let object = value
        .as_object()
        .ok_or_else(|| format!("expected a JSON object, got {}", kind(&value)))?;

    match object.get(field) {
        None | Some(Value::Null) => Ok(0),
        Some(Value::Array(items)) => Ok(items.len() as u64),
        Some(other) => Err(format!(
            "field {field:?} is not an array (got {})",
            kind(other)
        )),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

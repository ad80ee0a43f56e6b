//! One check-log-alert cycle.
//!
//! Probe the target, append the result to the log, print it, and alert
//! on failure. Only a log write failure aborts the cycle.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{info, warn};

use jobwatch_core::{CheckResult, MonitorConfig};
use jobwatch_state::ResultRecorder;

/// Run one cycle, printing the result to stdout.
pub async fn run(config: &MonitorConfig) -> Result<CheckResult> {
    let mut stdout = std::io::stdout();
    check(config, &mut stdout).await
}

/// Run one cycle, printing the result to `out`.
pub async fn check<W: Write>(config: &MonitorConfig, out: &mut W) -> Result<CheckResult> {
    let timestamp = Utc::now();

    let probe = jobwatch_health::probe(&config.target_url, &config.jobs_field, config.timeout).await;
    let result = CheckResult::from_probe(timestamp, config.target_url.as_str(), probe);

    ResultRecorder::new(&config.log_path)
        .append(&result)
        .with_context(|| format!("recording check result to {}", config.log_path.display()))?;

    let dump = serde_json::to_string_pretty(&result).context("formatting check result")?;
    writeln!(out, "{dump}").context("printing check result")?;

    if result.is_up() {
        info!(
            url = %result.target_url(),
            latency_ms = result.latency_ms(),
            jobs = result.jobs_count().unwrap_or_default(),
            "target is up"
        );
    } else {
        warn!(
            url = %result.target_url(),
            http_code = ?result.http_code(),
            error = result.error().unwrap_or_default(),
            "target is down"
        );
        jobwatch_alert::dispatch(
            &result.alert_message(),
            config.webhook_url.as_deref(),
            config.timeout,
        )
        .await;
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::time::Duration;

    use jobwatch_core::CheckStatus;
    use jobwatch_health::client::test_server::*;

    fn config(target: String, log_path: &Path, webhook: Option<String>) -> MonitorConfig {
        MonitorConfig {
            target_url: target,
            webhook_url: webhook,
            timeout: Duration::from_secs(5),
            log_path: log_path.to_path_buf(),
            jobs_field: "data".to_string(),
        }
    }

    fn data_row(log_path: &Path) -> Vec<String> {
        let content = std::fs::read_to_string(log_path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        lines[1].split(',').map(str::to_string).collect()
    }

    #[tokio::test]
    async fn healthy_target_is_logged_up() {
        let (addr, _) = serve(vec![response("200 OK", r#"{"data": [1,2,3]}"#)]).await;
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("monitor_log.csv");
        let mut out = Vec::new();

        let result = check(&config(format!("http://{addr}/api"), &log, None), &mut out)
            .await
            .unwrap();
        assert_eq!(result.status(), CheckStatus::Up);

        let row = data_row(&log);
        assert_eq!(row[2], "UP");
        assert_eq!(row[3], "200");
        assert_eq!(row[5], "3");
        assert_eq!(row[6], "");

        let printed: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(printed["status"], "UP");
        assert_eq!(printed["jobs_count"], 3);
        assert!(printed["error"].is_null());
    }

    #[tokio::test]
    async fn unavailable_target_is_logged_down_and_alerted() {
        let (target, _) = serve(vec![response("503 Service Unavailable", "")]).await;
        let (hook, hook_requests) = serve(vec![response("204 No Content", "")]).await;
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("monitor_log.csv");
        let mut out = Vec::new();

        let cfg = config(
            format!("http://{target}/api"),
            &log,
            Some(format!("http://{hook}/hook")),
        );
        let result = check(&cfg, &mut out).await.unwrap();
        assert_eq!(result.status(), CheckStatus::Down);

        let row = data_row(&log);
        assert_eq!(row[2], "DOWN");
        assert_eq!(row[3], "503");
        assert_eq!(row[5], "");
        assert_eq!(row[6], "Non-200 status: 503");

        let requests = hook_requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].contains("Non-200 status: 503"));
        assert!(requests[0].contains("\"content\""));
    }

    #[tokio::test]
    async fn timed_out_target_is_logged_without_code() {
        let (addr, _) = serve_silent().await;
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("monitor_log.csv");
        let mut cfg = config(format!("http://{addr}/api"), &log, None);
        cfg.timeout = Duration::from_millis(150);

        let result = check(&cfg, &mut Vec::new()).await.unwrap();
        assert_eq!(result.http_code(), None);

        let row = data_row(&log);
        assert_eq!(row[2], "DOWN");
        assert_eq!(row[3], "");
        assert!(row[6].contains("timed out"));
    }

    #[tokio::test]
    async fn relative_redirect_to_healthy_target_is_logged_up() {
        let (addr, requests) = serve(vec![
            redirect("302 Found", "jobs"),
            response("200 OK", r#"{"data": [1,2]}"#),
        ])
        .await;
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("monitor_log.csv");

        let cfg = config(format!("http://{addr}/api/"), &log, None);
        let result = check(&cfg, &mut Vec::new()).await.unwrap();
        assert_eq!(result.status(), CheckStatus::Up);
        assert_eq!(requests.lock().unwrap().len(), 2);

        let row = data_row(&log);
        assert_eq!(row[1], format!("http://{addr}/api/"));
        assert_eq!(row[2], "UP");
        assert_eq!(row[5], "2");
    }

    #[tokio::test]
    async fn unreachable_webhook_does_not_fail_the_check() {
        let target = closed_addr().await;
        let hook = closed_addr().await;
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("monitor_log.csv");

        let cfg = config(
            format!("http://{target}/api"),
            &log,
            Some(format!("http://{hook}/hook")),
        );
        let result = check(&cfg, &mut Vec::new()).await.unwrap();
        assert_eq!(result.status(), CheckStatus::Down);
        assert!(log.exists());
    }

    #[tokio::test]
    async fn log_write_failure_aborts_before_alerting() {
        let (target, _) = serve(vec![response("500 Internal Server Error", "")]).await;
        let (hook, hook_requests) = serve(vec![response("200 OK", "")]).await;
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("no-such-dir").join("monitor_log.csv");
        let mut out = Vec::new();

        let cfg = config(
            format!("http://{target}/api"),
            &log,
            Some(format!("http://{hook}/hook")),
        );
        let err = check(&cfg, &mut out).await.unwrap_err();
        assert!(format!("{err:#}").contains("recording check result"));
        assert!(out.is_empty());
        assert!(hook_requests.lock().unwrap().is_empty());
    }
}

//! Monitor configuration.
//!
//! Resolved once at process start from (lowest precedence first) built-in
//! defaults, an optional `jobwatch.toml`, the process environment, and
//! command-line overrides. The resulting [`MonitorConfig`] is passed by
//! reference into every component.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ConfigError, ConfigResult};

pub const DEFAULT_TARGET_URL: &str = "https://www.arbeitnow.com/api/job-board-api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_LOG_PATH: &str = "monitor_log.csv";
pub const DEFAULT_JOBS_FIELD: &str = "data";

/// Environment variable names read by [`MonitorConfig::apply_env`].
pub const ENV_TARGET_URL: &str = "API_URL";
pub const ENV_WEBHOOK_URL: &str = "WEBHOOK_URL";
pub const ENV_TIMEOUT: &str = "TIMEOUT_SECONDS";
pub const ENV_LOG_FILE: &str = "LOG_FILE";
pub const ENV_JOBS_FIELD: &str = "JOBS_FIELD";

/// Fully resolved monitor configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    /// Endpoint probed with a single GET.
    pub target_url: String,
    /// Alert destination; `None` disables alerting.
    pub webhook_url: Option<String>,
    /// Bound on each outbound request.
    pub timeout: Duration,
    /// Append-only result log.
    pub log_path: PathBuf,
    /// Name of the JSON array counted on success.
    pub jobs_field: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            target_url: DEFAULT_TARGET_URL.to_string(),
            webhook_url: None,
            timeout: DEFAULT_TIMEOUT,
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
            jobs_field: DEFAULT_JOBS_FIELD.to_string(),
        }
    }
}

/// On-disk `jobwatch.toml` layout. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    pub target_url: Option<String>,
    pub webhook_url: Option<String>,
    /// Seconds (`10`, `2.5`) or a suffixed string (`"500ms"`).
    pub timeout: Option<toml::Value>,
    pub log_path: Option<PathBuf>,
    pub jobs_field: Option<String>,
}

/// Values supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub target_url: Option<String>,
    pub webhook_url: Option<String>,
    pub timeout: Option<String>,
    pub log_path: Option<PathBuf>,
    pub jobs_field: Option<String>,
}

impl ConfigFile {
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl MonitorConfig {
    /// Resolve the full configuration from all layers.
    pub fn resolve<F>(file: Option<&Path>, env: F, overrides: &Overrides) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(path) = file {
            config.apply_file(ConfigFile::from_file(path)?)?;
        }
        config.apply_env(env)?;
        config.apply_overrides(overrides)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve from the real process environment.
    pub fn from_process(file: Option<&Path>, overrides: &Overrides) -> ConfigResult<Self> {
        Self::resolve(file, |key| std::env::var(key).ok(), overrides)
    }

    fn apply_file(&mut self, file: ConfigFile) -> ConfigResult<()> {
        if let Some(url) = file.target_url {
            self.target_url = url;
        }
        if let Some(url) = file.webhook_url {
            self.webhook_url = non_empty(url);
        }
        if let Some(timeout) = file.timeout {
            self.timeout = match timeout {
                toml::Value::Integer(secs) => seconds_to_duration(secs as f64, &secs.to_string())?,
                toml::Value::Float(secs) => seconds_to_duration(secs, &secs.to_string())?,
                toml::Value::String(s) => parse_timeout(&s)?,
                other => return Err(ConfigError::InvalidTimeout(other.to_string())),
            };
        }
        if let Some(path) = file.log_path {
            self.log_path = path;
        }
        if let Some(field) = file.jobs_field {
            self.jobs_field = field;
        }
        Ok(())
    }

    /// Apply environment values looked up through `env`.
    pub fn apply_env<F>(&mut self, env: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = env(ENV_TARGET_URL) {
            self.target_url = url;
        }
        if let Some(url) = env(ENV_WEBHOOK_URL) {
            self.webhook_url = non_empty(url);
        }
        if let Some(timeout) = env(ENV_TIMEOUT) {
            self.timeout = parse_timeout(&timeout)?;
        }
        if let Some(path) = env(ENV_LOG_FILE) {
            self.log_path = PathBuf::from(path);
        }
        if let Some(field) = env(ENV_JOBS_FIELD) {
            self.jobs_field = field;
        }
        Ok(())
    }

    fn apply_overrides(&mut self, overrides: &Overrides) -> ConfigResult<()> {
        if let Some(url) = &overrides.target_url {
            self.target_url = url.clone();
        }
        if let Some(url) = &overrides.webhook_url {
            self.webhook_url = non_empty(url.clone());
        }
        if let Some(timeout) = &overrides.timeout {
            self.timeout = parse_timeout(timeout)?;
        }
        if let Some(path) = &overrides.log_path {
            self.log_path = path.clone();
        }
        if let Some(field) = &overrides.jobs_field {
            self.jobs_field = field.clone();
        }
        Ok(())
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.target_url.trim().is_empty() {
            return Err(ConfigError::EmptyTargetUrl);
        }
        if self.jobs_field.is_empty() {
            return Err(ConfigError::EmptyJobsField);
        }
        Ok(())
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() { None } else { Some(s) }
}

/// Parse a timeout like "10", "2.5", "10s", "500ms", "1m".
pub fn parse_timeout(s: &str) -> ConfigResult<Duration> {
    let trimmed = s.trim();
    let invalid = || ConfigError::InvalidTimeout(s.to_string());

    let (number, scale) = if let Some(ms) = trimmed.strip_suffix("ms") {
        (ms, 0.001)
    } else if let Some(secs) = trimmed.strip_suffix('s') {
        (secs, 1.0)
    } else if let Some(mins) = trimmed.strip_suffix('m') {
        (mins, 60.0)
    } else {
        (trimmed, 1.0)
    };

    let value: f64 = number.trim().parse().map_err(|_| invalid())?;
    seconds_to_duration(value * scale, s)
}

fn seconds_to_duration(secs: f64, raw: &str) -> ConfigResult<Duration> {
    if !secs.is_finite() || secs <= 0.0 {
        return Err(ConfigError::InvalidTimeout(raw.to_string()));
    }
    Duration::try_from_secs_f64(secs).map_err(|_| ConfigError::InvalidTimeout(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_any_input() {
        let config = MonitorConfig::resolve(None, env_of(&[]), &Overrides::default()).unwrap();
        assert_eq!(config.target_url, DEFAULT_TARGET_URL);
        assert_eq!(config.webhook_url, None);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.log_path, PathBuf::from("monitor_log.csv"));
        assert_eq!(config.jobs_field, "data");
    }

    #[test]
    fn env_overrides_defaults() {
        let env = env_of(&[
            ("API_URL", "http://localhost:9000/jobs"),
            ("WEBHOOK_URL", "http://hooks.test/x"),
            ("TIMEOUT_SECONDS", "2.5"),
        ]);
        let config = MonitorConfig::resolve(None, env, &Overrides::default()).unwrap();
        assert_eq!(config.target_url, "http://localhost:9000/jobs");
        assert_eq!(config.webhook_url.as_deref(), Some("http://hooks.test/x"));
        assert_eq!(config.timeout, Duration::from_millis(2500));
    }

    #[test]
    fn empty_webhook_disables_alerts() {
        let env = env_of(&[("WEBHOOK_URL", "")]);
        let config = MonitorConfig::resolve(None, env, &Overrides::default()).unwrap();
        assert_eq!(config.webhook_url, None);
    }

    #[test]
    fn overrides_beat_env_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobwatch.toml");
        std::fs::write(
            &path,
            "target_url = \"http://file.test\"\ntimeout = 3\nlog_path = \"file.csv\"\n",
        )
        .unwrap();

        let env = env_of(&[("API_URL", "http://env.test")]);
        let overrides = Overrides {
            timeout: Some("500ms".to_string()),
            ..Default::default()
        };
        let config = MonitorConfig::resolve(Some(&path), env, &overrides).unwrap();
        assert_eq!(config.target_url, "http://env.test");
        assert_eq!(config.timeout, Duration::from_millis(500));
        assert_eq!(config.log_path, PathBuf::from("file.csv"));
    }

    #[test]
    fn file_accepts_string_and_float_timeouts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobwatch.toml");

        std::fs::write(&path, "timeout = \"1m\"\n").unwrap();
        let config = MonitorConfig::resolve(Some(&path), env_of(&[]), &Overrides::default()).unwrap();
        assert_eq!(config.timeout, Duration::from_secs(60));

        std::fs::write(&path, "timeout = 0.25\n").unwrap();
        let config = MonitorConfig::resolve(Some(&path), env_of(&[]), &Overrides::default()).unwrap();
        assert_eq!(config.timeout, Duration::from_millis(250));
    }

    #[test]
    fn missing_file_is_an_error() {
        let result = MonitorConfig::resolve(
            Some(Path::new("/nonexistent/jobwatch.toml")),
            env_of(&[]),
            &Overrides::default(),
        );
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobwatch.toml");
        std::fs::write(&path, "target_url = [").unwrap();
        let result = MonitorConfig::resolve(Some(&path), env_of(&[]), &Overrides::default());
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn empty_target_url_is_rejected() {
        let env = env_of(&[("API_URL", "  ")]);
        let result = MonitorConfig::resolve(None, env, &Overrides::default());
        assert!(matches!(result, Err(ConfigError::EmptyTargetUrl)));
    }

    #[test]
    fn parse_timeout_plain_seconds() {
        assert_eq!(parse_timeout("10").unwrap(), Duration::from_secs(10));
        assert_eq!(parse_timeout("0.5").unwrap(), Duration::from_millis(500));
    }

    #[test]
    fn parse_timeout_suffixes() {
        assert_eq!(parse_timeout("5s").unwrap(), Duration::from_secs(5));
        assert_eq!(parse_timeout("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_timeout("2m").unwrap(), Duration::from_secs(120));
    }

    #[test]
    fn parse_timeout_rejects_bad_values() {
        for bad in ["0", "-1", "abc", "", "NaN", "inf", "10x"] {
            assert!(parse_timeout(bad).is_err(), "{bad:?} should be rejected");
        }
    }
}

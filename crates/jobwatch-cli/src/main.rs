use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use jobwatch_core::config::Overrides;
use jobwatch_core::MonitorConfig;

mod commands;

/// Check a job-board API once, append the outcome to the result log,
/// and alert a webhook if it is down.
///
/// Settings are read from (lowest precedence first) an optional TOML file,
/// the environment (API_URL, WEBHOOK_URL, TIMEOUT_SECONDS, LOG_FILE,
/// JOBS_FIELD), and the flags below.
#[derive(Parser)]
#[command(name = "jobwatch", version)]
struct Cli {
    /// Path to a jobwatch.toml config file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Target API URL to probe
    #[arg(short, long)]
    url: Option<String>,
    /// Webhook URL for failure alerts (empty disables alerts)
    #[arg(short, long)]
    webhook: Option<String>,
    /// Request timeout, e.g. 10, 2.5, 500ms
    #[arg(short, long)]
    timeout: Option<String>,
    /// CSV file results are appended to
    #[arg(short, long)]
    log_file: Option<PathBuf>,
    /// JSON array field counted as the job listing
    #[arg(long)]
    jobs_field: Option<String>,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            target_url: self.url.clone(),
            webhook_url: self.webhook.clone(),
            timeout: self.timeout.clone(),
            log_path: self.log_file.clone(),
            jobs_field: self.jobs_field.clone(),
        }
    }
}

const DEFAULT_LOG_FILTER: &str = "jobwatch=info";

/// `RUST_LOG` when it is set and valid, otherwise jobwatch at info.
fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .init();

    let cli = Cli::parse();

    let config = MonitorConfig::from_process(cli.config.as_deref(), &cli.overrides())
        .context("resolving configuration")?;

    commands::check::run(&config).await?;
    Ok(())
}

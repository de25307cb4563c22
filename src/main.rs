mod app;
mod config;
mod logging;
mod network;
mod portal;
mod probe;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::app::{Reconnector, RunOutcome};
use crate::config::Config;
use crate::network::Nmcli;
use crate::portal::ChromiumLauncher;
use crate::probe::HttpProbe;

#[derive(Parser)]
#[command(name = "meowifi")]
#[command(about = "Reconnect to the MEO WiFi hotspot and log in through its captive portal", long_about = None)]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long, env = "MEOWIFI_CONFIG", default_value = "config.yaml")]
    config: PathBuf,

    /// Directory for log files
    #[arg(long, env = "MEOWIFI_LOG_DIR", default_value = "./logs")]
    log_dir: String,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let _log_guards = match logging::init_logging(&cli.log_dir, "meowifi") {
        Ok(guards) => Some(guards),
        Err(e) => {
            logging::init_console_logging();
            tracing::warn!("File logging disabled: {}", e);
            None
        }
    };

    let config = Config::load(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))
        .inspect_err(|e| tracing::error!("{:#}", e))?;

    let probe = HttpProbe::from_config(&config.probe).context("Failed to create HTTP client")?;
    let manager = Nmcli::new(config.network.tool.clone());
    let launcher = ChromiumLauncher::from_config(&config.chromedriver);

    // A failed portal login still exits cleanly; only exhaustion is fatal.
    match Reconnector::new(&config, &probe, &manager, &launcher).run().await {
        RunOutcome::AlreadyOnline => Ok(ExitCode::SUCCESS),
        RunOutcome::LoggedIn(retry) | RunOutcome::LoginFailed(retry) => {
            tracing::debug!("Run finished after {} connect attempt(s)", retry.attempts);
            Ok(ExitCode::SUCCESS)
        }
        RunOutcome::Exhausted(_) => Ok(ExitCode::FAILURE),
    }
}

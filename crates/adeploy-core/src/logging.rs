//! Logging configuration using tracing

use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::{Result, ResultExt};

/// Environment variable controlling the log filter
pub const LOG_ENV_VAR: &str = "ADEPLOY_LOG";

/// Base name of the rolling log file
const LOG_FILE_PREFIX: &str = "adeploy.log";

/// Initialize the logging subsystem
///
/// Logs are written to `~/.local/share/adeploy/logs/` (platform equivalent).
/// Log level is controlled by `ADEPLOY_LOG` environment variable.
///
/// # Examples
/// ```bash
/// ADEPLOY_LOG=debug adeploy devices
/// ADEPLOY_LOG=trace adeploy connect 192.168.1.20 37099
/// ```
pub fn init() -> Result<()> {
    let log_dir = get_log_directory()?;
    std::fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, LOG_FILE_PREFIX);

    // Default to info for our crates, warn for everything else
    let env_filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| {
        EnvFilter::new("adeploy=info,adeploy_core=info,adeploy_adb=info,adeploy_app=info,warn")
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true)
                .with_timer(fmt::time::ChronoLocal::new(
                    "%Y-%m-%d %H:%M:%S%.3f".to_string(),
                )),
        )
        .init();

    tracing::info!("═══════════════════════════════════════════════════════");
    tracing::info!("adeploy starting");
    tracing::info!("Log directory: {}", log_dir.display());
    tracing::info!("═══════════════════════════════════════════════════════");

    Ok(())
}

/// Get the log directory path
fn get_log_directory() -> Result<PathBuf> {
    let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    Ok(base.join("adeploy").join("logs"))
}

/// Get the log file path for the current day
///
/// The daily appender suffixes the base name with the UTC date.
pub fn get_current_log_file() -> Result<PathBuf> {
    let dir = get_log_directory()?;
    Ok(dir.join(log_file_name(chrono::Utc::now().date_naive())))
}

fn log_file_name(date: chrono::NaiveDate) -> String {
    format!("{}.{}", LOG_FILE_PREFIX, date.format("%Y-%m-%d"))
}

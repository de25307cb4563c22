use std::path::Path;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Keeps the non-blocking writers alive. Dropping it flushes pending lines,
/// so hold it until the end of `main`.
pub struct LogGuards {
    _file: WorkerGuard,
    _stdout: WorkerGuard,
}

pub fn init_logging(log_dir: &str, service_name: &str) -> Result<LogGuards, anyhow::Error> {
    let _ = rotate_logs_on_startup(log_dir, service_name);
    std::fs::create_dir_all(log_dir)?;

    // One file per run; the previous run's file was renamed above.
    let file_appender = rolling::never(log_dir, format!("{service_name}.log"));
    let (non_blocking_file, file_guard) = non_blocking(file_appender);
    let (non_blocking_stdout, stdout_guard) = non_blocking(std::io::stdout());

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true);

    let console_layer = fmt::layer()
        .with_writer(non_blocking_stdout)
        .with_ansi(true)
        .with_target(false);

    // RUST_LOG overrides the default level
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()?;

    info!("Logging initialized - logs will be written to {log_dir}/{service_name}.log");

    Ok(LogGuards {
        _file: file_guard,
        _stdout: stdout_guard,
    })
}

/// Falls back to console-only output when the log directory is unusable.
pub fn init_console_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false))
        .try_init();
}

pub fn rotate_logs_on_startup(log_dir: &str, service_name: &str) -> Result<(), anyhow::Error> {
    let log_file = format!("{log_dir}/{service_name}.log");
    let log_path = Path::new(&log_file);

    if log_path.exists() {
        let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
        let backup_file = format!("{log_dir}/{service_name}.{timestamp}.log");
        std::fs::rename(&log_file, &backup_file)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_moves_previous_log_aside() {
        let dir = std::env::temp_dir().join(format!("meowifi-logs-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let dir_str = dir.to_str().unwrap();
        std::fs::write(dir.join("meowifi.log"), "old run\n").unwrap();

        rotate_logs_on_startup(dir_str, "meowifi").unwrap();

        assert!(!dir.join("meowifi.log").exists());
        let backups: Vec<_> = std::fs::read_dir(&dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with("meowifi.") && name != "meowifi.log")
            .collect();
        assert_eq!(backups.len(), 1);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn rotation_without_previous_log_is_a_no_op() {
        let dir = std::env::temp_dir().join(format!("meowifi-empty-logs-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        rotate_logs_on_startup(dir.to_str().unwrap(), "meowifi").unwrap();

        assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);
        std::fs::remove_dir_all(&dir).ok();
    }
}

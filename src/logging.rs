use std::fs::{self, OpenOptions};
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE: &str = "mlb-tui.log";
const DEFAULT_FILTER: &str = "info,mlb_tui=debug";

/// Sends tracing output to a daily rolling file under `log_dir`. The terminal
/// belongs to the UI, so there is no console layer.
///
/// Returns the appender guard; drop it only on exit so buffered lines are
/// flushed. Returns `None` when the directory is not writable.
pub fn init(log_dir: &Path) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    // `rolling::daily` panics if it cannot create the first file.
    if let Err(e) = check_writable(log_dir) {
        eprintln!(
            "Warning: Could not write to log directory {} ({e}), file logging disabled",
            log_dir.display()
        );
        return None;
    }

    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init();
    if installed.is_err() {
        return None;
    }
    Some(guard)
}

fn check_writable(dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dir)?;
    let probe = dir.join(".mlb_tui_write_test");
    OpenOptions::new().create(true).append(true).open(&probe)?;
    let _ = fs::remove_file(&probe);
    Ok(())
}

//! Photo Browser Logging & Observability
//!
//! Provides structured logging, panic handling, crash dumps, and deadlock detection.

mod logging;
mod panic_hook;

pub use logging::{cleanup_old_logs, cleanup_old_logs_in, init_logging, LogOptions};
pub use panic_hook::init_panic_hook;

use directories::ProjectDirs;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;

/// Get the log directory
pub fn log_dir() -> PathBuf {
    ProjectDirs::from("com", "PhotoBrowser", "PhotoBrowser")
        .map(|dirs| dirs.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"))
}

/// Keeps the background log writer alive. Dropping it flushes the file log.
pub struct LogGuard {
    _file: WorkerGuard,
}

/// Initialize all observability features with default options
pub fn init() -> anyhow::Result<LogGuard> {
    init_with(LogOptions::default())
}

pub fn init_with(options: LogOptions) -> anyhow::Result<LogGuard> {
    let file = init_logging(&options)?;
    init_panic_hook();

    #[cfg(debug_assertions)]
    init_deadlock_detector();

    Ok(LogGuard { _file: file })
}

#[cfg(debug_assertions)]
fn init_deadlock_detector() {
    use std::thread;
    use std::time::Duration;

    let spawned = thread::Builder::new()
        .name("deadlock-detector".into())
        .spawn(|| loop {
            thread::sleep(Duration::from_secs(10));
            let deadlocks = parking_lot::deadlock::check_deadlock();
            if deadlocks.is_empty() {
                continue;
            }
            tracing::error!("{} deadlock(s) detected", deadlocks.len());
            for (i, threads) in deadlocks.iter().enumerate() {
                for t in threads {
                    tracing::error!("Deadlock #{} thread {:?}\n{:?}", i, t.thread_id(), t.backtrace());
                }
            }
        });

    if let Err(e) = spawned {
        tracing::warn!("Deadlock detector not started: {}", e);
    }
}

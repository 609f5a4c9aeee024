//! Structured logging setup with tracing

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_PREFIX: &str = "photo_browser.log";

#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Defaults to [`crate::log_dir`]
    pub directory: Option<PathBuf>,
    /// Filter used when `RUST_LOG` is unset
    pub default_filter: String,
    /// Pretty console output; on by default in debug builds
    pub console: bool,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            directory: None,
            default_filter: "info".to_string(),
            console: cfg!(debug_assertions),
        }
    }
}

impl LogOptions {
    pub fn directory(&self) -> PathBuf {
        self.directory.clone().unwrap_or_else(super::log_dir)
    }
}

/// Install the global subscriber: JSON to a daily rolling file, plus a
/// pretty console layer when enabled
pub fn init_logging(options: &LogOptions) -> anyhow::Result<WorkerGuard> {
    let log_dir = options.directory();
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&options.default_filter));

    let console = options.console.then(|| fmt::layer().pretty());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console)
        .with(fmt::layer().json().with_writer(non_blocking))
        .try_init()?;

    tracing::info!("Logging initialized in {:?}", log_dir);
    Ok(guard)
}

/// Clean up log files older than specified days
pub fn cleanup_old_logs(days: u32) -> anyhow::Result<usize> {
    cleanup_old_logs_in(&super::log_dir(), days)
}

/// Delete `*.log*` files in `log_dir` last modified more than `days` ago
pub fn cleanup_old_logs_in(log_dir: &Path, days: u32) -> anyhow::Result<usize> {
    if !log_dir.exists() {
        return Ok(0);
    }

    let threshold = SystemTime::now() - Duration::from_secs(days as u64 * 24 * 60 * 60);
    let mut deleted = 0;

    for entry in std::fs::read_dir(log_dir)? {
        let entry = entry?;
        let path = entry.path();
        if !is_log_file(&path) {
            continue;
        }

        let modified = entry.metadata().and_then(|m| m.modified());
        match modified {
            Ok(modified) if modified < threshold => {
                if std::fs::remove_file(&path).is_ok() {
                    deleted += 1;
                    tracing::debug!("Deleted old log: {:?}", path);
                }
            }
            Ok(_) => {}
            Err(e) => tracing::debug!("Skipping {:?}: {}", path, e),
        }
    }

    tracing::info!("Cleaned up {} old log files", deleted);
    Ok(deleted)
}

/// Rolling files are named `photo_browser.log.YYYY-MM-DD`
fn is_log_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(LOG_FILE_PREFIX) || name.ends_with(".log"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_log_file() {
        assert!(is_log_file(Path::new("/logs/photo_browser.log.2024-05-01")));
        assert!(is_log_file(Path::new("/logs/other.log")));
        assert!(!is_log_file(Path::new("/logs/notes.txt")));
    }

    #[test]
    fn test_cleanup_keeps_recent_logs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("photo_browser.log.2024-05-01"), "{}").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "keep").unwrap();

        assert_eq!(cleanup_old_logs_in(dir.path(), 30).unwrap(), 0);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_cleanup_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(cleanup_old_logs_in(&dir.path().join("absent"), 7).unwrap(), 0);
    }

    #[test]
    fn test_default_options() {
        let options = LogOptions::default();
        assert_eq!(options.default_filter, "info");
        assert_eq!(options.directory(), crate::log_dir());
    }
}

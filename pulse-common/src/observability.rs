//! Logging setup shared by the binary and integration tests.
//!
//! One rolling daily file sink, optionally mirrored to stderr. Call
//! [`init_logging`] once near process start; repeat calls are no-ops that
//! hand back the path the first call resolved.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Context;
use chrono::Local;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();
static LOG_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Configuration passed to [`init_logging`].
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Logical name of the component; becomes the log file prefix.
    pub app_name: &'static str,
    /// Explicit log directory. `None` consults `PULSE_LOG_DIR`, then falls
    /// back to `~/.local/share/<app_name>`.
    pub log_dir: Option<PathBuf>,
    /// Mirror events to stderr in addition to the file sink.
    pub emit_stderr: bool,
    /// Filter applied when `RUST_LOG` is unset.
    pub default_filter: &'static str,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            app_name: "pulse",
            log_dir: None,
            emit_stderr: false,
            default_filter: "info",
        }
    }
}

/// Initialise the global `tracing` subscriber and return the log file path
/// for the current day.
pub fn init_logging(config: LogConfig) -> anyhow::Result<PathBuf> {
    if let Some(path) = LOG_PATH.get() {
        return Ok(path.clone());
    }

    let dir = resolve_log_dir(
        config.app_name,
        config.log_dir.as_deref(),
        std::env::var("PULSE_LOG_DIR").ok().as_deref(),
        std::env::var("HOME").ok().as_deref(),
    );
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create log directory: {}", dir.display()))?;

    let filename = format!("{}.log", config.app_name);
    let today = Local::now().format("%Y-%m-%d");
    let full_path = dir.join(format!("{filename}.{today}"));

    let (writer, guard) = tracing_appender::non_blocking(rolling::daily(&dir, &filename));
    let _ = LOG_GUARD.set(guard);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_filter));
    let file_layer = fmt::layer().with_writer(writer).with_ansi(false);
    let stderr_layer = config
        .emit_stderr
        .then(|| fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("tracing setup failed: {e}"))?;

    let _ = LOG_PATH.set(full_path.clone());
    Ok(full_path)
}

/// Pick the log directory: explicit config wins, then the `PULSE_LOG_DIR`
/// environment variable, then a per-user data directory.
fn resolve_log_dir(
    app_name: &str,
    explicit: Option<&Path>,
    env_dir: Option<&str>,
    home: Option<&str>,
) -> PathBuf {
    let chosen = explicit
        .map(Path::to_path_buf)
        .or_else(|| env_dir.map(PathBuf::from));

    match (chosen, home) {
        (Some(dir), home) => expand_home(&dir, home),
        (None, Some(home)) => Path::new(home).join(".local/share").join(app_name),
        (None, None) => Path::new(".").join("logs").join(app_name),
    }
}

fn expand_home(path: &Path, home: Option<&str>) -> PathBuf {
    match (path.to_str().and_then(|s| s.strip_prefix("~/")), home) {
        (Some(rest), Some(home)) => Path::new(home).join(rest),
        _ => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_dir_wins_over_env_dir() {
        let dir = resolve_log_dir(
            "pulse",
            Some(Path::new("/var/log/pulse")),
            Some("/tmp/env-logs"),
            Some("/home/me"),
        );
        assert_eq!(dir, PathBuf::from("/var/log/pulse"));
    }

    #[test]
    fn env_dir_is_used_when_config_gives_none() {
        let dir = resolve_log_dir("pulse", None, Some("/tmp/env-logs"), Some("/home/me"));
        assert_eq!(dir, PathBuf::from("/tmp/env-logs"));
    }

    #[test]
    fn tilde_prefix_expands_against_home() {
        let dir = resolve_log_dir("pulse", Some(Path::new("~/logs")), None, Some("/home/me"));
        assert_eq!(dir, PathBuf::from("/home/me/logs"));

        // Without a home dir the path passes through untouched.
        let dir = resolve_log_dir("pulse", Some(Path::new("~/logs")), None, None);
        assert_eq!(dir, PathBuf::from("~/logs"));
    }

    #[test]
    fn default_is_per_user_data_dir_or_local_logs() {
        let dir = resolve_log_dir("pulse", None, None, Some("/home/me"));
        assert_eq!(dir, PathBuf::from("/home/me/.local/share/pulse"));

        let dir = resolve_log_dir("pulse", None, None, None);
        assert_eq!(dir, PathBuf::from("./logs/pulse"));
    }
}

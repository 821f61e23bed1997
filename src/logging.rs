//! Tracing setup: a compact stdout layer plus a non-blocking file layer.
//!
//! The file path comes from [`Config::log_file`] (`DOCUMIND_LOG_FILE`, default
//! `logs/documind.log`). Its parent directory is created on demand and the file is appended to.
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing_appender::{
    non_blocking::{NonBlocking, WorkerGuard},
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::Config;

const DEFAULT_FILTER: &str = "info,tower_http=debug";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Install the global subscriber.
///
/// `RUST_LOG` overrides the default filter. When the log file cannot be opened the service keeps
/// logging to stdout only.
pub fn init_tracing(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let stdout_layer = fmt::layer().with_target(false).compact();
    let file_layer = file_writer(&config.log_file).map(|writer| {
        fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_ansi(false)
            .compact()
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();
}

/// Directory and file name a log path resolves to.
#[derive(Debug, PartialEq, Eq)]
struct LogTarget {
    directory: PathBuf,
    file_name: String,
}

/// Split a configured log path into its directory and file name.
///
/// Bare file names land in the working directory. Paths without a UTF-8 file name yield `None`.
fn log_target(path: &str) -> Option<LogTarget> {
    let path = Path::new(path);
    let file_name = path.file_name()?.to_str()?.to_string();
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Some(LogTarget {
        directory,
        file_name,
    })
}

fn file_writer(path: &str) -> Option<NonBlocking> {
    let Some(target) = log_target(path) else {
        eprintln!("Log file path {path:?} has no file name; file logging disabled");
        return None;
    };
    if let Err(err) = std::fs::create_dir_all(&target.directory) {
        eprintln!(
            "Failed to create log directory {}: {err}",
            target.directory.display()
        );
        return None;
    }

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(target.file_name)
        .build(&target.directory);
    match appender {
        Ok(appender) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let _ = LOG_GUARD.set(guard);
            Some(non_blocking)
        }
        Err(err) => {
            eprintln!("Failed to open log file {path}: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_LOG_FILE;

    #[test]
    fn default_path_targets_logs_directory() {
        assert_eq!(
            log_target(DEFAULT_LOG_FILE),
            Some(LogTarget {
                directory: PathBuf::from("logs"),
                file_name: "documind.log".into(),
            })
        );
    }

    #[test]
    fn bare_file_name_targets_working_directory() {
        let target = log_target("service.log").expect("target");
        assert_eq!(target.directory, PathBuf::from("."));
        assert_eq!(target.file_name, "service.log");
    }

    #[test]
    fn nested_absolute_path_keeps_parent() {
        let target = log_target("/var/log/documind/server.log").expect("target");
        assert_eq!(target.directory, PathBuf::from("/var/log/documind"));
        assert_eq!(target.file_name, "server.log");
    }

    #[test]
    fn path_without_file_name_is_rejected() {
        assert_eq!(log_target(""), None);
        assert_eq!(log_target("logs/.."), None);
    }
}

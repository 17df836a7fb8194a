//! Logging bootstrap: `env_logger` on stderr, or size-rotated files via `flexi_logger`.

use crate::config::{LogConfig, LogType};
use crate::utils::AppError;
use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use std::path::Path;

/// Keeps the file logger alive; drop it only at shutdown.
pub struct LoggingGuard {
    _handle: Option<LoggerHandle>,
}

pub fn init_logging(config: &LogConfig) -> Result<LoggingGuard, AppError> {
    match config.log_type {
        LogType::Stream => {
            env_logger::Builder::new()
                .parse_filters(&config.level)
                .try_init()
                .map_err(|e| AppError::Configuration(format!("logger already initialized: {}", e)))?;
            Ok(LoggingGuard { _handle: None })
        }
        LogType::File => {
            std::fs::create_dir_all(&config.dir).map_err(|e| {
                AppError::Configuration(format!(
                    "failed to create log directory `{}`: {}",
                    config.dir.display(),
                    e
                ))
            })?;

            let (basename, suffix) = split_log_name(&config.app_log_name);

            let handle = Logger::try_with_str(&config.level)
                .map_err(|e| AppError::Configuration(format!("invalid log level `{}`: {}", config.level, e)))?
                .log_to_file(
                    FileSpec::default()
                        .directory(config.dir.as_path())
                        .basename(basename)
                        .suffix(suffix),
                )
                .rotate(
                    Criterion::Size(config.max_bytes),
                    Naming::Numbers,
                    Cleanup::KeepLogFiles(config.copies),
                )
                .write_mode(WriteMode::BufferAndFlush)
                .append()
                .format_for_files(flexi_logger::detailed_format)
                .start()
                .map_err(|e| AppError::Configuration(format!("failed to start logger: {}", e)))?;

            Ok(LoggingGuard {
                _handle: Some(handle),
            })
        }
    }
}

/// `app.log` -> (`app`, `log`).
fn split_log_name(name: &str) -> (String, String) {
    let path = Path::new(name);
    let basename = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "app".to_string());
    let suffix = path
        .extension()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "log".to_string());
    (basename, suffix)
}

#![deny(missing_docs)]
//! Shared logging utilities for the page recall workspace.
//!
//! This crate provides the `recall_*` logging macros used across the codebase,
//! an initializer for host programs that embed the coordinator, and a minimal
//! test initializer for the global logger.

use std::fs::File;
use std::path::{Path, PathBuf};

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! recall_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! recall_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! recall_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! recall_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! recall_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Destination for log output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogDestination {
    /// Write to the given file, truncating it.
    File(PathBuf),
    /// Write to the terminal (stdout/stderr, mixed).
    Terminal,
    /// Write to the terminal and to the given file.
    Both(PathBuf),
}

/// Errors raised while installing the global logger.
#[derive(Debug, thiserror::Error)]
pub enum LogInitError {
    /// The log file could not be created.
    #[error("could not create log file at {path:?}: {source}")]
    File {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// A global logger is already installed.
    #[error("logger already initialized: {0}")]
    AlreadySet(#[from] log::SetLoggerError),
}

/// Initializes the global logger for `destination` at `level`.
///
/// Host programs call this once at startup, before spawning the coordinator.
/// Library code never does.
///
/// ```no_run
/// use log::LevelFilter;
/// use recall_logging::{initialize, LogDestination};
///
/// initialize(LogDestination::Both("recall.log".into()), LevelFilter::Info)?;
/// # Ok::<(), recall_logging::LogInitError>(())
/// ```
pub fn initialize(destination: LogDestination, level: LevelFilter) -> Result<(), LogInitError> {
    let config = build_config();

    let loggers: Vec<Box<dyn SharedLogger>> = match destination {
        LogDestination::File(path) => vec![create_file_logger(&path, level, config)?],
        LogDestination::Terminal => vec![TermLogger::new(
            level,
            config,
            TerminalMode::Mixed,
            ColorChoice::Auto,
        )],
        LogDestination::Both(path) => {
            let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
                level,
                config.clone(),
                TerminalMode::Mixed,
                ColorChoice::Auto,
            )];
            loggers.push(create_file_logger(&path, level, config)?);
            loggers
        }
    };

    CombinedLogger::init(loggers)?;
    Ok(())
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}

fn create_file_logger(
    path: &Path,
    level: LevelFilter,
    config: Config,
) -> Result<Box<WriteLogger<File>>, LogInitError> {
    let file = File::create(path).map_err(|source| LogInitError::File {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(WriteLogger::new(level, config, file))
}

#![forbid(unsafe_code)]

//! Day-file logging for a single process.
//!
//! This crate provides:
//! - Log directory and `YYYY-MM-DD.log` file resolution
//! - A mutex-serialized writer with severity levels
//! - printf-style templates with inline color tokens
//! - Optional call stack blocks on records
//! - Configuration loading

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod format;
pub mod level;
pub mod logger;
pub mod paths;
pub mod stack;

// Re-export commonly used types
pub use config::{Config, LoggingConfig};
pub use error::{Error, Result};
pub use format::ColorMode;
pub use level::Level;
pub use logger::{Logger, LoggerConfig};
pub use paths::{
    list_log_files, read_log_file, resolve_log_directory, resolve_path, today_file_name, LogDir,
};

/// Write a record through a [`Logger`] without spelling out the argument slice.
///
/// ```no_run
/// use daylog_core::{logf, Level, Logger};
///
/// let logger = Logger::init()?;
/// logf!(logger, Level::Error, "value=%d from %s", 42, "worker")?;
/// # Ok::<(), daylog_core::Error>(())
/// ```
///
/// Evaluates to the `Result` of the write.
#[macro_export]
macro_rules! logf {
    ($logger:expr, $level:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $logger.logf(
            $level,
            $template,
            &[$(&$arg as &dyn ::std::fmt::Display),*],
        )
    };
}

/// Like [`logf!`], with a stack block appended to the record
#[macro_export]
macro_rules! logf_stack {
    ($logger:expr, $level:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $logger.logf_stack(
            $level,
            $template,
            &[$(&$arg as &dyn ::std::fmt::Display),*],
        )
    };
}

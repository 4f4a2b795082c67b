//! The serialized day-log writer.
//!
//! A [`Logger`] owns today's log file and one mutex. Formatting and the
//! append both happen while the mutex is held, so concurrent callers in the
//! same process always produce whole, non-interleaved records.
//!
//! The target file is chosen when the logger is opened and is not changed
//! when the date rolls over. Call [`Logger::reopen`] to move to the current
//! day's file.

use crate::config::{Config, LoggingConfig};
use crate::format::{format_line, format_message, ColorMode};
use crate::paths::LogDir;
use crate::stack::{StackSnapshot, STACK_FRAMES_TO_SKIP};
use crate::{Level, Result};
use chrono::Local;
use std::fmt::Display;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Settings bound to a logger when it is opened
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoggerConfig {
    /// Records below this level are dropped
    pub threshold: Level,
    pub color: ColorMode,
    /// Leading frames removed from stack blocks
    pub stack_skip: usize,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            threshold: Level::Info,
            color: ColorMode::default(),
            stack_skip: STACK_FRAMES_TO_SKIP,
        }
    }
}

impl From<&LoggingConfig> for LoggerConfig {
    fn from(config: &LoggingConfig) -> Self {
        Self {
            threshold: config.level,
            color: config.color_mode(),
            stack_skip: config.stack_skip,
        }
    }
}

/// An append-mode handle on one day's file
struct DayFile {
    path: PathBuf,
    file: File,
}

impl DayFile {
    fn open(path: PathBuf) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        tracing::debug!("Opened log file {:?}", path);
        Ok(Self { path, file })
    }

    fn append(&mut self, line: &str) -> Result<()> {
        self.file.write_all(line.as_bytes())?;
        self.file.flush()?;
        Ok(())
    }
}

/// Everything the lock guards
struct Shared {
    target: DayFile,
    stack_armed: bool,
}

/// Process-local writer for day logs.
///
/// Construct one per application and pass it (or an `Arc` of it) to
/// whatever needs to log.
pub struct Logger {
    dir: LogDir,
    config: LoggerConfig,
    shared: Mutex<Shared>,
}

macro_rules! level_methods {
    ($($level:ident => $plain:ident, $stacked:ident;)*) => {
        $(
            #[doc = concat!("Write a `", stringify!($level), "` record")]
            pub fn $plain(&self, template: &str, args: &[&dyn Display]) -> Result<()> {
                self.write(false, Level::$level, template, args)
            }

            #[doc = concat!("Write a `", stringify!($level), "` record followed by a stack block")]
            pub fn $stacked(&self, template: &str, args: &[&dyn Display]) -> Result<()> {
                self.write(true, Level::$level, template, args)
            }
        )*
    };
}

impl Logger {
    /// Open today's file in `<cwd>/logs` with default settings
    pub fn init() -> Result<Self> {
        Self::open(LogDir::resolve()?, LoggerConfig::default())
    }

    /// Open today's file according to `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        let dir = config.logging.log_dir()?;
        Self::open(dir, LoggerConfig::from(&config.logging))
    }

    /// Open today's file in `dir`, appending to it if it already exists
    pub fn open(dir: LogDir, config: LoggerConfig) -> Result<Self> {
        let target = DayFile::open(dir.today_path())?;
        tracing::info!(
            "Logging to {:?} at level {}",
            target.path,
            config.threshold
        );
        Ok(Self {
            dir,
            config,
            shared: Mutex::new(Shared {
                target,
                stack_armed: false,
            }),
        })
    }

    pub fn log_dir(&self) -> &LogDir {
        &self.dir
    }

    pub fn threshold(&self) -> Level {
        self.config.threshold
    }

    /// Path of the file currently written to
    pub fn path(&self) -> PathBuf {
        self.lock().target.path.clone()
    }

    /// Switch to the current day's file.
    ///
    /// Returns the path now being written. Records already in flight finish
    /// in the previous file.
    pub fn reopen(&self) -> Result<PathBuf> {
        let path = self.dir.today_path();
        let mut shared = self.lock();
        if shared.target.path != path {
            shared.target = DayFile::open(path.clone())?;
            tracing::info!("Switched log file to {:?}", path);
        }
        Ok(path)
    }

    /// Include a stack block in the next record, whichever call writes it
    pub fn show_stack_next(&self) {
        self.lock().stack_armed = true;
    }

    /// Write a record at `level`
    pub fn logf(&self, level: Level, template: &str, args: &[&dyn Display]) -> Result<()> {
        self.write(false, level, template, args)
    }

    /// Write a record at `level` followed by a stack block
    pub fn logf_stack(&self, level: Level, template: &str, args: &[&dyn Display]) -> Result<()> {
        self.write(true, level, template, args)
    }

    level_methods! {
        NotSet => notsetf, notsetf_stack;
        Debug => debugf, debugf_stack;
        Info => infof, infof_stack;
        Warning => warningf, warningf_stack;
        Error => errorf, errorf_stack;
        Critical => criticalf, criticalf_stack;
        Fatal => fatalf, fatalf_stack;
    }

    /// Write a `Warning` record
    pub fn warnf(&self, template: &str, args: &[&dyn Display]) -> Result<()> {
        self.write(false, Level::Warning, template, args)
    }

    /// Write a `Warning` record followed by a stack block
    pub fn warnf_stack(&self, template: &str, args: &[&dyn Display]) -> Result<()> {
        self.write(true, Level::Warning, template, args)
    }

    /// `[<prefix> ERROR] <msg>` at `Error`
    pub fn log_prefixed_error(&self, prefix: &str, msg: &str) -> Result<()> {
        self.errorf("[%s ERROR] %s", &[&prefix, &msg])
    }

    /// `[<prefix> SUCCESS] <msg>` at `Info`
    pub fn log_prefixed_success(&self, prefix: &str, msg: &str) -> Result<()> {
        self.infof("[%s SUCCESS] %s", &[&prefix, &msg])
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        // Records are appended whole, so a panicking holder leaves nothing half-written
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(
        &self,
        with_stack: bool,
        level: Level,
        template: &str,
        args: &[&dyn Display],
    ) -> Result<()> {
        let mut shared = self.lock();
        let armed = std::mem::take(&mut shared.stack_armed);
        if level < self.config.threshold {
            return Ok(());
        }

        let stack = if with_stack || armed {
            Some(
                StackSnapshot::capture()
                    .skip_leading(self.config.stack_skip)
                    .to_string(),
            )
        } else {
            None
        };
        let message = format_message(template, args, stack.as_deref(), self.config.color);
        let line = format_line(level, &Local::now(), &message);
        shared.target.append(&line)
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("dir", &self.dir)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Convenience for call sites that only hold a directory path
pub fn open_in(base: impl AsRef<Path>) -> Result<Logger> {
    Logger::open(LogDir::resolve_in(base)?, LoggerConfig::default())
}

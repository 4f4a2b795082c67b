//! Log directory and day-file resolution.
//!
//! One file per local calendar day, named `YYYY-MM-DD.log`, inside a `logs`
//! directory under a base directory (the process working directory unless
//! told otherwise).

use crate::{Error, Result};
use chrono::{Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs::DirBuilder;
use std::path::{Component, Path, PathBuf};

/// Extension of every day log
pub const LOG_FILE_EXTENSION: &str = ".log";

/// Default name of the directory holding day logs
pub const LOG_DIR_NAME: &str = "logs";

static LOG_FILE_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}\.log$").expect("log file name regex"));

/// True if `name` has the shape of a day log file name.
///
/// Only the shape is checked: `2016-13-40.log` matches.
pub fn is_log_file_name(name: &str) -> bool {
    LOG_FILE_NAME_RE.is_match(name)
}

/// Day log file name for `date`
pub fn file_name_for(date: NaiveDate) -> String {
    format!("{}{}", date.format("%Y-%m-%d"), LOG_FILE_EXTENSION)
}

/// Day log file name for the current local date
pub fn today_file_name() -> String {
    file_name_for(Local::now().date_naive())
}

/// A resolved log directory that is known to exist.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogDir {
    root: PathBuf,
}

impl LogDir {
    /// `<cwd>/logs`, created if missing
    pub fn resolve() -> Result<Self> {
        let cwd = std::env::current_dir()?;
        Self::resolve_in(cwd)
    }

    /// `<base>/logs`, created if missing
    pub fn resolve_in(base: impl AsRef<Path>) -> Result<Self> {
        Self::resolve_named(base, LOG_DIR_NAME)
    }

    /// `<base>/<dir_name>`, created (with parents) if missing.
    ///
    /// New directories are owner-only (0700) on unix. Calling this on an
    /// existing directory is a no-op.
    pub fn resolve_named(base: impl AsRef<Path>, dir_name: &str) -> Result<Self> {
        let root = base.as_ref().join(dir_name);
        if !root.is_dir() {
            let mut builder = DirBuilder::new();
            builder.recursive(true);
            #[cfg(unix)]
            {
                use std::os::unix::fs::DirBuilderExt;
                builder.mode(0o700);
            }
            builder.create(&root)?;
            tracing::debug!("Created log directory {:?}", root);
        }
        Ok(Self { root })
    }

    /// Path of the directory itself
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Path of the named log file inside this directory.
    ///
    /// The name must be a single plain file name.
    pub fn path_for(&self, name: &str) -> Result<PathBuf> {
        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(self.root.join(name)),
            _ => Err(Error::InvalidName(name.to_string())),
        }
    }

    /// Path of today's log file
    pub fn today_path(&self) -> PathBuf {
        self.root.join(today_file_name())
    }

    /// Names of day logs in `<dir>/<subdirectory>`, in directory order.
    ///
    /// Entries whose names do not look like day logs are skipped. The
    /// subdirectory must stay inside this directory (`""` is the directory
    /// itself).
    pub fn list(&self, subdirectory: impl AsRef<Path>) -> Result<Vec<String>> {
        let subdirectory = subdirectory.as_ref();
        let inside = subdirectory
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !inside {
            return Err(Error::InvalidName(subdirectory.display().to_string()));
        }
        let dir = self.root.join(subdirectory);
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(_) => continue,
            };
            if is_log_file_name(&name) {
                names.push(name);
            }
        }
        tracing::debug!("Found {} log files in {:?}", names.len(), dir);
        Ok(names)
    }

    /// Full text of the named log file
    pub fn read(&self, name: &str) -> Result<String> {
        let path = self.path_for(name)?;
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::NotFound {
                name: name.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }
}

/// `<cwd>/logs`, created if missing
pub fn resolve_log_directory() -> Result<PathBuf> {
    Ok(LogDir::resolve()?.root)
}

/// Path of `name` inside `<cwd>/logs`
pub fn resolve_path(name: &str) -> Result<PathBuf> {
    LogDir::resolve()?.path_for(name)
}

/// Day log names in `<cwd>/logs/<subdirectory>`
pub fn list_log_files(subdirectory: impl AsRef<Path>) -> Result<Vec<String>> {
    LogDir::resolve()?.list(subdirectory)
}

/// Contents of `<cwd>/logs/<name>`
pub fn read_log_file(name: &str) -> Result<String> {
    LogDir::resolve()?.read(name)
}

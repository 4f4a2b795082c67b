//! Configuration file support for daylog.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/daylog/config.toml`.

use crate::format::ColorMode;
use crate::paths::{LogDir, LOG_DIR_NAME};
use crate::stack::STACK_FRAMES_TO_SKIP;
use crate::{Error, Level, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where and how day logs are written
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Directory holding the log directory; the working directory if unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_dir: Option<PathBuf>,

    #[serde(default = "default_dir_name")]
    pub dir_name: String,

    /// Minimum level physically written
    #[serde(default)]
    pub level: Level,

    /// Emit ANSI escapes for color tokens instead of stripping them
    #[serde(default)]
    pub ansi: bool,

    #[serde(default = "default_stack_skip")]
    pub stack_skip: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            base_dir: None,
            dir_name: default_dir_name(),
            level: Level::default(),
            ansi: false,
            stack_skip: default_stack_skip(),
        }
    }
}

fn default_dir_name() -> String {
    LOG_DIR_NAME.into()
}

fn default_stack_skip() -> usize {
    STACK_FRAMES_TO_SKIP
}

impl LoggingConfig {
    pub fn color_mode(&self) -> ColorMode {
        ColorMode::from_ansi(self.ansi)
    }

    /// Resolve (and create) the configured log directory
    pub fn log_dir(&self) -> Result<LogDir> {
        if self.dir_name.is_empty() {
            return Err(Error::Config("dir_name must not be empty".into()));
        }
        let base = match &self.base_dir {
            Some(base) => base.clone(),
            None => std::env::current_dir()?,
        };
        LogDir::resolve_named(base, &self.dir_name)
    }
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> Result<PathBuf> {
        let base = dirs::config_dir()
            .ok_or_else(|| Error::Config("Unable to determine config directory".into()))?;
        Ok(base.join("daylog").join("config.toml"))
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path()?;
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.logging.dir_name, "logs");
        assert_eq!(config.logging.level, Level::Info);
        assert_eq!(config.logging.stack_skip, 3);
        assert_eq!(config.logging.color_mode(), ColorMode::Strip);
        assert!(config.logging.base_dir.is_none());
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[logging]
level = "warn"
ansi = true
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.logging.level, Level::Warning);
        assert_eq!(config.logging.color_mode(), ColorMode::Ansi);
        assert_eq!(config.logging.dir_name, "logs"); // default
    }

    #[test]
    fn test_unknown_level_is_rejected() {
        let toml_str = r#"
[logging]
level = "loud"
"#;
        assert!(toml::from_str::<Config>(toml_str).is_err());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.logging.base_dir = Some(temp_dir.path().to_path_buf());
        config.logging.level = Level::Debug;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.logging.base_dir, config.logging.base_dir);
        assert_eq!(loaded.logging.level, Level::Debug);
    }

    #[test]
    fn test_log_dir_uses_base_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let logging = LoggingConfig {
            base_dir: Some(temp_dir.path().to_path_buf()),
            dir_name: "app-logs".into(),
            ..LoggingConfig::default()
        };

        let dir = logging.log_dir().unwrap();
        assert_eq!(dir.path(), temp_dir.path().join("app-logs"));
        assert!(dir.path().is_dir());
    }

    #[test]
    fn test_empty_dir_name_is_rejected() {
        let logging = LoggingConfig {
            dir_name: String::new(),
            ..LoggingConfig::default()
        };
        assert!(matches!(logging.log_dir(), Err(Error::Config(_))));
    }
}

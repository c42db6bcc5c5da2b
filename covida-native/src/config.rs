//! Bridge configuration types
//!
//! The bridge runs inside a JVM it does not control, so its configuration
//! comes from a TOML file named by the `COVIDA_NATIVE_CONFIG` environment
//! variable. Every field has a default; an absent file means "print to stdout".

use crate::types::{CoordinateSpace, Result};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming the bridge configuration file
pub const CONFIG_ENV_VAR: &str = "COVIDA_NATIVE_CONFIG";

/// Configuration for the native bridge
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Log level used when the bridge installs its own logger
    #[serde(default)]
    pub log_level: LogLevel,

    /// Coordinate convention the host uses for strokes and geometry
    #[serde(default)]
    pub coordinate_space: CoordinateSpace,

    /// Where the reference sink reports notifications
    #[serde(default)]
    pub output: OutputConfig,

    /// Optional native plugin replacing the reference sink
    #[serde(default)]
    pub plugin: PluginConfig,
}

/// Log level names accepted in the config file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub target: OutputTarget,
}

/// Destination of the reference sink's lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputTarget {
    /// One line per notification on standard output
    #[default]
    Stdout,
    /// One `info` record per notification through the `log` facade
    Log,
    /// Discard notifications (bookkeeping still runs)
    #[serde(rename = "none")]
    Discard,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Path of a shared library exporting `covida_plugin_callbacks`
    pub library: Option<PathBuf>,
}

impl BridgeConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        log::debug!("Loading bridge config: {:?}", path);
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load the configuration named by `COVIDA_NATIVE_CONFIG`, or the defaults
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::load(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    /// Builder method: set the coordinate convention
    pub fn with_coordinate_space(mut self, space: CoordinateSpace) -> Self {
        self.coordinate_space = space;
        self
    }

    /// Builder method: set the reference sink's output target
    pub fn with_output(mut self, target: OutputTarget) -> Self {
        self.output.target = target;
        self
    }

    /// Builder method: forward notifications to a native plugin
    pub fn with_plugin(mut self, library: impl Into<PathBuf>) -> Self {
        self.plugin.library = Some(library.into());
        self
    }

    /// Builder method: set the log level
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::from_toml("").unwrap();

        assert_eq!(config, BridgeConfig::new());
        assert_eq!(config.output.target, OutputTarget::Stdout);
        assert_eq!(config.coordinate_space, CoordinateSpace::Absolute);
        assert!(config.plugin.library.is_none());
    }

    #[test]
    fn test_config_deserialization() {
        let toml_content = r#"
            log_level = "debug"
            coordinate_space = "relative"

            [output]
            target = "log"

            [plugin]
            library = "/opt/covida/libstrokes.so"
        "#;

        let config = BridgeConfig::from_toml(toml_content).unwrap();
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.coordinate_space, CoordinateSpace::Relative);
        assert_eq!(config.output.target, OutputTarget::Log);
        assert_eq!(
            config.plugin.library,
            Some(PathBuf::from("/opt/covida/libstrokes.so"))
        );
    }

    #[test]
    fn test_invalid_target_is_rejected() {
        let result = BridgeConfig::from_toml("[output]\ntarget = \"printer\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[output]\ntarget = \"none\"").unwrap();

        let config = BridgeConfig::load(file.path()).unwrap();
        assert_eq!(config.output.target, OutputTarget::Discard);
    }

    #[test]
    fn test_builder() {
        let config = BridgeConfig::new()
            .with_coordinate_space(CoordinateSpace::Relative)
            .with_output(OutputTarget::Log)
            .with_log_level(LogLevel::Warn)
            .with_plugin("libstrokes.so");

        assert_eq!(config.coordinate_space, CoordinateSpace::Relative);
        assert_eq!(config.output.target, OutputTarget::Log);
        assert_eq!(config.log_level, LogLevel::Warn);
        assert_eq!(config.plugin.library, Some(PathBuf::from("libstrokes.so")));
    }

    #[test]
    fn test_level_filter_conversion() {
        assert_eq!(LevelFilter::from(LogLevel::Off), LevelFilter::Off);
        assert_eq!(LevelFilter::from(LogLevel::Trace), LevelFilter::Trace);
    }
}

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "VKCHASSIS_CONFIG";

/// Environment variable overriding `layer.wrap_handles`.
pub const WRAP_HANDLES_ENV: &str = "VKCHASSIS_WRAP_HANDLES";

/// Top-level layer configuration, loaded from vkchassis.toml.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChassisConfig {
    #[serde(default)]
    pub layer: LayerSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerSettings {
    /// Hand out layer-owned handles instead of the driver's own values
    #[serde(default = "default_true")]
    pub wrap_handles: bool,
    /// What to do when an outer handle has no table entry
    #[serde(default)]
    pub unknown_handles: UnknownHandlePolicy,
}

/// Policy for unwrapping a non-null handle the translator never saw.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum UnknownHandlePolicy {
    /// Forward the null handle (default, mixes wrapped and raw callers)
    #[default]
    #[serde(rename = "null")]
    Null,
    /// Panic on the first miss; meant for test runs.
    ///
    /// Inside a loaded layer the panic unwinds into an `extern "system"`
    /// entry point, which aborts the whole host process.
    #[serde(rename = "fail_fast")]
    FailFast,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive used when VKCHASSIS_LOG is unset
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for LayerSettings {
    fn default() -> Self {
        Self {
            wrap_handles: true,
            unknown_handles: UnknownHandlePolicy::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

impl ChassisConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, CoreError> {
        let config: ChassisConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file if it exists, otherwise return defaults.
    /// Environment overrides are applied either way.
    pub fn load_or_default(path: &str) -> Self {
        let mut config = match Self::load(path) {
            Ok(config) => config,
            Err(CoreError::Io(_)) => Self::default(),
            Err(e) => {
                tracing::warn!(path, error = %e, "ignoring malformed layer config");
                Self::default()
            }
        };
        config.apply_env();
        config
    }

    /// Apply `VKCHASSIS_WRAP_HANDLES` on top of the file settings.
    pub fn apply_env(&mut self) {
        if let Ok(value) = std::env::var(WRAP_HANDLES_ENV) {
            match parse_bool(&value) {
                Some(wrap) => self.layer.wrap_handles = wrap,
                None => tracing::warn!(value, "unrecognized {WRAP_HANDLES_ENV} value"),
            }
        }
    }
}

/// Returns the config file path.
/// Search order:
/// 1. `$VKCHASSIS_CONFIG`
/// 2. System-wide config: `%PROGRAMDATA%\vkchassis\vkchassis.toml` (Windows) or `/etc/vkchassis/vkchassis.toml`
/// 3. Local fallback: `./vkchassis.toml`
pub fn default_config_path() -> String {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        return path;
    }
    #[cfg(windows)]
    {
        let programdata = std::env::var("PROGRAMDATA")
            .unwrap_or_else(|_| r"C:\ProgramData".to_string());
        let system_path = format!(r"{}\vkchassis\vkchassis.toml", programdata);
        if std::path::Path::new(&system_path).exists() {
            return system_path;
        }
    }
    #[cfg(not(windows))]
    {
        let system_path = "/etc/vkchassis/vkchassis.toml";
        if std::path::Path::new(system_path).exists() {
            return system_path.to_string();
        }
    }
    "vkchassis.toml".to_string()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

fn default_filter() -> String {
    "warn".to_string()
}

fn default_true() -> bool {
    true
}

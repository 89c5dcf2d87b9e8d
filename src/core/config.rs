//! Configuration management with layered hierarchy

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Address the HTTP API listens on unless configured otherwise
pub const DEFAULT_BIND: &str = "127.0.0.1:5000";

/// pdecalc configuration with layered hierarchy
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Listen address for `pdecalc serve`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,

    /// Default output format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_format: Option<String>,

    /// Log filter directive (e.g. "info", "pdecalc=debug")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log: Option<String>,
}

/// A config file that exists but could not be used
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigWarning {
    pub path: PathBuf,
    pub error: String,
}

impl ConfigWarning {
    /// Emit through `tracing`; call once the subscriber is installed
    pub fn log(&self) {
        tracing::warn!(path = %self.path.display(), error = %self.error, "ignoring unreadable config file");
    }
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    ///
    /// Files that fail to read or parse are skipped and returned as warnings,
    /// since logging is configured from the result.
    pub fn load() -> (Self, Vec<ConfigWarning>) {
        let mut config = Config::default();
        let mut warnings = Vec::new();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/pdecalc/config.yaml)
        // 3. Explicit config file
        let paths = [Self::global_config_path(), Self::env_config_path()];
        for path in paths.iter().flatten() {
            match Self::read_file(path) {
                Ok(Some(file_config)) => config.merge(file_config),
                Ok(None) => {}
                Err(warning) => warnings.push(warning),
            }
        }

        // 4. Environment variables
        if let Ok(bind) = std::env::var("PDECALC_BIND") {
            config.bind = Some(bind);
        }
        if let Ok(format) = std::env::var("PDECALC_FORMAT") {
            config.default_format = Some(format);
        }
        if let Ok(log) = std::env::var("PDECALC_LOG") {
            config.log = Some(log);
        }

        (config, warnings)
    }

    fn read_file(path: &Path) -> Result<Option<Config>, ConfigWarning> {
        if !path.exists() {
            return Ok(None);
        }
        let warning = |error: String| ConfigWarning {
            path: path.to_path_buf(),
            error,
        };
        let contents = std::fs::read_to_string(path).map_err(|e| warning(e.to_string()))?;
        serde_yml::from_str::<Config>(&contents)
            .map(Some)
            .map_err(|e| warning(e.to_string()))
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "pdecalc")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Config file named by `PDECALC_CONFIG`
    pub fn env_config_path() -> Option<PathBuf> {
        std::env::var_os("PDECALC_CONFIG").map(PathBuf::from)
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.bind.is_some() {
            self.bind = other.bind;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
        if other.log.is_some() {
            self.log = other.log;
        }
    }

    /// Listen address, falling back to the built-in default
    pub fn bind(&self) -> String {
        self.bind
            .clone()
            .unwrap_or_else(|| DEFAULT_BIND.to_string())
    }
}

//! # Agent Configuration
//!
//! Resolution order, later wins:
//!
//! 1. Built-in defaults
//! 2. `config.toml` at `LUMEN_CONFIG_PATH`, or `<config dir>/lumen/config.toml`
//! 3. Environment overrides (`LUMEN_API_BASE`, `LUMEN_SHARE_BASE`,
//!    `LUMEN_LOG_LEVEL`, `LUMEN_HTTP_TIMEOUT_SECS`)
//!
//! A missing file is not an error. The result is validated before use.
//!
//! ```toml
//! log_level = "debug"
//! http_timeout_secs = 10
//!
//! [composer]
//! api_base = "https://api.lumen.app/v1/"
//! max_text_chars = 500
//! ```

use lumen_app::ComposerConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};
use thiserror::Error;

const CONFIG_DIR_NAME: &str = "lumen";
const CONFIG_FILE_NAME: &str = "config.toml";

const ENV_CONFIG_PATH: &str = "LUMEN_CONFIG_PATH";
const ENV_API_BASE: &str = "LUMEN_API_BASE";
const ENV_SHARE_BASE: &str = "LUMEN_SHARE_BASE";
const ENV_LOG_LEVEL: &str = "LUMEN_LOG_LEVEL";
const ENV_HTTP_TIMEOUT_SECS: &str = "LUMEN_HTTP_TIMEOUT_SECS";

/// Default per-request HTTP timeout.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;

/// Errors loading or validating [`AgentConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file exists but could not be read
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        /// File path
        path: PathBuf,
        /// I/O failure
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`AgentConfig`]
    #[error("failed to parse config file {}: {message}", path.display())]
    Parse {
        /// File path
        path: PathBuf,
        /// Parser message
        message: String,
    },

    /// Environment override could not be parsed
    #[error("{var} has invalid value {value:?}")]
    InvalidEnv {
        /// Variable name
        var: &'static str,
        /// Raw value
        value: String,
    },

    /// Resolved configuration failed validation
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Runtime settings for the agent and the composer it hosts.
#[derive(Clone, Debug, PartialEq)]
pub struct AgentConfig {
    /// Composer settings
    pub composer: ComposerConfig,
    /// Default tracing filter directive; `RUST_LOG` still takes precedence
    pub log_level: String,
    /// Per-request HTTP timeout in seconds
    pub http_timeout_secs: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            composer: ComposerConfig::default(),
            log_level: "info".to_string(),
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

impl AgentConfig {
    /// Load from the default location and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();
        Self::load_from(path.as_deref())
    }

    /// Load from `path` (if it exists) and the process environment.
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(path) = path {
            if path.is_file() {
                config.apply_partial(read_partial(path)?);
                tracing::debug!(path = %path.display(), "config file loaded");
            } else {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
            }
        }
        config.apply_overrides(|var| env::var(var).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Config file location: `LUMEN_CONFIG_PATH` if set, else the platform
    /// config directory.
    pub fn config_path() -> Option<PathBuf> {
        if let Some(value) = env::var_os(ENV_CONFIG_PATH) {
            if !value.is_empty() {
                let path = PathBuf::from(value);
                if path.is_dir() {
                    return Some(path.join(CONFIG_FILE_NAME));
                }
                return Some(path);
            }
        }
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// HTTP timeout as a [`Duration`].
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Check the resolved configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.composer
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if self.log_level.trim().is_empty() {
            return Err(ConfigError::Invalid("log_level is empty".into()));
        }
        if self.http_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "http_timeout_secs must be positive".into(),
            ));
        }
        Ok(())
    }

    fn apply_partial(&mut self, partial: PartialConfig) {
        if let Some(composer) = partial.composer {
            self.composer = composer;
        }
        if let Some(level) = partial.log_level {
            self.log_level = level;
        }
        if let Some(timeout) = partial.http_timeout_secs {
            self.http_timeout_secs = timeout;
        }
    }

    /// Apply overrides from `lookup`. Blank values are ignored.
    fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        if let Some(value) = get(ENV_API_BASE) {
            self.composer.api_base = value;
        }
        if let Some(value) = get(ENV_SHARE_BASE) {
            self.composer.share_base = value;
        }
        if let Some(value) = get(ENV_LOG_LEVEL) {
            self.log_level = value;
        }
        if let Some(value) = get(ENV_HTTP_TIMEOUT_SECS) {
            let parsed = value.trim().parse::<u64>();
            self.http_timeout_secs = match parsed {
                Ok(secs) => secs,
                Err(_) => {
                    return Err(ConfigError::InvalidEnv {
                        var: ENV_HTTP_TIMEOUT_SECS,
                        value,
                    })
                }
            };
        }
        Ok(())
    }
}

#[derive(Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct PartialConfig {
    composer: Option<ComposerConfig>,
    log_level: Option<String>,
    http_timeout_secs: Option<u64>,
}

fn read_partial(path: &Path) -> Result<PartialConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    fn clear_env() {
        for var in [
            ENV_CONFIG_PATH,
            ENV_API_BASE,
            ENV_SHARE_BASE,
            ENV_LOG_LEVEL,
            ENV_HTTP_TIMEOUT_SECS,
        ] {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = AgentConfig::default();
        config.validate().unwrap();
        assert_eq!(config.http_timeout(), Duration::from_secs(15));
        assert_eq!(config.composer.max_text_chars, 500);
    }

    #[test]
    fn test_overrides_apply() {
        let mut config = AgentConfig::default();
        config
            .apply_overrides(lookup(&[
                (ENV_API_BASE, "https://staging.lumen.test/api/"),
                (ENV_LOG_LEVEL, "lumen_app=debug"),
                (ENV_HTTP_TIMEOUT_SECS, " 5 "),
            ]))
            .unwrap();

        assert_eq!(config.composer.api_base, "https://staging.lumen.test/api/");
        assert_eq!(config.log_level, "lumen_app=debug");
        assert_eq!(config.http_timeout_secs, 5);
        assert_eq!(config.composer.share_base, ComposerConfig::default().share_base);
    }

    #[test]
    fn test_blank_override_is_ignored() {
        let mut config = AgentConfig::default();
        config
            .apply_overrides(lookup(&[(ENV_LOG_LEVEL, "  ")]))
            .unwrap();
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_bad_timeout_override() {
        let mut config = AgentConfig::default();
        let err = config
            .apply_overrides(lookup(&[(ENV_HTTP_TIMEOUT_SECS, "soon")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidEnv { var: ENV_HTTP_TIMEOUT_SECS, .. }
        ));
    }

    #[test]
    fn test_zero_timeout_is_invalid() {
        let config = AgentConfig {
            http_timeout_secs: 0,
            ..AgentConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    #[serial]
    fn test_load_from_file_then_env() {
        clear_env();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
log_level = "debug"
http_timeout_secs = 30

[composer]
share_base = "https://share.lumen.test/m"
title_chars = 20
"#
        )
        .unwrap();
        env::set_var(ENV_SHARE_BASE, "https://env.lumen.test/m");

        let config = AgentConfig::load_from(Some(file.path())).unwrap();
        clear_env();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.http_timeout_secs, 30);
        assert_eq!(config.composer.title_chars, 20);
        // Environment wins over the file
        assert_eq!(config.composer.share_base, "https://env.lumen.test/m");
        // Unset fields keep defaults
        assert_eq!(config.composer.max_text_chars, 500);
    }

    #[test]
    #[serial]
    fn test_missing_file_uses_defaults() {
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        let config = AgentConfig::load_from(Some(&dir.path().join(CONFIG_FILE_NAME))).unwrap();
        assert_eq!(config, AgentConfig::default());
    }

    #[test]
    #[serial]
    fn test_unparseable_file() {
        clear_env();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "http_timeout_secs = \"thirty\"").unwrap();

        let err = AgentConfig::load_from(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    #[serial]
    fn test_invalid_url_fails_validation() {
        clear_env();
        env::set_var(ENV_API_BASE, "ftp://lumen.test/");
        let result = AgentConfig::load_from(None);
        clear_env();
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    #[serial]
    fn test_config_path_override() {
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        env::set_var(ENV_CONFIG_PATH, dir.path());
        let path = AgentConfig::config_path();
        clear_env();
        assert_eq!(path, Some(dir.path().join(CONFIG_FILE_NAME)));
    }
}

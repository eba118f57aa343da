//! Engine configuration, loaded from TOML.
//!
//! ```toml
//! [resolver]
//! max_depth = 64
//! max_steps = 100000
//!
//! [log]
//! filter = "hornkb=debug"
//! ```
//!
//! Every field is optional; missing ones take their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::infer::ResolverConfig;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HornConfig {
    pub resolver: ResolverConfig,
    pub log: LogConfig,
}

/// Logging settings for the binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directives, used when `RUST_LOG` is
    /// unset (default: `"info"`).
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".into(),
        }
    }
}

impl HornConfig {
    /// Load and validate a TOML config file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save to a TOML file, creating parent directories.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = self.to_toml()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }

    pub fn to_toml(&self) -> ConfigResult<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid {
            message: e.to_string(),
        })
    }

    /// Reject bounds that would make every query fail and malformed log
    /// filters.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.resolver.max_steps == 0 {
            return Err(ConfigError::Invalid {
                message: "resolver.max_steps must be at least 1".into(),
            });
        }
        tracing_subscriber::EnvFilter::try_new(&self.log.filter).map_err(|e| {
            ConfigError::Invalid {
                message: format!("log.filter {:?}: {e}", self.log.filter),
            }
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = HornConfig::default();
        assert_eq!(config.resolver.max_depth, 128);
        assert_eq!(config.resolver.max_steps, 250_000);
        assert_eq!(config.log.filter, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: HornConfig = toml::from_str("[resolver]\nmax_depth = 8\n").unwrap();
        assert_eq!(config.resolver.max_depth, 8);
        assert_eq!(config.resolver.max_steps, 250_000);
        assert_eq!(config.log, LogConfig::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("hornkb.toml");
        let mut config = HornConfig::default();
        config.resolver.max_steps = 500;
        config.log.filter = "hornkb=trace".into();
        config.save(&path).unwrap();
        assert_eq!(HornConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn load_reports_missing_and_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            HornConfig::load(&missing),
            Err(ConfigError::Read { .. })
        ));

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "[resolver\nmax_depth = ").unwrap();
        assert!(matches!(HornConfig::load(&bad), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn zero_step_budget_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zero.toml");
        std::fs::write(&path, "[resolver]\nmax_steps = 0\n").unwrap();
        assert!(matches!(
            HornConfig::load(&path),
            Err(ConfigError::Invalid { .. })
        ));
    }
}

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable naming an optional RON run configuration.
pub const CONFIG_ENV: &str = "UM_CONFIG";

/// Settings for a run of the `um` binary. Fields left out of the file keep
/// their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// Give up after this many instructions. Reaching it without a halt is
    /// reported as a failure.
    pub max_steps: Option<u64>,
    /// Flush stdout after every output byte instead of only before reads
    /// and at exit.
    pub flush_each_output: bool,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

impl MachineConfig {
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(text)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_ron_str(&text)
    }

    /// Loads the file named by [`CONFIG_ENV`], or the defaults when unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => {
                tracing::debug!(path = ?path, "Loading run configuration");
                Self::from_file(path)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn to_ron_string(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MachineConfig::default();
        assert_eq!(config.max_steps, None);
        assert!(!config.flush_each_output);
    }

    #[test]
    fn test_parse_full_config() {
        let config =
            MachineConfig::from_ron_str("(max_steps: Some(1000), flush_each_output: true)")
                .unwrap();
        assert_eq!(config.max_steps, Some(1000));
        assert!(config.flush_each_output);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = MachineConfig::from_ron_str("(flush_each_output: true)").unwrap();
        assert_eq!(config.max_steps, None);
        assert!(config.flush_each_output);
    }

    #[test]
    fn test_malformed_config_is_rejected() {
        assert!(matches!(
            MachineConfig::from_ron_str("(max_steps: \"lots\")"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        assert!(matches!(
            MachineConfig::from_file("/no/such/um-config.ron"),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn test_serialized_config_parses_back() {
        let config = MachineConfig {
            max_steps: Some(42),
            flush_each_output: true,
        };
        let text = config.to_ron_string().unwrap();
        assert_eq!(MachineConfig::from_ron_str(&text).unwrap(), config);
    }
}

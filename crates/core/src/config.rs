use std::path::PathBuf;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Engine knobs loaded from the environment at startup.
#[derive(Clone, Debug, PartialEq)]
pub struct CoreConfig {
    /// Optional path to a JSON table replacing the builtin static guides.
    pub guides_path: Option<PathBuf>,
    /// Whether example messages are generated in the background as soon as
    /// a parent guide recommendation is produced.
    pub prefetch_examples: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            guides_path: None,
            prefetch_examples: true,
        }
    }
}

impl CoreConfig {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let guides_path = std::env::var("TALKBRIDGE_GUIDES_PATH")
            .ok()
            .map(PathBuf::from);

        let prefetch_examples = match std::env::var("TALKBRIDGE_PREFETCH_EXAMPLES") {
            Ok(raw) => raw.parse::<bool>().map_err(|_| {
                ConfigError::InvalidValue(
                    "TALKBRIDGE_PREFETCH_EXAMPLES".to_string(),
                    format!("'{}' is not a boolean", raw),
                )
            })?,
            Err(_) => true,
        };

        Ok(Self {
            guides_path,
            prefetch_examples,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn clear_env_vars() {
        unsafe {
            env::remove_var("TALKBRIDGE_GUIDES_PATH");
            env::remove_var("TALKBRIDGE_PREFETCH_EXAMPLES");
        }
    }

    #[test]
    fn test_config_error_display() {
        let invalid_value =
            ConfigError::InvalidValue("TEST_VAR".to_string(), "bad_value".to_string());
        assert_eq!(
            format!("{}", invalid_value),
            "Invalid value for environment variable TEST_VAR: bad_value"
        );
    }

    #[test]
    #[serial]
    fn test_config_defaults_when_unset() {
        clear_env_vars();

        let config = CoreConfig::from_env().expect("Config should load successfully");

        assert_eq!(config, CoreConfig::default());
        assert!(config.prefetch_examples);
        assert!(config.guides_path.is_none());
    }

    #[test]
    #[serial]
    fn test_config_custom_values() {
        clear_env_vars();
        unsafe {
            env::set_var("TALKBRIDGE_GUIDES_PATH", "/srv/guides.json");
            env::set_var("TALKBRIDGE_PREFETCH_EXAMPLES", "false");
        }

        let config = CoreConfig::from_env().expect("Config should load successfully");

        assert_eq!(config.guides_path, Some(PathBuf::from("/srv/guides.json")));
        assert!(!config.prefetch_examples);

        clear_env_vars();
    }

    #[test]
    #[serial]
    fn test_config_invalid_prefetch_flag() {
        clear_env_vars();
        unsafe {
            env::set_var("TALKBRIDGE_PREFETCH_EXAMPLES", "sometimes");
        }

        let ConfigError::InvalidValue(var, value) = CoreConfig::from_env().unwrap_err();
        assert_eq!(var, "TALKBRIDGE_PREFETCH_EXAMPLES");
        assert!(value.contains("sometimes"));

        clear_env_vars();
    }
}

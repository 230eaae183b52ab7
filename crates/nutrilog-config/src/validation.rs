// SPDX-FileCopyrightText: 2026 Nutrilog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::{LOG_LEVELS, NutrilogConfig};

/// Validate a deserialized configuration.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &NutrilogConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.storage.busy_timeout_ms == 0 {
        errors.push(ConfigError::Validation {
            message: "storage.busy_timeout_ms must be positive".to_string(),
        });
    }

    if config.locking.acquire_timeout_ms == 0 {
        errors.push(ConfigError::Validation {
            message: "locking.acquire_timeout_ms must be positive".to_string(),
        });
    }

    let level = config.log.level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "log.level `{}` is not one of {}",
                config.log.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(errors: &[ConfigError]) -> Vec<String> {
        errors.iter().map(|e| e.to_string()).collect()
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&NutrilogConfig::default()).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = NutrilogConfig::default();
        config.storage.database_path = "  ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("database_path"))));
    }

    #[test]
    fn all_failures_are_collected() {
        let mut config = NutrilogConfig::default();
        config.storage.busy_timeout_ms = 0;
        config.locking.acquire_timeout_ms = 0;
        config.log.level = "loud".to_string();

        let errors = validate_config(&config).unwrap_err();
        let messages = messages(&errors);
        assert_eq!(errors.len(), 3);
        assert!(messages.iter().any(|m| m.contains("busy_timeout_ms")));
        assert!(messages.iter().any(|m| m.contains("acquire_timeout_ms")));
        assert!(messages.iter().any(|m| m.contains("`loud`")));
    }

    #[test]
    fn log_level_is_case_insensitive() {
        let mut config = NutrilogConfig::default();
        config.log.level = "DEBUG".to_string();
        assert!(validate_config(&config).is_ok());
    }
}

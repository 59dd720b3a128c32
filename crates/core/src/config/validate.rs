use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Recognizer URL is set
/// - Notifier URL is set when the section is present
/// - Image worker bound is non-zero
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.recognizer.url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "recognizer.url cannot be empty".to_string(),
        ));
    }

    if let Some(notifier) = &config.notifier {
        if notifier.url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "notifier.url cannot be empty".to_string(),
            ));
        }
    }

    if config.orchestrator.max_parallel_images == 0 {
        return Err(ConfigError::ValidationError(
            "orchestrator.max_parallel_images cannot be 0".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_from_str;

    fn base_config() -> Config {
        load_config_from_str(
            r#"
[recognizer]
url = "http://localhost:8400"
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&base_config()).is_ok());
    }

    #[test]
    fn test_validate_empty_recognizer_url_fails() {
        let mut config = base_config();
        config.recognizer.url = "  ".to_string();
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_zero_workers_fails() {
        let mut config = base_config();
        config.orchestrator.max_parallel_images = 0;
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }
}

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: Config = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("PLATEWATCH_").split("_"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[recognizer]
url = "http://localhost:8400"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.recognizer.url, "http://localhost:8400");
        assert_eq!(config.source.base_url, "https://autokochka.ru");
        assert!(config.notifier.is_none());
        assert_eq!(config.orchestrator.no_images_retry_delay_secs, 120);
    }

    #[test]
    fn test_load_config_from_str_missing_recognizer() {
        let toml = r#"
[database]
path = "ads.db"
"#;
        let result = load_config_from_str(toml);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[recognizer]
url = "http://localhost:8400"

[notifier]
url = "http://localhost:8000/notify/"

[database]
path = "volume/ads.db"

[orchestrator]
max_parallel_images = 2
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.database.path.to_string_lossy(), "volume/ads.db");
        assert_eq!(config.orchestrator.max_parallel_images, 2);
        assert_eq!(
            config.notifier.unwrap().url,
            "http://localhost:8000/notify/"
        );
    }
}

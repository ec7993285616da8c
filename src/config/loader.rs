//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::RouterConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Read and parse a TOML file without validating it.
///
/// Callers that apply overrides on top of the file validate afterwards with
/// [`validate_config`].
pub fn read_config(path: &Path) -> Result<RouterConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<RouterConfig, ConfigError> {
    let config = read_config(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("host-router-{}-{}.toml", name, std::process::id()));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_valid_file() {
        let path = write_temp(
            "valid",
            r#"
            [tenancy]
            root_domain = "example.com"

            [upstream]
            address = "127.0.0.1:4000"
            "#,
        );

        let config = load_config(&path).unwrap();
        assert_eq!(config.tenancy.root_domain, "example.com");
        assert_eq!(config.upstream.address, "127.0.0.1:4000");
        fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_load_reports_validation_errors() {
        let path = write_temp(
            "invalid",
            r#"
            [tenancy]
            root_domain = ""

            [upstream]
            address = "not an address"
            "#,
        );

        match load_config(&path) {
            Err(ConfigError::Validation(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation failure, got {:?}", other),
        }
        fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_parse_error() {
        let path = write_temp("broken", "[tenancy\nroot_domain = ");
        assert!(matches!(load_config(&path), Err(ConfigError::Parse(_))));
        fs::remove_file(path).ok();
    }

    #[test]
    fn test_shipped_example_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("host-router.example.toml");
        let config = load_config(&path).unwrap();

        assert_eq!(config.tenancy.root_domain, "example.com");
        assert_eq!(config.paths.bypass.len(), 3);
    }
}

use std::path::Path;

use crate::config::schema::PortalConfig;
use crate::error::ConfigError;

const SCHEMA_JSON: &str = include_str!("../../../../schema/config-v1.json");

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<PortalConfig, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<PortalConfig, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let config: PortalConfig = serde_json::from_value(json_value)?;

    validate_config(&config)?;

    Ok(config)
}

fn schema_validator() -> Result<jsonschema::Validator, ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })
}

/// Prefixes a schema violation with the JSON pointer of the offending value,
/// e.g. `/defaultPageSize: 0 is less than the minimum of 1`.
fn describe_violation(error: &jsonschema::ValidationError<'_>) -> String {
    match error.instance_path().as_str() {
        "" => format!("(root): {}", error),
        path => format!("{}: {}", path, error),
    }
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let validator = schema_validator()?;

    let violations: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| describe_violation(&e))
        .collect();
    if violations.is_empty() {
        return Ok(());
    }

    Err(ConfigError::SchemaValidation {
        errors: violations.join("; "),
    })
}

fn validate_config(config: &PortalConfig) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    if config.default_page_size == 0 {
        return Err(ConfigError::Validation {
            message: "defaultPageSize must be at least 1".to_string(),
        });
    }

    if config.default_page_size > config.max_page_size {
        return Err(ConfigError::Validation {
            message: format!(
                "defaultPageSize ({}) exceeds maxPageSize ({})",
                config.default_page_size, config.max_page_size
            ),
        });
    }

    Ok(())
}

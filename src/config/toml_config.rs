use crate::core::FIRST_MATRIKEL_NUMBER;
use crate::utils::error::{RegistryError, Result};
use crate::utils::validation::{validate_path, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub registry: RegistrySettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_file: String,
    pub create_if_missing: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_file: "students.csv".to_string(),
            create_if_missing: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrySettings {
    pub first_matrikel_number: u32,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            first_matrikel_number: FIRST_MATRIKEL_NUMBER,
        }
    }
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl RegistryConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| RegistryError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are
    /// left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| RegistryError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_path("storage.data_file", &self.storage.data_file)?;

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(RegistryError::InvalidConfigValueError {
                field: "logging.level".to_string(),
                value: self.logging.level.clone(),
                reason: format!("Valid levels: {}", LOG_LEVELS.join(", ")),
            });
        }

        Ok(())
    }
}

impl Validate for RegistryConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[storage]
data_file = "data/registry.csv"
create_if_missing = false

[logging]
level = "debug"
json = true

[registry]
first_matrikel_number = 500000
"#;

        let config = RegistryConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.storage.data_file, "data/registry.csv");
        assert!(!config.storage.create_if_missing);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
        assert_eq!(config.registry.first_matrikel_number, 500000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = RegistryConfig::from_toml_str("[logging]\nlevel = \"warn\"\n").unwrap();
        assert_eq!(config.storage.data_file, "students.csv");
        assert!(config.storage.create_if_missing);
        assert_eq!(config.registry.first_matrikel_number, FIRST_MATRIKEL_NUMBER);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("REGISTRY_TEST_DATA_FILE", "/tmp/from-env.csv");

        let toml_content = r#"
[storage]
data_file = "${REGISTRY_TEST_DATA_FILE}"
"#;

        let config = RegistryConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.storage.data_file, "/tmp/from-env.csv");

        std::env::remove_var("REGISTRY_TEST_DATA_FILE");
    }

    #[test]
    fn test_config_validation() {
        let config = RegistryConfig::from_toml_str("[logging]\nlevel = \"loud\"\n").unwrap();
        assert!(config.validate().is_err());

        let config = RegistryConfig::from_toml_str("[storage]\ndata_file = \"\"\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[storage]\ndata_file = \"x.csv\"").unwrap();

        let config = RegistryConfig::from_file(file.path()).unwrap();
        assert_eq!(config.storage.data_file, "x.csv");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = RegistryConfig::from_toml_str("[storage\n").unwrap_err();
        assert!(matches!(err, RegistryError::ConfigError { .. }));
    }
}

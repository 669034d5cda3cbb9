//! Configuration for the fieldcheck rule engine
//!
//! Loads the ordered list of active rule providers from files (JSON, TOML,
//! `.env`) and `FIELDCHECK_*` environment variables.
//!
//! ```no_run
//! use fieldcheck_config::RulesConfig;
//!
//! let config = RulesConfig::loader()
//!     .add_file("fieldcheck.toml")
//!     .load_env()
//!     .load_or_empty();
//!
//! for provider in &config.providers {
//!     println!("active provider: {}", provider);
//! }
//! ```

pub mod env;
pub mod error;
pub mod loader;
pub mod settings;
pub mod validation;

pub use env::{DEFAULT_ENV_PREFIX, EnvLoader};
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};
pub use settings::{DEFAULT_MESSAGE_TEMPLATE, RulesConfig, RulesConfigLoader};
pub use validation::{ConfigValidator, Validate};

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::path::Path;

/// Layered key/value store; later loads override earlier keys.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    values: Map<String, Value>,
    env_prefix: String,
}

impl ConfigManager {
    /// Manager reading `FIELDCHECK_*` variables
    pub fn new() -> Self {
        Self::with_prefix(DEFAULT_ENV_PREFIX)
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            values: Map::new(),
            env_prefix: prefix.into(),
        }
    }

    /// Load prefixed environment variables as string values
    pub fn load_env(&mut self) -> Result<()> {
        let loader = EnvLoader::new(Some(self.env_prefix.clone()));
        for (key, value) in loader.load()? {
            self.values.insert(key, Value::String(value));
        }
        Ok(())
    }

    /// Load a `.env` file into the process environment, then [`Self::load_env`].
    ///
    /// Without a path a missing `.env` in the working directory is ignored.
    pub fn load_dotenv(&mut self, path: Option<&str>) -> Result<()> {
        if let Some(path) = path {
            dotenvy::from_path(path).map_err(|e| ConfigError::LoadError(e.to_string()))?;
        } else {
            dotenvy::dotenv().ok();
        }
        self.load_env()
    }

    /// Merge the top-level keys of a configuration file
    pub fn load_file(&mut self, path: impl AsRef<Path>, format: FileFormat) -> Result<()> {
        let path = path.as_ref();
        match ConfigLoader::new(format).load_file(path)? {
            Value::Object(map) => {
                self.values.extend(map);
                Ok(())
            }
            other => Err(ConfigError::ParseError(format!(
                "{} must contain a table at the top level, found {}",
                path.display(),
                kind(&other)
            ))),
        }
    }

    pub fn set<T: serde::Serialize>(&mut self, key: &str, value: T) -> Result<()> {
        let json_value = serde_json::to_value(value)
            .map_err(|e| ConfigError::SerializationError(e.to_string()))?;
        self.values.insert(key.to_string(), json_value);
        Ok(())
    }

    /// Deserialize the whole store into `T` and validate it
    pub fn load_validated<T: DeserializeOwned + Validate>(&self) -> Result<T> {
        let validated: T = serde_json::from_value(Value::Object(self.values.clone()))
            .map_err(|e| ConfigError::DeserializationError(e.to_string()))?;

        validated.validate()?;

        Ok(validated)
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a table",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_overrides_loaded_value() {
        let mut manager = ConfigManager::new();
        manager.set("providers", vec!["base"]).unwrap();
        manager.set("providers", "string,number").unwrap();

        let config: RulesConfig = manager.load_validated().unwrap();
        assert_eq!(config.providers, vec!["string", "number"]);
    }

    #[test]
    fn test_load_validated_rules_config() {
        let mut manager = ConfigManager::new();
        manager.set("providers", "base,number").unwrap();

        let config: RulesConfig = manager.load_validated().unwrap();
        assert_eq!(config.providers, vec!["base", "number"]);
    }
}

// Environment variable loading

use crate::Result;
use std::collections::BTreeMap;
use std::env;

/// Prefix used when none is given explicitly.
pub const DEFAULT_ENV_PREFIX: &str = "FIELDCHECK";

/// Reads `PREFIX_KEY` variables as lowercase `key` entries.
pub struct EnvLoader {
    prefix: Option<String>,
}

impl EnvLoader {
    pub fn new(prefix: Option<String>) -> Self {
        Self { prefix }
    }

    /// Load matching environment variables.
    ///
    /// With a prefix only `PREFIX_*` variables are returned, with the prefix
    /// removed. Without one, every variable is returned.
    pub fn load(&self) -> Result<BTreeMap<String, String>> {
        let mut config = BTreeMap::new();

        for (key, value) in env::vars() {
            match self.strip(&key) {
                Some(name) if !name.is_empty() => {
                    config.insert(name.to_lowercase(), value);
                }
                _ => {}
            }
        }

        Ok(config)
    }

    fn strip<'a>(&self, key: &'a str) -> Option<&'a str> {
        match &self.prefix {
            Some(prefix) => key
                .strip_prefix(prefix.as_str())
                .and_then(|rest| rest.strip_prefix('_')),
            None => Some(key),
        }
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(Some(DEFAULT_ENV_PREFIX.to_string()))
    }
}

//! Rule engine settings.
//!
//! [`RulesConfig`] names the rule providers to load, in order, and the
//! template used for failure messages without a custom override.

use crate::validation::{ConfigValidator, Validate};
use crate::{ConfigManager, FileFormat, Result};
use fieldcheck_log::{debug, warn};
use serde::{Deserialize, Deserializer, Serialize};

/// Message used when a caller gives no custom message for a failed rule.
pub const DEFAULT_MESSAGE_TEMPLATE: &str =
    "Invalid property - {field}. Validation failed in rule - {rule}";

/// Which rule providers are active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Provider identifiers, in registration order
    #[serde(deserialize_with = "string_or_list")]
    pub providers: Vec<String>,

    /// Default failure message; `{field}` and `{rule}` are substituted
    pub default_message: String,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            providers: Vec::new(),
            default_message: DEFAULT_MESSAGE_TEMPLATE.to_string(),
        }
    }
}

impl RulesConfig {
    pub fn new<I, S>(providers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            providers: providers.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_default_message(mut self, template: impl Into<String>) -> Self {
        self.default_message = template.into();
        self
    }

    /// No providers configured.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn loader() -> RulesConfigLoader {
        RulesConfigLoader::new()
    }
}

impl Validate for RulesConfig {
    fn validate(&self) -> Result<()> {
        for provider in &self.providers {
            ConfigValidator::not_empty(provider, "provider identifier")?;
        }
        ConfigValidator::not_empty(&self.default_message, "default_message")
    }
}

/// Accepts `["a", "b"]` from files and `"a,b"` from environment variables.
fn string_or_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        List(Vec<String>),
        Joined(String),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::List(list) => list,
        Raw::Joined(joined) => joined
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
    })
}

/// Builder that layers files, `.env` and environment variables into a
/// [`RulesConfig`]. Later sources override earlier ones key by key:
/// files in the order added, then `.env`, then the process environment,
/// then values given with [`Self::providers`] and [`Self::default_message`].
pub struct RulesConfigLoader {
    env_prefix: Option<String>,
    load_env: bool,
    load_dotenv: bool,
    dotenv_path: Option<String>,
    files: Vec<(String, Option<FileFormat>)>,
    providers: Option<Vec<String>>,
    default_message: Option<String>,
}

impl RulesConfigLoader {
    pub fn new() -> Self {
        Self {
            env_prefix: None,
            load_env: false,
            load_dotenv: false,
            dotenv_path: None,
            files: Vec::new(),
            providers: None,
            default_message: None,
        }
    }

    /// Environment variable prefix (default `FIELDCHECK`)
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Read `PREFIX_PROVIDERS` and `PREFIX_DEFAULT_MESSAGE`
    pub fn load_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    /// Load a `.env` file into the environment first; implies [`Self::load_env`]
    pub fn load_dotenv(mut self, path: Option<String>) -> Self {
        self.load_dotenv = true;
        self.load_env = true;
        self.dotenv_path = path;
        self
    }

    /// Add a file; the format is taken from its extension
    pub fn add_file(mut self, path: impl Into<String>) -> Self {
        self.files.push((path.into(), None));
        self
    }

    pub fn add_file_with_format(mut self, path: impl Into<String>, format: FileFormat) -> Self {
        self.files.push((path.into(), Some(format)));
        self
    }

    /// Provider list applied over every other source
    pub fn providers<I, S>(mut self, providers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.providers = Some(providers.into_iter().map(Into::into).collect());
        self
    }

    /// Message template applied over every other source
    pub fn default_message(mut self, template: impl Into<String>) -> Self {
        self.default_message = Some(template.into());
        self
    }

    /// Load and validate. Any unreadable or malformed source is an error.
    pub fn load(self) -> Result<RulesConfig> {
        let mut manager = match &self.env_prefix {
            Some(prefix) => ConfigManager::with_prefix(prefix.clone()),
            None => ConfigManager::new(),
        };

        for (path, format) in &self.files {
            let format = match format {
                Some(format) => *format,
                None => FileFormat::detect(path)?,
            };
            debug!("Loading rules configuration from {}", path);
            manager.load_file(path, format)?;
        }

        if self.load_dotenv {
            manager.load_dotenv(self.dotenv_path.as_deref())?;
        } else if self.load_env {
            manager.load_env()?;
        }

        if let Some(providers) = &self.providers {
            manager.set("providers", providers)?;
        }
        if let Some(template) = &self.default_message {
            manager.set("default_message", template)?;
        }

        manager.load_validated()
    }

    /// Load, falling back to an empty configuration on any error.
    ///
    /// An empty configuration yields an empty rule registry, which rejects
    /// every rule at validation time.
    pub fn load_or_empty(self) -> RulesConfig {
        self.load().unwrap_or_else(|e| {
            warn!("Rules configuration not loaded, no providers active: {}", e);
            RulesConfig::default()
        })
    }
}

impl Default for RulesConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

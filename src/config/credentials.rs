use crate::config::types::AnalysisConfig;
use crate::ConfigError;
use std::fmt;

/// API credential for the text-analysis service
///
/// Read once at startup and passed explicitly to the analysis client. The key is
/// never printed by `Debug`.
#[derive(Clone)]
pub struct ApiCredentials {
    api_key: String,
}

impl ApiCredentials {
    /// Wraps an already-known API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    /// Reads the API key from the environment variable named by `config.api_key_env`
    ///
    /// # Returns
    ///
    /// * `Ok(ApiCredentials)` - The variable is set and non-blank
    /// * `Err(ConfigError::MissingCredential)` - The variable is unset or blank
    pub fn from_env(config: &AnalysisConfig) -> Result<Self, ConfigError> {
        Self::from_value(&config.api_key_env, std::env::var(&config.api_key_env).ok())
    }

    fn from_value(var_name: &str, value: Option<String>) -> Result<Self, ConfigError> {
        match value {
            Some(key) if !key.trim().is_empty() => Ok(Self::new(key.trim())),
            _ => Err(ConfigError::MissingCredential(var_name.to_string())),
        }
    }

    /// The raw API key
    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

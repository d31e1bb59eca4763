//! Client configuration.
//!
//! The base URL depends on the deploy environment and is injected here rather
//! than chosen inline at call sites.

use std::time::Duration;

use thiserror::Error;

pub const DEVELOPMENT_BASE_URL: &str = "http://localhost:3000/api";
pub const PRODUCTION_BASE_URL: &str = "https://your-api-domain.com/api";

/// Generous default for slow mobile networks.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown environment {0:?} (expected \"development\" or \"production\")")]
    UnknownEnvironment(String),

    #[error("invalid timeout {0:?}: expected whole seconds")]
    InvalidTimeout(String),

    #[error("base url must be http(s): {0:?}")]
    InvalidBaseUrl(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn base_url(self) -> &'static str {
        match self {
            Environment::Development => DEVELOPMENT_BASE_URL,
            Environment::Production => PRODUCTION_BASE_URL,
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(ConfigError::UnknownEnvironment(s.to_string())),
        }
    }
}

/// Where and how long to talk to the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
    pub timeout: Duration,
}

impl ClientConfig {
    /// Trailing slashes on `base_url` are stripped.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn for_environment(env: Environment) -> Self {
        Self::new(env.base_url())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Read `EXPENSE_API_ENV`, `EXPENSE_API_BASE_URL` and
    /// `EXPENSE_API_TIMEOUT_SECS`. An explicit base URL overrides the
    /// environment preset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = match lookup("EXPENSE_API_ENV") {
            Some(raw) => raw.parse()?,
            None => Environment::default(),
        };

        let mut config = match lookup("EXPENSE_API_BASE_URL") {
            Some(url) => {
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(ConfigError::InvalidBaseUrl(url));
                }
                Self::new(&url)
            }
            None => Self::for_environment(env),
        };

        if let Some(raw) = lookup("EXPENSE_API_TIMEOUT_SECS") {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidTimeout(raw.clone()))?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::for_environment(Environment::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_to_development() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.base_url(), DEVELOPMENT_BASE_URL);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn production_preset() {
        let config = ClientConfig::from_lookup(lookup(&[("EXPENSE_API_ENV", "Production")])).unwrap();
        assert_eq!(config.base_url(), PRODUCTION_BASE_URL);
    }

    #[test]
    fn explicit_base_url_and_timeout() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("EXPENSE_API_ENV", "prod"),
            ("EXPENSE_API_BASE_URL", "http://10.0.0.2:8080/api//"),
            ("EXPENSE_API_TIMEOUT_SECS", "15"),
        ]))
        .unwrap();
        assert_eq!(config.base_url(), "http://10.0.0.2:8080/api");
        assert_eq!(config.timeout, Duration::from_secs(15));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[("EXPENSE_API_ENV", "staging")])),
            Err(ConfigError::UnknownEnvironment(_))
        ));
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[("EXPENSE_API_TIMEOUT_SECS", "soon")])),
            Err(ConfigError::InvalidTimeout(_))
        ));
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[("EXPENSE_API_BASE_URL", "localhost:3000")])),
            Err(ConfigError::InvalidBaseUrl(_))
        ));
    }
}

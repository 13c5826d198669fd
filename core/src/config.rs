//! Client configuration: API key and target environment.

use url::Url;

use crate::error::{ApiError, Result};

pub const PRODUCTION_BASE_URL: &str = "https://api.accredible.com/v1/";
pub const STAGING_BASE_URL: &str = "https://staging.accredible.com/v1/";

/// Which deployment of the service the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Production,
    Staging,
}

impl Environment {
    pub fn base_url(&self) -> &'static str {
        match self {
            Environment::Production => PRODUCTION_BASE_URL,
            Environment::Staging => STAGING_BASE_URL,
        }
    }
}

/// API key plus the base URL every route is joined onto.
///
/// The base URL is fixed at construction. Only the key can change
/// afterwards, through `set_api_key`.
#[derive(Clone)]
pub struct ClientConfig {
    api_key: String,
    environment: Environment,
    base_url: String,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>, use_staging: bool) -> Self {
        let environment = if use_staging {
            Environment::Staging
        } else {
            Environment::Production
        };
        Self::for_environment(api_key, environment)
    }

    pub fn for_environment(api_key: impl Into<String>, environment: Environment) -> Self {
        Self {
            api_key: api_key.into(),
            environment,
            base_url: environment.base_url().to_string(),
        }
    }

    /// Point the client at an arbitrary base URL (mock servers, gateways).
    ///
    /// A trailing slash is added when missing so relative routes join under
    /// the given path instead of replacing its last segment.
    pub fn with_base_url(api_key: impl Into<String>, base_url: &str) -> Result<Self> {
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        Url::parse(&normalized)?;
        Ok(Self {
            api_key: api_key.into(),
            environment: Environment::Production,
            base_url: normalized,
        })
    }

    /// Build a config from `ACMS_API_KEY`, `ACMS_STAGING` and `ACMS_BASE_URL`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    ///
    /// `ACMS_BASE_URL` wins over `ACMS_STAGING` when both are set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("ACMS_API_KEY")
            .ok_or_else(|| ApiError::Config("ACMS_API_KEY is not set".to_string()))?;
        if let Some(base_url) = lookup("ACMS_BASE_URL") {
            return Self::with_base_url(api_key, &base_url);
        }
        let staging = lookup("ACMS_STAGING").is_some_and(|v| is_truthy(&v));
        Ok(Self::new(api_key, staging))
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn set_api_key(&mut self, key: impl Into<String>) {
        self.api_key = key.into();
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve a route relative to the base URL.
    pub fn endpoint(&self, route: &str) -> Result<Url> {
        Ok(Url::parse(&self.base_url)?.join(route)?)
    }
}

// Keeps the key out of debug output and logs.
impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("environment", &self.environment)
            .field("base_url", &self.base_url)
            .finish()
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn production_is_the_default() {
        let config = ClientConfig::new("key", false);
        assert_eq!(config.environment(), Environment::Production);
        assert_eq!(config.base_url(), "https://api.accredible.com/v1/");
    }

    #[test]
    fn staging_switches_host() {
        let config = ClientConfig::new("key", true);
        assert_eq!(config.environment(), Environment::Staging);
        assert_eq!(
            config.base_url(),
            "https://staging.accredible.com/v1/"
        );
    }

    #[test]
    fn api_key_can_be_rotated() {
        let mut config = ClientConfig::new("old", false);
        config.set_api_key("new");
        assert_eq!(config.api_key(), "new");
    }

    #[test]
    fn custom_base_url_gets_trailing_slash() {
        let config = ClientConfig::with_base_url("key", "http://127.0.0.1:3000/v1").unwrap();
        assert_eq!(config.base_url(), "http://127.0.0.1:3000/v1/");
    }

    #[test]
    fn endpoint_joins_under_version_prefix() {
        let config = ClientConfig::new("key", false);
        let url = config.endpoint("issuer/groups/7").unwrap();
        assert_eq!(url.as_str(), "https://api.accredible.com/v1/issuer/groups/7");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = ClientConfig::with_base_url("key", "not a url").unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl(_)));
    }

    #[test]
    fn debug_output_redacts_key() {
        let config = ClientConfig::new("secret-key", false);
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret-key"));
    }

    fn vars<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |name: &str| {
            pairs
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn lookup_without_key_is_a_config_error() {
        let err = ClientConfig::from_lookup(vars(&[("ACMS_STAGING", "1")])).unwrap_err();
        match err {
            ApiError::Config(msg) => assert!(msg.contains("ACMS_API_KEY")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn lookup_selects_staging_when_truthy() {
        let config =
            ClientConfig::from_lookup(vars(&[("ACMS_API_KEY", "k"), ("ACMS_STAGING", "true")]))
                .unwrap();
        assert_eq!(config.api_key(), "k");
        assert_eq!(config.environment(), Environment::Staging);
        assert_eq!(config.base_url(), STAGING_BASE_URL);

        let config =
            ClientConfig::from_lookup(vars(&[("ACMS_API_KEY", "k"), ("ACMS_STAGING", "0")]))
                .unwrap();
        assert_eq!(config.environment(), Environment::Production);
    }

    #[test]
    fn lookup_base_url_overrides_environment() {
        let config = ClientConfig::from_lookup(vars(&[
            ("ACMS_API_KEY", "k"),
            ("ACMS_STAGING", "yes"),
            ("ACMS_BASE_URL", "http://localhost:8080/v1"),
        ]))
        .unwrap();
        assert_eq!(config.base_url(), "http://localhost:8080/v1/");

        let err = ClientConfig::from_lookup(vars(&[
            ("ACMS_API_KEY", "k"),
            ("ACMS_BASE_URL", "not a url"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl(_)));
    }

    #[test]
    fn truthy_values() {
        assert!(is_truthy("1"));
        assert!(is_truthy("TRUE"));
        assert!(is_truthy(" yes "));
        assert!(!is_truthy("0"));
        assert!(!is_truthy(""));
    }
}

//! Client configuration.

use std::env;
use std::fmt;

use crate::error::ApiError;

/// Connection settings shared by every request a `Client` builds.
#[derive(Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub user_agent: String,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
            user_agent: default_user_agent(),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Read `BILLING_API_BASE_URL` (required), `BILLING_API_KEY` and
    /// `BILLING_API_USER_AGENT` from the environment.
    ///
    /// For host applications that keep their settings there. `Client` and
    /// `BillingService` never call this; they only see the `ClientConfig`
    /// they are given.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let base_url = lookup("BILLING_API_BASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ApiError::Configuration("BILLING_API_BASE_URL must be set".to_string()))?;

        let mut config = Self::new(base_url.trim());
        if let Some(key) = lookup("BILLING_API_KEY").filter(|v| !v.is_empty()) {
            config = config.with_api_key(key);
        }
        if let Some(agent) = lookup("BILLING_API_USER_AGENT").filter(|v| !v.is_empty()) {
            config = config.with_user_agent(agent);
        }
        Ok(config)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

fn default_user_agent() -> String {
    format!("billing-core/{}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let config = ClientConfig::new("https://api.example.com/v2/");
        assert_eq!(config.base_url, "https://api.example.com/v2");
        assert!(config.api_key.is_none());
        assert!(config.user_agent.starts_with("billing-core/"));
    }

    #[test]
    fn from_env_requires_base_url() {
        let err = ClientConfig::from_lookup(lookup(&[("BILLING_API_KEY", "k")])).unwrap_err();
        assert!(matches!(err, ApiError::Configuration(_)));

        let err = ClientConfig::from_lookup(lookup(&[("BILLING_API_BASE_URL", "  ")])).unwrap_err();
        assert!(matches!(err, ApiError::Configuration(_)));
    }

    #[test]
    fn from_env_reads_optional_values() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("BILLING_API_BASE_URL", "http://localhost:3000/"),
            ("BILLING_API_KEY", "secret"),
            ("BILLING_API_USER_AGENT", "acme/1.0"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.user_agent, "acme/1.0");
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = ClientConfig::new("http://localhost").with_api_key("secret");
        let printed = format!("{config:?}");
        assert!(!printed.contains("secret"));
        assert!(printed.contains("<redacted>"));
    }
}

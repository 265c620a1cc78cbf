//! Client configuration
//!
//! ```
//! use mcpctl_client::ClientConfig;
//!
//! let config = ClientConfig::new()
//!     .with_base_url("https://mcp.example.com")
//!     .unwrap()
//!     .with_user_agent("dashboard/2.0");
//! assert_eq!(config.base_url().as_str(), "https://mcp.example.com/");
//! ```

use thiserror::Error;
use url::Url;

/// Base URL used when nothing is configured
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Environment variable holding the management API base URL
pub const API_URL_ENV: &str = "MCPCTL_API_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid API base URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported API URL scheme '{0}': expected http or https")]
    UnsupportedScheme(String),
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Always ends with '/', so endpoint paths join below it
    pub(crate) base_url: Url,
    pub(crate) user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: normalize(Url::parse(DEFAULT_API_URL).expect("default URL is valid")),
            user_agent: concat!("mcpctl/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the base URL from `MCPCTL_API_URL`, falling back to the default
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(API_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => Self::new().with_base_url(url.trim()),
            _ => Ok(Self::new()),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Result<Self, ConfigError> {
        let parsed = Url::parse(url).map_err(|source| ConfigError::InvalidBaseUrl {
            url: url.to_string(),
            source,
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme(parsed.scheme().to_string()));
        }
        self.base_url = normalize(parsed);
        Ok(self)
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

fn normalize(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

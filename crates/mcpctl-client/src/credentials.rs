//! Bearer token sources
//!
//! Token acquisition is not this crate's business. A provider only hands out
//! whatever token is current at the time of the call, or nothing.

use async_trait::async_trait;

/// Environment variable read by [`EnvToken::default`]
pub const TOKEN_ENV: &str = "MCPCTL_TOKEN";

#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Token to attach to the next request. `None` sends no Authorization header.
    async fn bearer_token(&self) -> Option<String>;
}

/// Anonymous access
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCredentials;

#[async_trait]
impl CredentialProvider for NoCredentials {
    async fn bearer_token(&self) -> Option<String> {
        None
    }
}

/// Fixed token, e.g. from a command-line flag
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StaticToken(***)")
    }
}

#[async_trait]
impl CredentialProvider for StaticToken {
    async fn bearer_token(&self) -> Option<String> {
        non_empty(self.0.clone())
    }
}

/// Token read from an environment variable on every call
#[derive(Debug, Clone)]
pub struct EnvToken {
    var: String,
}

impl EnvToken {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvToken {
    fn default() -> Self {
        Self::new(TOKEN_ENV)
    }
}

#[async_trait]
impl CredentialProvider for EnvToken {
    async fn bearer_token(&self) -> Option<String> {
        std::env::var(&self.var).ok().and_then(non_empty)
    }
}

fn non_empty(token: String) -> Option<String> {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

//! # mcpctl Client
//!
//! Talks to the MCP server management API.
//!
//! ## Modules
//!
//! - `api` - `ServerApi` port implemented by the HTTP client and test doubles
//! - `http` - reqwest adapter for `/api/mcp/servers`
//! - `credentials` - Bearer token providers
//! - `lifecycle` - Command admission, in-flight guard, snapshot application
//! - `logs` - Follow-mode log stream consumer

pub mod api;
pub mod config;
pub mod credentials;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod logs;

pub use api::ServerApi;
pub use config::{ClientConfig, ConfigError, API_URL_ENV, DEFAULT_API_URL};
pub use credentials::{CredentialProvider, EnvToken, NoCredentials, StaticToken, TOKEN_ENV};
pub use error::{ClientError, ClientResult, CommandRejected, LifecycleError, StreamError};
pub use http::ApiClient;
pub use lifecycle::{CommandOutcome, DeletePolicy, InFlightGuard, LifecycleController};
pub use logs::{callbacks, LogSink, LogSubscription};

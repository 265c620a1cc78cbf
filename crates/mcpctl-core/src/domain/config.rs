//! Wire configuration schema accepted and returned by the management API

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::server::ServerTransport;

/// Server configuration as the management API understands it
///
/// Built from a user-facing [`ServerSpec`](super::ServerSpec) by
/// [`project_spec`](crate::projection::project_spec); never edited directly by views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub name: String,

    #[serde(default)]
    pub description: String,

    pub transport: ServerTransport,

    /// Absent lets the backend pick a port
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    #[serde(default)]
    pub environment: HashMap<String, String>,

    pub docker_image: String,

    /// Docker memory limit string (e.g. "512m")
    pub memory_limit: String,

    /// CPU share as a number of cores
    pub cpu_limit: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restart_policy: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<String>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub labels: HashMap<String, String>,

    #[serde(default)]
    pub middleware_config: MiddlewareConfig,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elicitation: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_required: Option<bool>,
}

/// Middleware section of the wire config
///
/// An empty list serializes as `{}`, which the backend reads as "no middleware".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiddlewareConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enabled_middleware: Vec<String>,
}

impl MiddlewareConfig {
    pub fn enabled(names: Vec<String>) -> Self {
        Self {
            enabled_middleware: names,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.enabled_middleware.is_empty()
    }
}

/// Partial wire config sent with `PATCH`; only populated fields are serialized
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerConfigPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<ServerTransport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docker_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_limit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_limit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middleware_config: Option<MiddlewareConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elicitation: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_required: Option<bool>,
}

impl ServerConfigPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

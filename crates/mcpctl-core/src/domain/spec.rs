//! User-facing server specification
//!
//! This is the shape people write (CLI flags, JSON files, forms). It is
//! projected onto [`ServerConfig`](super::ServerConfig) before it reaches the wire.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::server::ServerTransport;

/// Server specification as entered by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSpec {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub transport: ServerTransport,

    /// Container image; falls back to the default image when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<HashMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourceLimits>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middleware: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elicitation: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_required: Option<bool>,
}

impl ServerSpec {
    pub fn new(name: impl Into<String>, transport: ServerTransport) -> Self {
        Self {
            name: name.into(),
            description: None,
            transport,
            image: None,
            env: None,
            port: None,
            resources: None,
            middleware: None,
            elicitation: None,
            auth_required: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn with_port(mut self, port: u32) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_resources(mut self, resources: ResourceLimits) -> Self {
        self.resources = Some(resources);
        self
    }

    pub fn with_middleware(mut self, middleware: Vec<String>) -> Self {
        self.middleware = Some(middleware);
        self
    }
}

/// Resource limits as text, the way users type them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLimits {
    /// Number of cores, e.g. "1.5"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_limit: Option<String>,

    /// Docker memory string, e.g. "256m"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_limit: Option<String>,
}

impl ResourceLimits {
    pub fn new(cpu_limit: Option<&str>, memory_limit: Option<&str>) -> Self {
        Self {
            cpu_limit: cpu_limit.map(String::from),
            memory_limit: memory_limit.map(String::from),
        }
    }
}

/// Partial specification for updates; `None` means "leave unchanged"
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerSpecPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub transport: Option<ServerTransport>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub env: Option<HashMap<String, String>>,
    #[serde(default)]
    pub port: Option<u32>,
    #[serde(default)]
    pub resources: Option<ResourceLimits>,
    #[serde(default)]
    pub middleware: Option<Vec<String>>,
    #[serde(default)]
    pub elicitation: Option<bool>,
    #[serde(default)]
    pub auth_required: Option<bool>,
}

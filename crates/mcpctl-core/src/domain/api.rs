//! Request/response envelopes of the management API

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::server::ManagedServer;

/// `GET /api/mcp/servers`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerListResponse {
    pub servers: Vec<ManagedServer>,
    #[serde(default)]
    pub total: usize,
}

/// Result of `start`, `stop` and `restart`
///
/// A 2xx response only means the request was received; `success` tells
/// whether the backend actually carried the command out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub server: Option<ManagedServer>,
}

impl CommandResponse {
    pub fn accepted(&self) -> bool {
        self.success
    }
}

/// `POST /api/mcp/servers/{id}/elicit` body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElicitationRequest {
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<HashMap<String, serde_json::Value>>,
}

impl ElicitationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            context: None,
        }
    }

    pub fn with_context(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.context
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElicitationResponse {
    pub response: String,
    #[serde(default)]
    pub tool_calls: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub metadata: Option<HashMap<String, serde_json::Value>>,
}

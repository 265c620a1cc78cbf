//! ManagedServer entity - a remotely administered MCP server

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::config::ServerConfig;
use super::lifecycle::LifecycleCommand;
use crate::projection::ProjectionError;

/// Opaque server identifier assigned by the management API
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerId(String);

impl ServerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ServerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ServerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Server status as last reported by the management API
///
/// The client never derives this value itself; it is replaced only from
/// snapshots returned by the remote system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerStatus {
    Stopped,
    Starting,
    Running,
    Stopping,
    Error,
}

impl ServerStatus {
    pub const ALL: [ServerStatus; 5] = [
        ServerStatus::Stopped,
        ServerStatus::Starting,
        ServerStatus::Running,
        ServerStatus::Stopping,
        ServerStatus::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Error => "error",
        }
    }

    /// Starting/Stopping: another command is already being carried out remotely
    pub fn is_transitional(&self) -> bool {
        matches!(self, Self::Starting | Self::Stopping)
    }

    /// Whether the transition table admits `command` in this status
    pub fn permits(&self, command: LifecycleCommand) -> bool {
        super::lifecycle::admissible_commands(*self).contains(&command)
    }
}

impl fmt::Display for ServerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport kind exposed by the managed server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerTransport {
    Stdio,
    /// Deprecated in favour of `StreamableHttp`, still a valid wire value
    Sse,
    StreamableHttp,
}

impl ServerTransport {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stdio => "stdio",
            Self::Sse => "sse",
            Self::StreamableHttp => "streamable_http",
        }
    }

    pub fn is_deprecated(&self) -> bool {
        matches!(self, Self::Sse)
    }
}

impl fmt::Display for ServerTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServerTransport {
    type Err = ProjectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stdio" => Ok(Self::Stdio),
            "sse" => Ok(Self::Sse),
            "streamable_http" | "streamable-http" => Ok(Self::StreamableHttp),
            other => Err(ProjectionError::UnknownTransport(other.to_string())),
        }
    }
}

/// Runtime status record embedded in every server snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerRuntimeStatus {
    #[serde(default)]
    pub server_id: String,

    pub status: ServerStatus,

    #[serde(default)]
    pub container_id: Option<String>,

    #[serde(default, with = "timestamp::option")]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(default, with = "timestamp::option")]
    pub stopped_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub health_check_passed: bool,

    #[serde(default, with = "timestamp::option")]
    pub last_health_check: Option<DateTime<Utc>>,

    #[serde(default)]
    pub error_message: Option<String>,

    #[serde(default)]
    pub resource_usage: HashMap<String, serde_json::Value>,
}

impl ServerRuntimeStatus {
    /// Minimal status record, mostly useful for fixtures
    pub fn new(server_id: impl Into<String>, status: ServerStatus) -> Self {
        Self {
            server_id: server_id.into(),
            status,
            container_id: None,
            started_at: None,
            stopped_at: None,
            health_check_passed: false,
            last_health_check: None,
            error_message: None,
            resource_usage: HashMap::new(),
        }
    }
}

/// A server managed through the remote management API
///
/// Snapshots of this type are authoritative: the collection replaces a
/// server wholesale with the latest snapshot instead of patching fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagedServer {
    pub id: ServerId,

    /// Wire configuration the server was created with
    pub config: ServerConfig,

    pub status: ServerRuntimeStatus,

    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,

    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,

    #[serde(default)]
    pub created_by: String,

    #[serde(default)]
    pub container_name: Option<String>,

    #[serde(default)]
    pub access_token: Option<String>,

    #[serde(default)]
    pub api_url: Option<String>,

    // Hints computed by the backend. The controller relies on its own
    // transition table, never on these.
    #[serde(default)]
    pub is_running: Option<bool>,
    #[serde(default)]
    pub can_start: Option<bool>,
    #[serde(default)]
    pub can_stop: Option<bool>,
}

impl ManagedServer {
    /// Current reported status value
    pub fn current_status(&self) -> ServerStatus {
        self.status.status
    }

    /// Display label
    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.status.started_at
    }
}

/// Lenient timestamp handling: the backend emits RFC 3339 strings, sometimes
/// without an offset. Offset-less values are taken as UTC.
pub(crate) mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
    }

    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(dt) => serializer.serialize_some(&dt.to_rfc3339()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            let raw: Option<String> = Option::deserialize(deserializer)?;
            match raw {
                None => Ok(None),
                Some(raw) => parse(&raw)
                    .map(Some)
                    .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}"))),
            }
        }
    }
}

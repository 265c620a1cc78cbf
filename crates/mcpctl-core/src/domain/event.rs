//! Events emitted when the locally held server collection changes

use serde::Serialize;

use super::server::{ServerId, ServerStatus};

/// Change notifications for views that mirror the server collection
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// The whole collection was replaced from a list call
    ServersRefreshed { total: usize },

    /// A server was replaced by an authoritative snapshot
    ServerUpdated {
        server_id: ServerId,
        status: ServerStatus,
    },

    /// A server was deleted remotely and dropped locally
    ServerRemoved { server_id: ServerId },
}

impl ServerEvent {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::ServersRefreshed { .. } => "servers_refreshed",
            Self::ServerUpdated { .. } => "server_updated",
            Self::ServerRemoved { .. } => "server_removed",
        }
    }

    pub fn server_id(&self) -> Option<&ServerId> {
        match self {
            Self::ServersRefreshed { .. } => None,
            Self::ServerUpdated { server_id, .. } | Self::ServerRemoved { server_id } => {
                Some(server_id)
            }
        }
    }
}

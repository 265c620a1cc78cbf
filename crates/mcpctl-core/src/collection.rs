//! Locally held view of the managed servers
//!
//! The collection only changes through whole-snapshot operations: a list
//! refresh replaces everything, a lifecycle result replaces one server, a
//! delete removes one. Fields are never patched in place.

use parking_lot::RwLock;
use tracing::debug;

use crate::domain::{ManagedServer, ServerEvent, ServerId, ServerStatus};
use crate::event_bus::EventSender;

/// Servers as last reported by the management API, in API order
#[derive(Default)]
pub struct ServerCollection {
    servers: RwLock<Vec<ManagedServer>>,
    events: Option<EventSender>,
}

impl ServerCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a [`ServerEvent`] for every change
    pub fn with_events(mut self, sender: EventSender) -> Self {
        self.events = Some(sender);
        self
    }

    pub fn from_servers(servers: Vec<ManagedServer>) -> Self {
        Self {
            servers: RwLock::new(servers),
            events: None,
        }
    }

    /// Replace the whole collection with a fresh list
    pub fn replace_all(&self, servers: Vec<ManagedServer>) {
        let total = servers.len();
        *self.servers.write() = servers;
        debug!(total, "[ServerCollection] Replaced from list");
        self.emit(ServerEvent::ServersRefreshed { total });
    }

    /// Replace one server with an authoritative snapshot (appended if unknown)
    pub fn upsert(&self, snapshot: ManagedServer) {
        let server_id = snapshot.id.clone();
        let status = snapshot.current_status();
        {
            let mut servers = self.servers.write();
            match servers.iter_mut().find(|s| s.id == snapshot.id) {
                Some(existing) => *existing = snapshot,
                None => servers.push(snapshot),
            }
        }
        debug!(server_id = %server_id, status = %status, "[ServerCollection] Snapshot applied");
        self.emit(ServerEvent::ServerUpdated { server_id, status });
    }

    /// Drop a deleted server
    pub fn remove(&self, id: &ServerId) -> Option<ManagedServer> {
        let removed = {
            let mut servers = self.servers.write();
            let index = servers.iter().position(|s| &s.id == id)?;
            servers.remove(index)
        };
        debug!(server_id = %id, "[ServerCollection] Removed");
        self.emit(ServerEvent::ServerRemoved {
            server_id: id.clone(),
        });
        Some(removed)
    }

    pub fn get(&self, id: &ServerId) -> Option<ManagedServer> {
        self.servers.read().iter().find(|s| &s.id == id).cloned()
    }

    pub fn status_of(&self, id: &ServerId) -> Option<ServerStatus> {
        self.servers
            .read()
            .iter()
            .find(|s| &s.id == id)
            .map(ManagedServer::current_status)
    }

    pub fn contains(&self, id: &ServerId) -> bool {
        self.servers.read().iter().any(|s| &s.id == id)
    }

    pub fn snapshot(&self) -> Vec<ManagedServer> {
        self.servers.read().clone()
    }

    pub fn len(&self) -> usize {
        self.servers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.read().is_empty()
    }

    fn emit(&self, event: ServerEvent) {
        if let Some(sender) = &self.events {
            sender.emit(event);
        }
    }
}

//! Per-server in-flight guard
//!
//! At most one lifecycle action per server id. Admission goes through the
//! map's entry API so two callers racing for the same id cannot both win;
//! different ids live in different entries and never contend.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use mcpctl_core::{InFlightAction, ServerId};
use tracing::trace;

#[derive(Debug, Clone, Default)]
pub struct InFlightGuard {
    actions: Arc<DashMap<ServerId, InFlightAction>>,
}

impl InFlightGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self, id: &ServerId) -> Option<InFlightAction> {
        self.actions.get(id).map(|entry| *entry.value())
    }

    /// Record `action` for `id`, or return the action already running
    pub fn try_admit(
        &self,
        id: &ServerId,
        action: InFlightAction,
    ) -> Result<InFlightPermit, InFlightAction> {
        match self.actions.entry(id.clone()) {
            Entry::Occupied(existing) => Err(*existing.get()),
            Entry::Vacant(slot) => {
                slot.insert(action);
                trace!(server_id = %id, %action, "[InFlightGuard] Admitted");
                Ok(InFlightPermit {
                    actions: Arc::clone(&self.actions),
                    server_id: id.clone(),
                    action,
                })
            }
        }
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Proof of admission. The entry is cleared when the permit is dropped, so
/// every exit path (success, failure, cancelled future) releases it once.
#[derive(Debug)]
pub struct InFlightPermit {
    actions: Arc<DashMap<ServerId, InFlightAction>>,
    server_id: ServerId,
    action: InFlightAction,
}

impl InFlightPermit {
    pub fn action(&self) -> InFlightAction {
        self.action
    }
}

impl Drop for InFlightPermit {
    fn drop(&mut self) {
        self.actions.remove(&self.server_id);
        trace!(server_id = %self.server_id, action = %self.action, "[InFlightGuard] Released");
    }
}

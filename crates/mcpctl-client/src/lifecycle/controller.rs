//! LifecycleController - gatekeeper for start/stop/restart/delete
//!
//! Every command is checked locally before anything goes over the wire:
//!
//! 1. the server must be present in the caller's collection,
//! 2. no other action may be in flight for it,
//! 3. the transition table must admit the command in the reported status,
//! 4. the delete policy must allow it.
//!
//! `execute` records the action first and reads the status while holding it,
//! so a command that finished in between is never checked against a stale
//! status. The collection is updated from the returned snapshot before the
//! action is released; the client never guesses a status.

use std::sync::Arc;

use mcpctl_core::{
    admissible_commands, project_patch, project_spec, CommandResponse, InFlightAction,
    LifecycleCommand, ManagedServer, ServerCollection, ServerId, ServerSpec, ServerSpecPatch,
    ServerStatus,
};
use tracing::{debug, info};

use super::guard::InFlightGuard;
use crate::api::ServerApi;
use crate::error::{CommandRejected, LifecycleError};

/// Whether `delete` is admitted while a server is running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeletePolicy {
    #[default]
    AllowRunning,
    RequireStopped,
}

/// Result of an accepted command
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutcome {
    pub server_id: ServerId,
    pub command: LifecycleCommand,
    /// Message reported by the backend (empty for delete)
    pub message: String,
    /// Snapshot applied to the collection, if the backend returned one
    pub server: Option<ManagedServer>,
}

pub struct LifecycleController {
    api: Arc<dyn ServerApi>,
    guard: InFlightGuard,
    delete_policy: DeletePolicy,
}

impl LifecycleController {
    pub fn new(api: Arc<dyn ServerApi>) -> Self {
        Self {
            api,
            guard: InFlightGuard::new(),
            delete_policy: DeletePolicy::default(),
        }
    }

    pub fn with_delete_policy(mut self, policy: DeletePolicy) -> Self {
        self.delete_policy = policy;
        self
    }

    pub fn delete_policy(&self) -> DeletePolicy {
        self.delete_policy
    }

    pub fn in_flight(&self, id: &ServerId) -> Option<InFlightAction> {
        self.guard.current(id)
    }

    /// Commands that would pass [`Self::check`] right now
    pub fn admissible(&self, servers: &ServerCollection, id: &ServerId) -> Vec<LifecycleCommand> {
        LifecycleCommand::ALL
            .into_iter()
            .filter(|command| self.check(servers, id, *command).is_ok())
            .collect()
    }

    /// Local admission checks, without recording anything
    pub fn check(
        &self,
        servers: &ServerCollection,
        id: &ServerId,
        command: LifecycleCommand,
    ) -> Result<ServerStatus, CommandRejected> {
        let status = servers
            .status_of(id)
            .ok_or_else(|| CommandRejected::UnknownServer {
                server_id: id.clone(),
            })?;

        if let Some(action) = self.guard.current(id) {
            return Err(CommandRejected::InFlight {
                server_id: id.clone(),
                action,
            });
        }

        self.check_transition(id, status, command)?;
        Ok(status)
    }

    /// Transition table plus delete policy
    fn check_transition(
        &self,
        id: &ServerId,
        status: ServerStatus,
        command: LifecycleCommand,
    ) -> Result<(), CommandRejected> {
        if !admissible_commands(status).contains(&command) {
            return Err(CommandRejected::InvalidTransition {
                server_id: id.clone(),
                status,
                command,
            });
        }

        if command == LifecycleCommand::Delete
            && status == ServerStatus::Running
            && self.delete_policy == DeletePolicy::RequireStopped
        {
            return Err(CommandRejected::DeleteWhileRunning {
                server_id: id.clone(),
            });
        }

        Ok(())
    }

    /// Run one lifecycle command against a server in `servers`
    ///
    /// Rejections never reach the network. On an accepted command the returned
    /// snapshot replaces the server in `servers` (a delete removes it). A
    /// command the backend did not accept, or any transport failure, leaves
    /// `servers` untouched.
    pub async fn execute(
        &self,
        servers: &ServerCollection,
        id: &ServerId,
        command: LifecycleCommand,
    ) -> Result<CommandOutcome, LifecycleError> {
        let unknown = || CommandRejected::UnknownServer {
            server_id: id.clone(),
        };
        if !servers.contains(id) {
            return Err(unknown().into());
        }

        let permit = self
            .guard
            .try_admit(id, command.in_flight_action())
            .map_err(|action| CommandRejected::InFlight {
                server_id: id.clone(),
                action,
            })?;

        let status = servers.status_of(id).ok_or_else(unknown)?;
        self.check_transition(id, status, command)?;

        debug!(
            server_id = %id,
            %command,
            %status,
            "[LifecycleController] Dispatching command"
        );

        let outcome = match command {
            LifecycleCommand::Delete => self.delete(servers, id).await,
            LifecycleCommand::Start => {
                let response = self.api.start_server(id).await?;
                self.apply(servers, id, command, response)
            }
            LifecycleCommand::Stop => {
                let response = self.api.stop_server(id).await?;
                self.apply(servers, id, command, response)
            }
            LifecycleCommand::Restart => {
                let response = self.api.restart_server(id).await?;
                self.apply(servers, id, command, response)
            }
        };

        drop(permit);
        outcome
    }

    /// Replace `servers` with the current list from the API
    pub async fn refresh(&self, servers: &ServerCollection) -> Result<usize, LifecycleError> {
        let list = self.api.list_servers().await?;
        let count = list.servers.len();
        servers.replace_all(list.servers);
        Ok(count)
    }

    /// Project `spec`, create the server and add it to `servers`
    pub async fn create(
        &self,
        servers: &ServerCollection,
        spec: &ServerSpec,
    ) -> Result<ManagedServer, LifecycleError> {
        let config = project_spec(spec)?;
        let created = self.api.create_server(&config).await?;
        info!(server_id = %created.id, name = %created.name(), "[LifecycleController] Server created");
        servers.upsert(created.clone());
        Ok(created)
    }

    /// Apply a partial spec to a known server
    pub async fn update(
        &self,
        servers: &ServerCollection,
        id: &ServerId,
        patch: &ServerSpecPatch,
    ) -> Result<ManagedServer, LifecycleError> {
        let wire = project_patch(patch)?;
        if !servers.contains(id) {
            return Err(CommandRejected::UnknownServer {
                server_id: id.clone(),
            }
            .into());
        }
        if let Some(action) = self.guard.current(id) {
            return Err(CommandRejected::InFlight {
                server_id: id.clone(),
                action,
            }
            .into());
        }

        let updated = self.api.update_server(id, &wire).await?;
        servers.upsert(updated.clone());
        Ok(updated)
    }

    async fn delete(
        &self,
        servers: &ServerCollection,
        id: &ServerId,
    ) -> Result<CommandOutcome, LifecycleError> {
        self.api.delete_server(id).await?;
        servers.remove(id);
        info!(server_id = %id, "[LifecycleController] Server deleted");

        Ok(CommandOutcome {
            server_id: id.clone(),
            command: LifecycleCommand::Delete,
            message: String::new(),
            server: None,
        })
    }

    fn apply(
        &self,
        servers: &ServerCollection,
        id: &ServerId,
        command: LifecycleCommand,
        response: CommandResponse,
    ) -> Result<CommandOutcome, LifecycleError> {
        if !response.accepted() {
            debug!(
                server_id = %id,
                %command,
                message = %response.message,
                "[LifecycleController] Command not accepted"
            );
            return Err(LifecycleError::NotAccepted {
                server_id: id.clone(),
                command,
                message: response.message,
            });
        }

        match &response.server {
            Some(snapshot) => servers.upsert(snapshot.clone()),
            None => debug!(
                server_id = %id,
                %command,
                "[LifecycleController] Accepted without snapshot; collection unchanged"
            ),
        }

        info!(server_id = %id, %command, "[LifecycleController] Command accepted");
        Ok(CommandOutcome {
            server_id: id.clone(),
            command,
            message: response.message,
            server: response.server,
        })
    }
}

//! Port for the management API
//!
//! The lifecycle controller depends on this trait only, so it can be driven by
//! the reqwest adapter ([`crate::ApiClient`]) or a scripted double in tests.

use async_trait::async_trait;
use mcpctl_core::{
    CommandResponse, ElicitationRequest, ElicitationResponse, ManagedServer, ServerConfig,
    ServerConfigPatch, ServerId, ServerListResponse,
};

use crate::error::ClientResult;

#[async_trait]
pub trait ServerApi: Send + Sync {
    async fn list_servers(&self) -> ClientResult<ServerListResponse>;

    async fn get_server(&self, id: &ServerId) -> ClientResult<ManagedServer>;

    async fn create_server(&self, config: &ServerConfig) -> ClientResult<ManagedServer>;

    async fn update_server(
        &self,
        id: &ServerId,
        patch: &ServerConfigPatch,
    ) -> ClientResult<ManagedServer>;

    async fn delete_server(&self, id: &ServerId) -> ClientResult<()>;

    async fn start_server(&self, id: &ServerId) -> ClientResult<CommandResponse>;

    async fn stop_server(&self, id: &ServerId) -> ClientResult<CommandResponse>;

    async fn restart_server(&self, id: &ServerId) -> ClientResult<CommandResponse>;

    async fn elicit(
        &self,
        id: &ServerId,
        request: &ElicitationRequest,
    ) -> ClientResult<ElicitationResponse>;
}

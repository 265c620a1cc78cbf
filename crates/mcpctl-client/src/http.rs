//! reqwest adapter for the management API
//!
//! Stateless per call: nothing is cached between requests and no call is ever
//! retried. Transport-level timeouts are deliberately not configured.

use std::sync::Arc;

use async_trait::async_trait;
use mcpctl_core::{
    CommandResponse, ElicitationRequest, ElicitationResponse, ManagedServer, ServerConfig,
    ServerConfigPatch, ServerId, ServerListResponse,
};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::api::ServerApi;
use crate::config::ClientConfig;
use crate::credentials::{CredentialProvider, NoCredentials};
use crate::error::{ClientError, ClientResult};
use crate::logs::{self, LogSink, LogSubscription};

const SERVERS_PATH: &str = "api/mcp/servers";
const JSON: &str = "application/json";

/// HTTP client for `/api/mcp/servers`
#[derive(Clone)]
pub struct ApiClient {
    base_url: Url,
    http: reqwest::Client,
    credentials: Arc<dyn CredentialProvider>,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        Self::with_credentials(config, Arc::new(NoCredentials))
    }

    pub fn with_credentials(
        config: ClientConfig,
        credentials: Arc<dyn CredentialProvider>,
    ) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            base_url: config.base_url,
            http,
            credentials,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Open `GET .../logs?follow=true` and feed its payload lines to `sink`
    ///
    /// A non-2xx answer fails here, before any subscription exists. Failures
    /// after the stream is open go to [`LogSink::on_error`].
    pub async fn stream_logs<S>(&self, id: &ServerId, sink: S) -> ClientResult<LogSubscription>
    where
        S: LogSink,
    {
        let mut url = self.server_url(id, Some("logs"))?;
        url.query_pairs_mut().append_pair("follow", "true");

        // No Content-Type on the streaming request
        let response = self.authorized(Method::GET, url).await.send().await?;
        let response = check_status(response).await?;

        debug!(server_id = %id, "[ApiClient] Log stream opened");
        Ok(logs::subscribe(id.clone(), response.bytes_stream(), sink))
    }

    fn servers_url(&self) -> ClientResult<Url> {
        Ok(self.base_url.join(SERVERS_PATH)?)
    }

    fn server_url(&self, id: &ServerId, action: Option<&str>) -> ClientResult<Url> {
        let mut path = format!("{}/{}", SERVERS_PATH, urlencoding::encode(id.as_str()));
        if let Some(action) = action {
            path.push('/');
            path.push_str(action);
        }
        Ok(self.base_url.join(&path)?)
    }

    async fn authorized(&self, method: Method, url: Url) -> RequestBuilder {
        trace!(%method, %url, "[ApiClient] Request");
        let request = self.http.request(method, url);
        match self.credentials.bearer_token().await {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Mutating requests always declare a JSON body, even when they carry none
    async fn mutating(&self, method: Method, url: Url) -> RequestBuilder {
        self.authorized(method, url).await.header(CONTENT_TYPE, JSON)
    }

    async fn command(&self, id: &ServerId, action: &str) -> ClientResult<CommandResponse> {
        let url = self.server_url(id, Some(action))?;
        let response = self.mutating(Method::POST, url).await.send().await?;
        let envelope: CommandResponse = read_json(response).await?;
        debug!(
            server_id = %id,
            action,
            success = envelope.success,
            "[ApiClient] Command answered"
        );
        Ok(envelope)
    }
}

#[async_trait]
impl ServerApi for ApiClient {
    async fn list_servers(&self) -> ClientResult<ServerListResponse> {
        let url = self.servers_url()?;
        let response = self.authorized(Method::GET, url).await.send().await?;
        read_json(response).await
    }

    async fn get_server(&self, id: &ServerId) -> ClientResult<ManagedServer> {
        let url = self.server_url(id, None)?;
        let response = self.authorized(Method::GET, url).await.send().await?;
        read_json(response).await
    }

    async fn create_server(&self, config: &ServerConfig) -> ClientResult<ManagedServer> {
        let url = self.servers_url()?;
        let response = self
            .mutating(Method::POST, url)
            .await
            .json(config)
            .send()
            .await?;
        read_json(response).await
    }

    async fn update_server(
        &self,
        id: &ServerId,
        patch: &ServerConfigPatch,
    ) -> ClientResult<ManagedServer> {
        let url = self.server_url(id, None)?;
        let response = self
            .mutating(Method::PATCH, url)
            .await
            .json(patch)
            .send()
            .await?;
        read_json(response).await
    }

    async fn delete_server(&self, id: &ServerId) -> ClientResult<()> {
        let url = self.server_url(id, None)?;
        let response = self.mutating(Method::DELETE, url).await.send().await?;
        check_status(response).await?;
        Ok(())
    }

    async fn start_server(&self, id: &ServerId) -> ClientResult<CommandResponse> {
        self.command(id, "start").await
    }

    async fn stop_server(&self, id: &ServerId) -> ClientResult<CommandResponse> {
        self.command(id, "stop").await
    }

    async fn restart_server(&self, id: &ServerId) -> ClientResult<CommandResponse> {
        self.command(id, "restart").await
    }

    async fn elicit(
        &self,
        id: &ServerId,
        request: &ElicitationRequest,
    ) -> ClientResult<ElicitationResponse> {
        let url = self.server_url(id, Some("elicit"))?;
        let response = self
            .mutating(Method::POST, url)
            .await
            .json(request)
            .send()
            .await?;
        read_json(response).await
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let response = check_status(response).await?;
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| ClientError::InvalidResponse(e.to_string()))
}

/// Pass 2xx responses through, turn everything else into `RequestFailed`
async fn check_status(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let fallback = status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
    let detail = match response.text().await {
        Ok(body) => extract_detail(&body).unwrap_or(fallback),
        Err(_) => fallback,
    };

    debug!(status = status.as_u16(), %detail, "[ApiClient] Request failed");
    Err(ClientError::RequestFailed {
        status: status.as_u16(),
        detail,
    })
}

fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value.get("detail")?.as_str().map(str::to_string)
}

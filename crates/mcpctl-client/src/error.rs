//! Error types for the client crate

use mcpctl_core::{
    InFlightAction, LifecycleCommand, ProjectionError, ServerId, ServerStatus,
};
use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

/// Failure talking to the management API
#[derive(Debug, Error)]
pub enum ClientError {
    /// Non-2xx answer. `detail` is the body's `detail` string when present,
    /// the HTTP status text otherwise.
    #[error("request failed ({status}): {detail}")]
    RequestFailed { status: u16, detail: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RequestFailed { status, .. } => Some(*status),
            Self::Network(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Local admission failure; nothing was sent
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandRejected {
    #[error("server {server_id} is unknown or has been deleted")]
    UnknownServer { server_id: ServerId },

    #[error("server {server_id} is busy ({action} in progress)")]
    InFlight {
        server_id: ServerId,
        action: InFlightAction,
    },

    #[error("cannot {command} server {server_id} while it is {status}")]
    InvalidTransition {
        server_id: ServerId,
        status: ServerStatus,
        command: LifecycleCommand,
    },

    #[error("server {server_id} must be stopped before it can be deleted")]
    DeleteWhileRunning { server_id: ServerId },
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Rejected(#[from] CommandRejected),

    /// The API answered 2xx but reported the command as not accepted
    #[error("{command} of server {server_id} was not accepted: {message}")]
    NotAccepted {
        server_id: ServerId,
        command: LifecycleCommand,
        message: String,
    },

    #[error(transparent)]
    Projection(#[from] ProjectionError),

    #[error(transparent)]
    Transport(#[from] ClientError),
}

impl LifecycleError {
    /// True when the failure happened before any request was issued
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Rejected(_) | Self::Projection(_))
    }

    pub fn rejection(&self) -> Option<&CommandRejected> {
        match self {
            Self::Rejected(rejected) => Some(rejected),
            _ => None,
        }
    }
}

/// Failure while reading an open log stream
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    #[error("log stream read failed: {0}")]
    Read(String),
}

impl StreamError {
    pub(crate) fn read(err: impl std::fmt::Display) -> Self {
        Self::Read(err.to_string())
    }
}

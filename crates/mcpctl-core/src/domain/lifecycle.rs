//! Lifecycle commands and the static transition table
//!
//! ```text
//!  status     start  stop  restart  delete
//!  stopped      ✓     ✗      ✗        ✓
//!  starting     ✗     ✗      ✗        ✗
//!  running      ✗     ✓      ✓        ✓   (subject to DeletePolicy)
//!  stopping     ✗     ✗      ✗        ✗
//!  error        ✓     ✗      ✗        ✓
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use super::server::ServerStatus;

/// Command a caller can issue against a managed server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleCommand {
    Start,
    Stop,
    Restart,
    Delete,
}

impl LifecycleCommand {
    pub const ALL: [LifecycleCommand; 4] = [
        LifecycleCommand::Start,
        LifecycleCommand::Stop,
        LifecycleCommand::Restart,
        LifecycleCommand::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Restart => "restart",
            Self::Delete => "delete",
        }
    }

    /// Tag recorded in the in-flight guard while this command runs
    pub fn in_flight_action(&self) -> InFlightAction {
        match self {
            Self::Start => InFlightAction::Starting,
            Self::Stop => InFlightAction::Stopping,
            Self::Restart => InFlightAction::Restarting,
            Self::Delete => InFlightAction::Deleting,
        }
    }
}

impl fmt::Display for LifecycleCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Action currently being executed for a server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InFlightAction {
    Starting,
    Stopping,
    Restarting,
    Deleting,
}

impl InFlightAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::Stopping => "stopping",
            Self::Restarting => "restarting",
            Self::Deleting => "deleting",
        }
    }
}

impl fmt::Display for InFlightAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Commands admitted by the transition table for a reported status
pub fn admissible_commands(status: ServerStatus) -> &'static [LifecycleCommand] {
    use LifecycleCommand::*;

    match status {
        ServerStatus::Stopped | ServerStatus::Error => &[Start, Delete],
        ServerStatus::Running => &[Stop, Restart, Delete],
        ServerStatus::Starting | ServerStatus::Stopping => &[],
    }
}

//! Domain entities, value objects, and events
//!
//! - Entities: `ManagedServer`
//! - Value objects: `ServerId`, `ServerStatus`, `ServerTransport`, `LifecycleCommand`
//! - Wire and user-facing configuration shapes
//! - `ServerEvent` for collection change notifications

mod api;
mod config;
mod event;
mod lifecycle;
mod log;
mod server;
mod spec;

pub use api::*;
pub use config::*;
pub use event::ServerEvent;
pub use lifecycle::{admissible_commands, InFlightAction, LifecycleCommand};
pub use log::{LogLevel, LogLine, ServerLogEntry};
pub use server::{ManagedServer, ServerId, ServerRuntimeStatus, ServerStatus, ServerTransport};
pub use spec::*;

//! # mcpctl Core Library
//!
//! Domain types and pure rules for controlling remotely managed MCP servers.
//!
//! ## Modules
//!
//! - `domain` - Managed servers, statuses, lifecycle commands, wire/user config shapes
//! - `projection` - Mapping between the user-facing spec and the wire schema
//! - `collection` - Caller-held server collection, replaced only by snapshots
//! - `event_bus` - Broadcast of collection changes

pub mod collection;
pub mod domain;
pub mod event_bus;
pub mod projection;

pub use collection::ServerCollection;
pub use domain::*;
pub use event_bus::{EventBus, EventReceiver, EventSender, SharedEventBus};
pub use projection::{project_patch, project_spec, spec_from_config, ProjectionError};

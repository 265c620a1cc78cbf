//! Lifecycle control of managed servers

mod controller;
mod guard;

pub use controller::{CommandOutcome, DeletePolicy, LifecycleController};
pub use guard::{InFlightGuard, InFlightPermit};

//! Follow-mode log streaming
//!
//! The stream is line framed: lines starting with `data: ` carry one log
//! payload each, every other line is ignored. [`subscribe`] runs a consumer
//! task over any byte-chunk stream and hands back a [`LogSubscription`] that
//! cancels it.

mod decoder;
mod subscription;

pub use decoder::{FrameDecoder, DATA_PREFIX};
pub use subscription::{callbacks, subscribe, Callbacks, LogSink, LogSubscription};

//! Playback engine and its `rodio` backend.
//!
//! [`PlaybackEngine`] is a plain state machine driven from the event loop.
//! Fetching and decoding happen on loader threads that report back with
//! [`EngineEvent`]s over an mpsc channel.

mod engine;
mod loader;
mod resource;
mod sink;
mod tap;
mod types;

pub use engine::{DEFAULT_RESTORE_VOLUME, PlaybackEngine};
pub use loader::RodioLoader;
pub use resource::{PlaybackResource, ResourceLoader};
pub use tap::{SampleTap, TapGuard};
pub use types::{EngineEvent, LoadRequest, PlaybackError, PlaybackSession, PlaybackState};

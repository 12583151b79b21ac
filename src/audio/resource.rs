use std::time::Duration;

use super::tap::SampleTap;
use super::types::{LoadRequest, PlaybackError};

/// A loaded, decodable piece of audio attached to the output.
///
/// Resources start paused. Dropping one must silence it.
pub trait PlaybackResource: Send {
    fn play(&mut self) -> Result<(), PlaybackError>;

    fn pause(&mut self);

    fn seek(&mut self, to: Duration) -> Result<(), PlaybackError>;

    fn set_volume(&mut self, volume: f32);

    fn position(&self) -> Duration;

    /// `None` when the decoder cannot tell.
    fn total_duration(&self) -> Option<Duration>;

    /// True once every sample has been played.
    fn is_finished(&self) -> bool;

    /// Read-only sample feed for the analyzer, if this resource provides one.
    fn sample_tap(&self) -> Option<SampleTap>;

    /// Ramp the volume down to silence over `over`. Blocks.
    fn fade_out(&mut self, _over: Duration) {}

    /// Stop output and release the underlying sink.
    fn stop(&mut self);
}

/// Produces resources off the event-loop thread.
///
/// `load` must return quickly; the result is reported later as an
/// [`EngineEvent`](super::EngineEvent) carrying `request.seq`.
pub trait ResourceLoader {
    fn load(&self, request: LoadRequest);
}

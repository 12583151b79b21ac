use crate::audio::{PlaybackSession, PlaybackState};
use crate::mpris::MprisHandle;

/// What MPRIS last saw; used to skip redundant updates.
#[derive(Debug, Default, PartialEq)]
pub struct MprisSnapshot {
    track_id: Option<u64>,
    state: PlaybackState,
    total_micros: i64,
}

impl MprisSnapshot {
    pub fn of(session: &PlaybackSession) -> Self {
        Self {
            track_id: session.current_track.as_ref().map(|t| t.id),
            state: session.state,
            total_micros: (session.total_secs * 1_000_000.0) as i64,
        }
    }
}

pub fn update_mpris(mpris: &MprisHandle, session: &PlaybackSession) {
    mpris.set_track_metadata(session.current_track.as_ref(), session.total_secs);
    mpris.set_playback(session.state);
}

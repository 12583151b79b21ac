use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::analyzer::FrequencyAnalyzer;
use crate::catalog::{DataProvider, Track};

use super::resource::{PlaybackResource, ResourceLoader};
use super::types::{
    EngineEvent, LoadRequest, PlaybackError, PlaybackSession, PlaybackState, clamp_volume,
};

/// Volume restored on unmute when no audible level was ever set.
pub const DEFAULT_RESTORE_VOLUME: f32 = 0.7;

/// Owns the single playback session and the resource behind it.
///
/// Lives on the event-loop thread. Loads finish asynchronously and come back
/// through [`PlaybackEngine::handle_event`]; a completion whose sequence is
/// older than the latest load is discarded.
pub struct PlaybackEngine {
    session: PlaybackSession,
    resource: Option<Box<dyn PlaybackResource>>,
    loader: Box<dyn ResourceLoader>,
    provider: Arc<dyn DataProvider>,
    analyzer: FrequencyAnalyzer,
    load_seq: u64,
    pending_seek: Option<f64>,
    last_audible_volume: Option<f32>,
    /// The resource reported its own length; otherwise `total_secs` is a guess.
    decoded_total: bool,
}

impl PlaybackEngine {
    pub fn new(
        loader: Box<dyn ResourceLoader>,
        provider: Arc<dyn DataProvider>,
        analyzer: FrequencyAnalyzer,
        initial_volume: f32,
    ) -> Self {
        let session = PlaybackSession::new(initial_volume);
        let last_audible_volume = Some(session.volume).filter(|v| *v > 0.0);
        Self {
            session,
            resource: None,
            loader,
            provider,
            analyzer,
            load_seq: 0,
            pending_seek: None,
            last_audible_volume,
            decoded_total: false,
        }
    }

    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    /// Sequence number of the most recent load.
    #[cfg(test)]
    pub fn load_seq(&self) -> u64 {
        self.load_seq
    }

    pub fn spectrum(&mut self) -> Option<Vec<u8>> {
        if self.session.state != PlaybackState::Playing {
            return None;
        }
        self.analyzer.snapshot()
    }

    /// Replace whatever is playing with `track`.
    pub fn load_and_play(&mut self, track: Track) {
        self.release_resource();
        self.load_seq += 1;
        self.pending_seek = None;
        self.decoded_total = false;

        log::debug!("load #{}: '{}'", self.load_seq, track.title);
        self.session.state = PlaybackState::Loading;
        self.session.position_secs = 0.0;
        self.session.total_secs = provisional_total(&track);
        self.session.last_error = None;
        self.session.current_track = Some(track.clone());

        self.report_play(track.id);
        self.loader.load(LoadRequest {
            seq: self.load_seq,
            track,
        });
    }

    fn report_play(&self, track_id: u64) {
        let provider = Arc::clone(&self.provider);
        thread::spawn(move || {
            if let Err(e) = provider.increment_play_count(track_id) {
                let e = PlaybackError::from(e);
                log::warn!("could not record play of track {track_id}: {e}");
            }
        });
    }

    /// Apply a loader completion.
    pub fn handle_event(&mut self, event: EngineEvent) {
        if event.seq() != self.load_seq || self.session.state != PlaybackState::Loading {
            log::debug!(
                "dropping stale load #{} (current #{})",
                event.seq(),
                self.load_seq
            );
            if let EngineEvent::ResourceReady { mut resource, .. } = event {
                resource.stop();
            }
            return;
        }

        match event {
            EngineEvent::ResourceReady { resource, .. } => self.start(resource),
            EngineEvent::ResourceFailed { error, .. } => self.fail(error),
        }
    }

    fn start(&mut self, mut resource: Box<dyn PlaybackResource>) {
        resource.set_volume(self.session.effective_volume());

        if let Some(total) = resource.total_duration() {
            self.session.total_secs = total.as_secs_f64();
            self.decoded_total = true;
        }

        if let Some(target) = self.pending_seek.take() {
            let target = clamp_position(target, self.seek_limit());
            match resource.seek(Duration::from_secs_f64(target)) {
                Ok(()) => self.session.position_secs = target,
                Err(e) => log::warn!("deferred seek to {target:.1}s failed: {e}"),
            }
        }

        if let Err(e) = resource.play() {
            resource.stop();
            self.fail(e);
            return;
        }

        if let Err(e) = self.analyzer.attach(resource.sample_tap()) {
            log::warn!("{e}");
        }

        self.resource = Some(resource);
        self.session.state = PlaybackState::Playing;
        log::debug!("playing load #{}", self.load_seq);
    }

    fn fail(&mut self, error: PlaybackError) {
        log::error!("{error}");
        self.analyzer.detach();
        self.session.state = PlaybackState::Errored;
        self.session.last_error = Some(error.to_string());
        self.session.error_seq += 1;
    }

    pub fn toggle_play_pause(&mut self) {
        match self.session.state {
            PlaybackState::Playing => {
                if let Some(resource) = self.resource.as_mut() {
                    resource.pause();
                }
                self.session.state = PlaybackState::Paused;
            }
            PlaybackState::Paused => self.resume(),
            PlaybackState::Idle | PlaybackState::Loading | PlaybackState::Errored => {}
        }
    }

    fn resume(&mut self) {
        let Some(resource) = self.resource.as_mut() else {
            return;
        };

        let restart = resource.is_finished();
        let result = if restart {
            resource
                .seek(Duration::ZERO)
                .map_err(|e| PlaybackError::PlaybackResume(e.to_string()))
                .and_then(|()| resource.play())
        } else {
            resource.play()
        };

        match result {
            Ok(()) => {
                if restart {
                    self.session.position_secs = 0.0;
                }
                self.session.state = PlaybackState::Playing;
            }
            Err(e) => {
                let e = match e {
                    PlaybackError::PlaybackResume(_) => e,
                    other => PlaybackError::PlaybackResume(other.to_string()),
                };
                self.fail(e);
            }
        }
    }

    /// Jump to `secs`, clamped into the known duration.
    pub fn seek(&mut self, secs: f64) {
        if !secs.is_finite() {
            return;
        }
        let target = clamp_position(secs, self.seek_limit());
        match self.session.state {
            PlaybackState::Loading => {
                self.pending_seek = Some(target);
                self.session.position_secs = target;
            }
            PlaybackState::Playing | PlaybackState::Paused => {
                self.session.position_secs = target;
                if let Some(resource) = self.resource.as_mut() {
                    if let Err(e) = resource.seek(Duration::from_secs_f64(target)) {
                        log::warn!("seek to {target:.1}s failed: {e}");
                    }
                }
            }
            PlaybackState::Idle | PlaybackState::Errored => {}
        }
    }

    /// Upper bound for seeks; a guessed length does not limit them.
    fn seek_limit(&self) -> f64 {
        if self.decoded_total {
            self.session.total_secs
        } else {
            0.0
        }
    }

    /// Relative seek used by the keyboard and media controls.
    pub fn seek_by(&mut self, delta_secs: f64) {
        self.seek(self.session.position_secs + delta_secs);
    }

    pub fn set_volume(&mut self, volume: f32) {
        let Some(volume) = clamp_volume(volume) else {
            return;
        };
        self.session.volume = volume;
        self.session.muted = false;
        if volume > 0.0 {
            self.last_audible_volume = Some(volume);
        }
        self.apply_volume();
    }

    pub fn toggle_mute(&mut self) {
        if self.session.muted {
            self.session.muted = false;
            self.session.volume = self
                .last_audible_volume
                .unwrap_or(DEFAULT_RESTORE_VOLUME);
        } else {
            if self.session.volume > 0.0 {
                self.last_audible_volume = Some(self.session.volume);
            }
            self.session.muted = true;
        }
        self.apply_volume();
    }

    fn apply_volume(&mut self) {
        let volume = self.session.effective_volume();
        if let Some(resource) = self.resource.as_mut() {
            resource.set_volume(volume);
        }
    }

    /// Refresh position and duration; call regularly from the event loop.
    pub fn tick(&mut self) {
        if self.session.state != PlaybackState::Playing {
            return;
        }
        let Some(resource) = self.resource.as_ref() else {
            return;
        };

        if let Some(total) = resource.total_duration() {
            self.session.total_secs = total.as_secs_f64();
            self.decoded_total = true;
        }

        let position = resource.position().as_secs_f64().max(0.0);

        if resource.is_finished() {
            if !self.decoded_total {
                // Where playback ran out is the real length.
                let last = self.session.position_secs.max(position);
                if last > 0.0 {
                    self.session.total_secs = last;
                }
            }
            self.session.position_secs = self.session.total_secs;
            self.session.state = PlaybackState::Paused;
            log::debug!("load #{} reached the end", self.load_seq);
            return;
        }

        if self.decoded_total {
            self.session.position_secs = clamp_position(position, self.session.total_secs);
        } else {
            self.session.total_secs = self.session.total_secs.max(position);
            self.session.position_secs = position;
        }
    }

    /// Release the resource and forget the current track.
    pub fn stop(&mut self) {
        self.release_resource();
        self.load_seq += 1;
        self.pending_seek = None;
        self.session.current_track = None;
        self.session.state = PlaybackState::Idle;
        self.session.position_secs = 0.0;
        self.session.total_secs = 0.0;
        self.session.last_error = None;
        self.decoded_total = false;
    }

    /// Fade out and release everything; used on quit.
    pub fn shutdown(&mut self, fade: Duration) {
        self.analyzer.detach();
        if let Some(mut resource) = self.resource.take() {
            if self.session.state == PlaybackState::Playing {
                resource.fade_out(fade);
            }
            resource.stop();
        }
        self.load_seq += 1;
        self.session.state = PlaybackState::Idle;
    }

    fn release_resource(&mut self) {
        self.analyzer.detach();
        if let Some(mut resource) = self.resource.take() {
            resource.stop();
        }
    }
}

impl Drop for PlaybackEngine {
    fn drop(&mut self) {
        self.release_resource();
    }
}

fn provisional_total(track: &Track) -> f64 {
    if track.duration.is_finite() && track.duration > 0.0 {
        track.duration
    } else {
        0.0
    }
}

/// Clamp into `[0, total]`; an unknown total (`<= 0`) only bounds below.
fn clamp_position(secs: f64, total: f64) -> f64 {
    let secs = secs.max(0.0);
    if total > 0.0 { secs.min(total) } else { secs }
}

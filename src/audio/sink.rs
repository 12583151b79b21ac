//! `rodio`-backed playback resources.
//!
//! Audio bytes are fetched once per load and kept around so the sink can be
//! rebuilt at an offset when the decoder cannot seek in place.

use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use base64::{Engine as _, engine::general_purpose};
use reqwest::blocking::Client;
use rodio::mixer::Mixer;
use rodio::{Decoder, Sink, Source};

use super::resource::PlaybackResource;
use super::tap::{SampleTap, TappedSource};
use super::types::PlaybackError;

const FADE_STEPS: u64 = 20;

/// Where the encoded audio for a track lives once fetched.
#[derive(Debug, Clone)]
pub enum AudioData {
    File(PathBuf),
    Memory(Arc<[u8]>),
}

impl AudioData {
    /// Resolve a track's `audio_url`: http(s) URLs are downloaded, `data:` URLs
    /// decoded, and `file://` URLs or bare paths read from disk on demand.
    pub fn fetch(locator: &str, client: &Client) -> Result<Self, PlaybackError> {
        let locator = locator.trim();
        if locator.is_empty() {
            return Err(PlaybackError::ResourceLoad("track has no audio url".into()));
        }

        if locator.starts_with("http://") || locator.starts_with("https://") {
            let bytes = client
                .get(locator)
                .send()
                .and_then(|r| r.error_for_status())
                .and_then(|r| r.bytes())
                .map_err(|e| PlaybackError::ResourceLoad(e.to_string()))?;
            log::debug!("fetched {} bytes from {locator}", bytes.len());
            return Ok(AudioData::Memory(Arc::from(bytes.as_ref())));
        }

        if let Some(rest) = locator.strip_prefix("data:") {
            return decode_data_url(rest).map(AudioData::Memory);
        }

        let path = PathBuf::from(locator.strip_prefix("file://").unwrap_or(locator));
        if !path.is_file() {
            return Err(PlaybackError::ResourceLoad(format!(
                "no such file: {}",
                path.display()
            )));
        }
        Ok(AudioData::File(path))
    }

    fn decoder(&self) -> Result<Box<dyn Source + Send>, PlaybackError> {
        let load_err = |e: &dyn std::fmt::Display| PlaybackError::ResourceLoad(e.to_string());
        match self {
            AudioData::File(path) => {
                let file = File::open(path).map_err(|e| load_err(&e))?;
                let decoder = Decoder::new(BufReader::new(file)).map_err(|e| load_err(&e))?;
                Ok(Box::new(decoder))
            }
            AudioData::Memory(bytes) => {
                let decoder = Decoder::new(Cursor::new(bytes.clone())).map_err(|e| load_err(&e))?;
                Ok(Box::new(decoder))
            }
        }
    }
}

fn decode_data_url(rest: &str) -> Result<Arc<[u8]>, PlaybackError> {
    let Some((meta, payload)) = rest.split_once(',') else {
        return Err(PlaybackError::ResourceLoad("malformed data url".into()));
    };
    if meta.ends_with(";base64") {
        general_purpose::STANDARD
            .decode(payload.trim())
            .map(Arc::from)
            .map_err(|e| PlaybackError::ResourceLoad(format!("bad base64 payload: {e}")))
    } else {
        Ok(Arc::from(payload.as_bytes()))
    }
}

/// A decoded track attached to the output mixer.
pub struct RodioResource {
    sink: Sink,
    mixer: Mixer,
    data: AudioData,
    tap: SampleTap,
    total: Option<Duration>,
    volume: f32,
    /// Start of the current sink within the track, after a rebuild at an offset.
    offset: Duration,
}

impl RodioResource {
    /// Decode `data` and attach a paused sink to `mixer`.
    pub fn open(mixer: &Mixer, data: AudioData) -> Result<Self, PlaybackError> {
        let decoder = data.decoder()?;
        let total = decoder.total_duration();
        let (source, tap) = TappedSource::new(decoder);

        let sink = Sink::connect_new(mixer);
        sink.append(source);
        sink.pause();

        Ok(Self {
            sink,
            mixer: mixer.clone(),
            data,
            tap,
            total,
            volume: 1.0,
            offset: Duration::ZERO,
        })
    }

    /// Replace the sink with a fresh one starting at `start_at`.
    fn rebuild_at(&mut self, start_at: Duration) -> Result<(), PlaybackError> {
        let was_paused = self.sink.is_paused();
        let source = self
            .data
            .decoder()?
            // `skip_duration` is the fallback seeking primitive; even Duration::ZERO is fine.
            .skip_duration(start_at);
        let source = TappedSource::with_tap(source, self.tap.clone());

        let sink = Sink::connect_new(&self.mixer);
        sink.set_volume(self.volume);
        sink.append(source);
        if was_paused {
            sink.pause();
        }

        self.sink.stop();
        self.sink = sink;
        self.offset = start_at;
        Ok(())
    }
}

impl PlaybackResource for RodioResource {
    fn play(&mut self) -> Result<(), PlaybackError> {
        if self.sink.empty() {
            self.rebuild_at(Duration::ZERO)
                .map_err(|e| PlaybackError::PlaybackResume(e.to_string()))?;
        }
        self.sink.play();
        Ok(())
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn seek(&mut self, to: Duration) -> Result<(), PlaybackError> {
        if !self.sink.empty() {
            match self.sink.try_seek(to) {
                Ok(()) => {
                    self.offset = Duration::ZERO;
                    return Ok(());
                }
                Err(e) => log::debug!("in-place seek failed ({e}), rebuilding sink"),
            }
        }
        self.rebuild_at(to)
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        self.sink.set_volume(volume);
    }

    fn position(&self) -> Duration {
        self.offset + self.sink.get_pos()
    }

    fn total_duration(&self) -> Option<Duration> {
        self.total
    }

    fn is_finished(&self) -> bool {
        self.sink.empty()
    }

    fn sample_tap(&self) -> Option<SampleTap> {
        Some(self.tap.clone())
    }

    fn fade_out(&mut self, over: Duration) {
        let fade_ms = over.as_millis() as u64;
        if fade_ms == 0 || self.sink.is_paused() || self.sink.empty() {
            self.sink.set_volume(0.0);
            return;
        }
        let step_ms = (fade_ms / FADE_STEPS).max(1);
        let start = self.volume;
        for step in 1..=FADE_STEPS {
            let t = step as f32 / FADE_STEPS as f32;
            self.sink.set_volume(start * (1.0 - t));
            thread::sleep(Duration::from_millis(step_ms));
        }
        self.sink.set_volume(0.0);
    }

    fn stop(&mut self) {
        self.sink.stop();
    }
}

impl Drop for RodioResource {
    fn drop(&mut self) {
        self.sink.stop();
    }
}

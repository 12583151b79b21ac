use std::sync::mpsc::Sender;
use std::thread;

use reqwest::blocking::Client;
use rodio::mixer::Mixer;

use super::resource::{PlaybackResource, ResourceLoader};
use super::sink::{AudioData, RodioResource};
use super::types::{EngineEvent, LoadRequest};

/// Fetches and decodes tracks on worker threads, one per load.
///
/// There is no cancellation: a superseded load still finishes and its
/// completion is discarded (and the resource dropped) by the engine.
pub struct RodioLoader {
    mixer: Mixer,
    client: Client,
    events: Sender<EngineEvent>,
}

impl RodioLoader {
    pub fn new(mixer: Mixer, client: Client, events: Sender<EngineEvent>) -> Self {
        Self {
            mixer,
            client,
            events,
        }
    }
}

impl ResourceLoader for RodioLoader {
    fn load(&self, request: LoadRequest) {
        let mixer = self.mixer.clone();
        let client = self.client.clone();
        let events = self.events.clone();

        thread::spawn(move || {
            let LoadRequest { seq, track } = request;
            log::debug!("load #{seq}: {}", track.audio_url);

            let event = match AudioData::fetch(&track.audio_url, &client)
                .and_then(|data| RodioResource::open(&mixer, data))
            {
                Ok(resource) => EngineEvent::ResourceReady {
                    seq,
                    resource: Box::new(resource) as Box<dyn PlaybackResource>,
                },
                Err(error) => {
                    log::error!("load #{seq} of '{}' failed: {error}", track.title);
                    EngineEvent::ResourceFailed { seq, error }
                }
            };

            // The receiver is gone only during shutdown.
            let _ = events.send(event);
        });
    }
}

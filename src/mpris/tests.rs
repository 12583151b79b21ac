use super::*;
use std::sync::mpsc;

fn make_track() -> Track {
    Track {
        id: 7,
        title: "Test Title".to_string(),
        artist: "Test Artist".to_string(),
        album_id: Some(2),
        duration: 200.0,
        audio_url: "https://example.com/test.mp3".to_string(),
        cover_url: "https://example.com/cover.jpg".to_string(),
        play_count: 1_500,
    }
}

fn handle() -> (MprisHandle, Arc<Mutex<SharedState>>, mpsc::Receiver<()>) {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (notify_tx, notify_rx) = mpsc::channel::<()>();
    let handle = MprisHandle {
        state: state.clone(),
        notify: notify_tx,
    };
    (handle, state, notify_rx)
}

#[test]
fn set_track_metadata_sets_and_clears_shared_state() {
    let (handle, state, notify) = handle();

    let track = make_track();
    handle.set_track_metadata(Some(&track), 2.5);

    {
        let s = state.lock().unwrap();
        assert_eq!(s.title.as_deref(), Some("Test Title"));
        assert_eq!(s.artist, vec!["Test Artist".to_string()]);
        assert_eq!(s.url.as_deref(), Some("https://example.com/test.mp3"));
        assert_eq!(s.art_url.as_deref(), Some("https://example.com/cover.jpg"));
        assert_eq!(s.length_micros, Some(2_500_000));
        assert_eq!(s.use_count, Some(1_500));
        assert_eq!(
            s.track_id.as_ref().map(|p| p.as_str()),
            Some("/org/mpris/MediaPlayer2/track/7")
        );
    }
    assert!(notify.try_recv().is_ok());

    handle.set_track_metadata(None, 0.0);
    {
        let s = state.lock().unwrap();
        assert_eq!(s.title, None);
        assert!(s.artist.is_empty());
        assert_eq!(s.url, None);
        assert_eq!(s.art_url, None);
        assert_eq!(s.length_micros, None);
        assert_eq!(s.use_count, None);
        assert!(s.track_id.is_none());
    }
}

#[test]
fn unknown_length_and_empty_cover_are_omitted() {
    let (handle, state, _notify) = handle();
    let mut track = make_track();
    track.cover_url.clear();

    handle.set_track_metadata(Some(&track), f64::NAN);

    let s = state.lock().unwrap();
    assert_eq!(s.length_micros, None);
    assert_eq!(s.art_url, None);
}

#[test]
fn playback_status_maps_engine_states() {
    let (handle, state, _notify) = handle();
    let (tx, _rx) = mpsc::channel::<ControlCmd>();
    let iface = PlayerIface {
        tx,
        state: state.clone(),
    };

    for (playback, expected) in [
        (PlaybackState::Idle, "Stopped"),
        (PlaybackState::Loading, "Playing"),
        (PlaybackState::Playing, "Playing"),
        (PlaybackState::Paused, "Paused"),
        (PlaybackState::Errored, "Stopped"),
    ] {
        handle.set_playback(playback);
        assert_eq!(iface.playback_status(), expected, "{playback:?}");
    }
}

#[test]
fn metadata_includes_expected_keys_when_present() {
    let (handle, state, _notify) = handle();
    let (tx, _rx) = mpsc::channel::<ControlCmd>();
    let iface = PlayerIface { tx, state };

    assert!(iface.metadata().is_empty());

    handle.set_track_metadata(Some(&make_track()), 42.0);
    let map = iface.metadata();
    for k in [
        "mpris:trackid",
        "xesam:title",
        "xesam:artist",
        "xesam:url",
        "mpris:artUrl",
        "mpris:length",
        "xesam:useCount",
    ] {
        assert!(map.contains_key(k), "missing key: {k}");
    }
}

#[test]
fn player_methods_forward_control_commands() {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (tx, rx) = mpsc::channel::<ControlCmd>();
    let iface = PlayerIface { tx, state };

    iface.play_pause();
    iface.next();
    iface.previous();
    iface.stop();

    let got: Vec<ControlCmd> = rx.try_iter().collect();
    assert_eq!(
        got,
        vec![
            ControlCmd::PlayPause,
            ControlCmd::Next,
            ControlCmd::Prev,
            ControlCmd::Stop
        ]
    );
}

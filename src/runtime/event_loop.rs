use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::audio::{EngineEvent, PlaybackEngine, PlaybackState};
use crate::config;
use crate::mpris::{ControlCmd, MprisHandle};
use crate::runtime::mpris_sync::{MprisSnapshot, update_mpris};
use crate::ui;

/// State tracked by the runtime event loop across iterations.
#[derive(Default)]
pub struct EventLoopState {
    /// What MPRIS was last told.
    pub last_mpris: MprisSnapshot,
}

/// Everything the loop drives. Owned by the loop thread only.
pub struct Player<'a> {
    pub settings: &'a config::Settings,
    pub app: &'a mut App,
    pub engine: &'a mut PlaybackEngine,
    pub engine_rx: &'a mpsc::Receiver<EngineEvent>,
    pub mpris: &'a MprisHandle,
    pub control_rx: &'a mpsc::Receiver<ControlCmd>,
}

/// Main terminal event loop: applies loader results, refreshes playback,
/// draws, and handles input and media controls. Returns `Ok(())` when
/// shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    player: Player<'_>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    let Player {
        settings,
        app,
        engine,
        engine_rx,
        mpris,
        control_rx,
    } = player;
    let tick = Duration::from_millis(settings.audio.tick_ms);

    loop {
        while let Ok(ev) = engine_rx.try_recv() {
            engine.handle_event(ev);
        }
        engine.tick();
        app.poll(Instant::now());

        // Keep MPRIS in sync even when playback changes come from media keys or track end.
        let snapshot = MprisSnapshot::of(engine.session());
        if snapshot != state.last_mpris {
            update_mpris(mpris, engine.session());
            state.last_mpris = snapshot;
        }

        let spectrum = engine.spectrum();
        terminal.draw(|f| {
            ui::draw(
                f,
                app,
                engine.session(),
                spectrum.as_deref(),
                &settings.ui,
                &settings.controls,
            )
        })?;

        while let Ok(cmd) = control_rx.try_recv() {
            if handle_control_cmd(cmd, settings, app, engine) {
                return Ok(());
            }
        }

        if event::poll(tick)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, app, engine) {
                    return Ok(());
                }
            }
        }
    }
}

fn quit(settings: &config::Settings, engine: &mut PlaybackEngine) -> bool {
    engine.shutdown(Duration::from_millis(settings.audio.quit_fade_out_ms));
    true
}

/// Start the selected track, or resume/pause whatever is loaded.
fn play_pause(app: &App, engine: &mut PlaybackEngine) {
    match engine.session().state {
        PlaybackState::Playing | PlaybackState::Paused => engine.toggle_play_pause(),
        PlaybackState::Idle | PlaybackState::Errored => play_selected(app, engine),
        PlaybackState::Loading => {}
    }
}

fn play_selected(app: &App, engine: &mut PlaybackEngine) {
    if let Some(track) = app.selected_track().cloned() {
        engine.load_and_play(track);
    }
}

fn current_id(engine: &PlaybackEngine) -> Option<u64> {
    engine.session().current_track.as_ref().map(|t| t.id)
}

fn play_next(app: &App, engine: &mut PlaybackEngine) {
    if let Some(track) = app.track_after(current_id(engine)) {
        engine.load_and_play(track);
    }
}

fn play_prev(app: &App, engine: &mut PlaybackEngine) {
    if let Some(track) = app.track_before(current_id(engine)) {
        engine.load_and_play(track);
    }
}

/// Returns true when the app should exit.
fn handle_control_cmd(
    cmd: ControlCmd,
    settings: &config::Settings,
    app: &mut App,
    engine: &mut PlaybackEngine,
) -> bool {
    log::debug!("media control: {cmd:?}");
    match cmd {
        ControlCmd::Quit => return quit(settings, engine),
        ControlCmd::Play => {
            if engine.session().state != PlaybackState::Playing {
                play_pause(app, engine);
            }
        }
        ControlCmd::Pause => {
            if engine.session().state == PlaybackState::Playing {
                engine.toggle_play_pause();
            }
        }
        ControlCmd::PlayPause => play_pause(app, engine),
        ControlCmd::Stop => engine.stop(),
        ControlCmd::Next => play_next(app, engine),
        ControlCmd::Prev => play_prev(app, engine),
    }
    false
}

/// Returns true when the app should exit.
fn handle_key_event(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    engine: &mut PlaybackEngine,
) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return quit(settings, engine);
    }

    if app.search_mode {
        handle_search_key(key, app);
        return false;
    }

    let seek = settings.controls.seek_seconds as f64;
    let step = settings.controls.volume_step;
    match key.code {
        KeyCode::Char('q') => return quit(settings, engine),
        KeyCode::Char('j') | KeyCode::Down => app.next(),
        KeyCode::Char('k') | KeyCode::Up => app.prev(),
        KeyCode::Enter => {
            if app.showing_albums() {
                app.open_selected_album();
            } else {
                play_selected(app, engine);
            }
        }
        KeyCode::Char(' ') | KeyCode::Char('p') => play_pause(app, engine),
        KeyCode::Char('l') => play_next(app, engine),
        KeyCode::Char('h') => play_prev(app, engine),
        KeyCode::Char('L') => engine.seek_by(seek),
        KeyCode::Char('H') => engine.seek_by(-seek),
        KeyCode::Char('+') | KeyCode::Char('=') => {
            let volume = engine.session().volume;
            engine.set_volume(volume + step);
        }
        KeyCode::Char('-') => {
            let volume = engine.session().volume;
            engine.set_volume(volume - step);
        }
        KeyCode::Char('m') => engine.toggle_mute(),
        KeyCode::Char('/') => app.enter_search_mode(),
        KeyCode::Esc => {
            if app.search.has_query() {
                app.clear_search();
            } else {
                app.back();
            }
        }
        KeyCode::Tab => app.toggle_view(),
        KeyCode::Char('x') => app.dismiss_error(engine.session()),
        KeyCode::Char('s') => engine.stop(),
        _ => {}
    }
    false
}

fn handle_search_key(key: KeyEvent, app: &mut App) {
    let now = Instant::now();
    match key.code {
        KeyCode::Esc => app.clear_search(),
        KeyCode::Enter => app.exit_search_mode(),
        KeyCode::Backspace => app.pop_search_char(now),
        KeyCode::Down => app.next(),
        KeyCode::Up => app.prev(),
        KeyCode::Char(c) if !c.is_control() => app.push_search_char(c, now),
        _ => {}
    }
}

use std::env;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::analyzer::FrequencyAnalyzer;
use crate::app::App;
use crate::audio::{EngineEvent, PlaybackEngine, RodioLoader};
use crate::mpris::ControlCmd;
use crate::search::SearchController;

mod event_loop;
mod logging;
mod mpris_sync;
mod settings;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, config_problem) = settings::load_settings();

    match logging::init(&settings.log) {
        Ok(path) => log::info!("nebula {} logging to {}", env!("CARGO_PKG_VERSION"), path.display()),
        Err(e) => eprintln!("nebula: logging disabled: {e}"),
    }
    if let Some(problem) = config_problem {
        log::warn!("{problem}");
    }

    let arg = env::args().nth(1);
    let choice = startup::choose_catalog(&settings, arg.as_deref());
    let (provider, source_label) = startup::open_catalog(&settings, choice)?;

    let timeout = Duration::from_millis(settings.catalog.request_timeout_ms);
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()?;

    let mut stream = rodio::OutputStreamBuilder::open_default_stream()?;
    stream.log_on_drop(false);

    let (engine_tx, engine_rx) = mpsc::channel::<EngineEvent>();
    let loader = RodioLoader::new(stream.mixer().clone(), client, engine_tx);
    let analyzer = FrequencyAnalyzer::new(settings.analyzer.clone());
    let mut engine = PlaybackEngine::new(
        Box::new(loader),
        provider.clone(),
        analyzer,
        settings.audio.default_volume,
    );

    let search = SearchController::new(
        provider.clone(),
        Duration::from_millis(settings.search.debounce_ms),
    );
    let mut app = App::new(provider, search, source_label);
    app.load_catalog();
    app.poll(Instant::now());

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = crate::mpris::spawn_mpris(control_tx);
    mpris_sync::update_mpris(&mpris, engine.session());

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        let mut state = event_loop::EventLoopState::default();
        let player = event_loop::Player {
            settings: &settings,
            app: &mut app,
            engine: &mut engine,
            engine_rx: &engine_rx,
            mpris: &mpris,
            control_rx: &control_rx,
        };
        event_loop::run(&mut terminal, player, &mut state)
    })();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = &run_result {
        log::error!("event loop failed: {e}");
    }
    log::info!("bye");
    run_result
}

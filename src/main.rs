use std::{io, sync::Arc, time::Duration, time::Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tokio::sync::mpsc;
use tracing::{error, info};

use mlb_tui::{
    app::{App, AppEvent},
    config::{Args, Config},
    data::DataClient,
    logging,
    storage::FileStorage,
    tasks::Runner,
    ui,
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::from_args(args);
    let _log_guard = logging::init(&config.log_dir);
    info!(backend = %config.endpoints.backend, season = config.endpoints.season, "starting");

    let storage = Arc::new(FileStorage::open(&config.state_file));
    info!(path = %storage.path().display(), "preferences");
    let mut app = App::new(storage);

    // Setup channel for background results
    let (tx, mut rx) = mpsc::channel::<AppEvent>(100);
    let client = Arc::new(DataClient::new(config.endpoints.clone(), config.retry));
    let runner = Runner::new(client, tx, config.show_headshots);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app, &runner, &mut rx).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!("ui loop failed: {err:#}");
        eprintln!("{err:?}");
    }
    info!("bye");
    Ok(())
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner,
    rx: &mut mpsc::Receiver<AppEvent>,
) -> io::Result<()> {
    for command in app.start() {
        runner.spawn(command);
    }

    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    for command in app.on_key(key, Instant::now()) {
                        runner.spawn(command);
                    }
                }
            }
        }

        while let Ok(update) = rx.try_recv() {
            for command in app.apply(update) {
                runner.spawn(command);
            }
        }
        app.tick(Instant::now());

        if app.should_quit {
            return Ok(());
        }
    }
}

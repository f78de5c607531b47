mod app;
mod ui;

use anyhow::{Context, Result};
use app::App;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use docsmith_config::Config;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{
    env, fs,
    io::{Stdout, stdout},
    path::PathBuf,
    process,
    time::Duration,
};

/// Upper bound on how long the loop blocks waiting for input, so finished
/// generations show up without a key press.
const IDLE_POLL: Duration = Duration::from_millis(250);

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    let mut config = match Config::load() {
        Ok(Some(config)) => config,
        Ok(None) => Config::default(),
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            eprintln!("Fix or remove {}", Config::config_path().display());
            process::exit(1);
        }
    };

    match args.len() {
        1 => {}
        // Storage directory override
        2 => config.storage_path = PathBuf::from(&args[1]),
        _ => {
            eprintln!("Usage: {} [storage-folder-path]", args[0]);
            process::exit(1);
        }
    }

    init_logging(&config)?;
    log::info!("docsmith starting up, storage at {}", config.storage_path.display());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(&config);
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        log::error!("Exited with error: {err:?}");
        println!("{err:?}");
    }

    Ok(())
}

/// The terminal belongs to the UI, so log records go to a file in the
/// storage directory.
fn init_logging(config: &Config) -> Result<()> {
    fs::create_dir_all(&config.storage_path).with_context(|| {
        format!(
            "Failed to create storage directory {}",
            config.storage_path.display()
        )
    })?;
    let log_path = config.log_file();
    let log_file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();
    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        // Wake up in time for a pending save to fire.
        let timeout = app
            .editor
            .next_save_in()
            .map(Duration::from_millis)
            .map_or(IDLE_POLL, |d| d.min(IDLE_POLL));

        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && let Err(e) = app.handle_key(key)
        {
            log::error!("{e:#}");
            app.message = Some(format!("Error: {e}"));
        }

        app.tick();

        if app.should_quit {
            return Ok(());
        }
    }
}

//! Intake - terminal client
//!
//! Walks through the qualification questions for the token found in a
//! personal link and submits the answers to an intake server.

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
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
use tracing_subscriber::{fmt, EnvFilter};

use intake::application::{App, FormApi};
use intake::infrastructure::HttpFormApi;
use intake::presentation::{render_ui, InputHandler};

/// Upper bound on how long the loop blocks waiting for a key.
const IDLE_POLL: Duration = Duration::from_millis(250);

#[derive(Parser, Debug)]
#[command(name = "intake", version, about = "Fill in the intake form from the terminal")]
struct ClientArgs {
    /// Personal link or bare token, e.g. https://example.org/?token=abc123
    link: Option<String>,

    /// Base URL of the intake server
    #[arg(long, env = "INTAKE_SERVER", default_value = "http://127.0.0.1:24585")]
    server: String,

    /// Pause after picking an answer before the next question shows
    #[arg(long, default_value_t = 250)]
    advance_delay_ms: u64,

    /// Write logs to this file; the terminal is taken by the form
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = ClientArgs::parse();

    if let Some(path) = &args.log_file {
        init_file_logging(path)?;
    }

    let api = HttpFormApi::new(&args.server)
        .with_context(|| format!("invalid server URL {}", args.server))?;
    let mut app = App::new(
        args.link.as_deref(),
        Duration::from_millis(args.advance_delay_ms),
    );

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app, &api);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res.context("terminal error")
}

fn init_file_logging(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

/// Main event loop.
///
/// Backend calls block, so the screen is drawn once more before each one
/// to show the loading or sending state.
fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App, api: &dyn FormApi) -> io::Result<()> {
    loop {
        terminal.draw(|f| render_ui(f, app))?;

        if app.has_queued_command() {
            app.dispatch(api);
            continue;
        }

        let timeout = app
            .time_until_next_tick(Instant::now())
            .map_or(IDLE_POLL, |due| due.min(IDLE_POLL));
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    InputHandler::handle_key_event(app, key.code, key.modifiers, Instant::now());
                }
            }
        }
        app.tick(Instant::now());

        if app.should_quit {
            return Ok(());
        }
    }
}

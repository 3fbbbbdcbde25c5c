mod state;
mod theme;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use sortbox_core::{SandboxConfig, WeightOrder, RESET_RECORD_COUNT};
use std::{fs::OpenOptions, io, path::PathBuf, sync::Mutex, time::Duration};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Debug)]
pub struct Config {
    pub sandbox: SandboxConfig,
    pub snapshot_path: PathBuf,
    pub log_file: Option<PathBuf>,
    pub debug: bool,
}

#[derive(Parser, Debug)]
#[command(name = "sortbox", about = "Reorder notifications live by adjustable key weights")]
struct Args {
    /// Number of records seeded at startup.
    #[arg(long, default_value_t = RESET_RECORD_COUNT)]
    records: usize,
    /// Fixed seed for the random status/priority draws.
    #[arg(long)]
    seed: Option<u64>,
    /// Initial weight order, most significant key first.
    #[arg(long, default_value = "status,priority,time")]
    weights: String,
    #[arg(long, env = "SORTBOX_SNAPSHOT_PATH", default_value = "sortbox-snapshot.json")]
    snapshot_path: PathBuf,
    #[arg(long, env = "SORTBOX_LOG_FILE")]
    log_file: Option<PathBuf>,
    #[arg(long, default_value_t = false)]
    debug: bool,
}

fn main() -> Result<()> {
    let config = load_config(Args::parse())?;
    init_logging(&config)?;
    info!(
        event = "sortbox_start",
        records = config.sandbox.initial_records,
        seed = ?config.sandbox.rng_seed,
        order = %config.sandbox.weight_order
    );

    let mut app = state::App::new(&config);
    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, &mut app);
    restore_terminal(&mut terminal)?;

    if let Err(err) = result {
        eprintln!("sortbox: {err}");
    }

    Ok(())
}

fn load_config(args: Args) -> Result<Config> {
    let weight_order: WeightOrder = args
        .weights
        .parse()
        .with_context(|| format!("invalid --weights value '{}'", args.weights))?;

    Ok(Config {
        sandbox: SandboxConfig {
            initial_records: args.records,
            rng_seed: args.seed,
            weight_order,
        },
        snapshot_path: args.snapshot_path,
        log_file: args.log_file,
        debug: args.debug,
    })
}

/// The terminal belongs to the UI, so logs only go to a file when one is
/// configured.
fn init_logging(config: &Config) -> Result<()> {
    let filter = if config.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::sink)
                .try_init();
        }
    }
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut state::App,
) -> Result<()> {
    let input_poll = Duration::from_millis(100);

    loop {
        terminal.draw(|f| ui::render(f, app))?;

        if event::poll(input_poll)? {
            match event::read()? {
                Event::Key(key) => {
                    if matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
                        app.handle_key(key);
                    }
                }
                Event::Mouse(mouse) => {
                    app.handle_mouse(mouse);
                }
                _ => {}
            }
        }

        if app.should_quit() {
            break;
        }
    }

    info!(event = "sortbox_exit", records = app.sandbox.len());
    Ok(())
}

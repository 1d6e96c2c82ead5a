//! # Game of Life
//!
//! A terminal front-end for the `life_engine` simulator using the `ratatui`
//! library for the interface and `crossterm` for terminal manipulation.
//!
//! The front-end holds no simulation state of its own: it draws each
//! published snapshot and forwards key presses and mouse clicks to the engine.
//!
//! ## Controls
//!
//! * Space: Play/Pause the simulation
//! * Enter: Step forward one generation (pauses a running simulation)
//! * r: Fill the board randomly
//! * c: Clear the board
//! * Mouse click: Toggle a cell
//! * q: Quit the application

mod ui;

use clap::Parser;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, MouseButton,
        MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use std::{error::Error, fs::File, io, path::PathBuf, sync::Mutex, time::Duration};
use tokio::sync::mpsc;
use tracing::{info, warn};

use life_engine::{Engine, EngineConfig};

/// How often the input thread checks whether the UI is still listening.
const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Parser, Debug)]
#[command(author, version, about = "Conway's Game of Life in the terminal", long_about = None)]
struct Cli {
    /// Grid height
    #[arg(long, default_value_t = 20)]
    rows: usize,

    /// Grid width
    #[arg(long, default_value_t = 15)]
    cols: usize,

    /// Delay between generations while running, in milliseconds
    #[arg(long, default_value_t = 200)]
    interval_ms: u64,

    /// Probability of a cell being alive when randomizing
    #[arg(long, default_value_t = 0.3)]
    probability: f64,

    /// Start from a random board instead of an empty one
    #[arg(long)]
    random: bool,

    /// Write logs to this file (the terminal is taken over by the interface)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn engine_config(&self) -> EngineConfig {
        EngineConfig::default()
            .with_dimensions(self.rows, self.cols)
            .with_step_interval(Duration::from_millis(self.interval_ms))
            .with_random_alive_probability(self.probability)
    }
}

/// What the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Intent {
    Quit,
    StartStop,
    Step,
    Randomize,
    Clear,
    Click { column: u16, row: u16 },
}

/// Main entry point for the Game of Life application.
///
/// Validates the configuration, spawns the engine, sets up the terminal
/// interface and runs the event loop until the user quits.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or terminal manipulation
/// fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    setup_logging(&cli)?;

    let engine = Engine::spawn(cli.engine_config())?;
    if cli.random {
        engine.randomize().await?;
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &engine).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    engine.shutdown().await?;
    result
}

/// Installs a file logger when `--log-file` is given.
fn setup_logging(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let Some(path) = &cli.log_file else {
        return Ok(());
    };

    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(Mutex::new(File::create(path)?))
        .with_ansi(false)
        .with_target(false)
        .init();
    Ok(())
}

/// Redraws on every published snapshot and forwards intents to the engine.
async fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    engine: &Engine,
) -> Result<(), Box<dyn Error>> {
    let (intent_sender, mut intents) = mpsc::unbounded_channel();
    let input = tokio::task::spawn_blocking(move || read_input(intent_sender));

    let mut snapshots = engine.subscribe();
    let mut grid_area = Rect::default();

    loop {
        let snapshot = snapshots.borrow_and_update().clone();
        terminal.draw(|f| {
            let (grid, stats) = ui::layout(f.size());
            grid_area = grid;
            ui::draw_grid(f, &snapshot, grid);
            ui::draw_stats(f, &snapshot, stats);
        })?;

        tokio::select! {
            changed = snapshots.changed() => changed?,
            intent = intents.recv() => {
                let Some(intent) = intent else { break };
                match intent {
                    Intent::Quit => break,
                    Intent::StartStop => engine.toggle_running().await?,
                    Intent::Step => engine.step().await?,
                    Intent::Randomize => engine.randomize().await?,
                    Intent::Clear => engine.clear().await?,
                    Intent::Click { column, row } => {
                        let board = &snapshot.board;
                        let cell =
                            ui::cell_at(grid_area, column, row, board.rows(), board.cols());
                        if let Some((i, j)) = cell {
                            if let Err(e) = engine.toggle_cell(i, j).await {
                                warn!("Toggle failed: {}", e);
                            }
                        }
                    }
                }
            }
        }
    }

    info!("Quit requested");
    drop(intents);
    input.await??;
    Ok(())
}

/// Blocking loop translating terminal events into intents. Returns once the
/// receiving side is gone.
fn read_input(intents: mpsc::UnboundedSender<Intent>) -> io::Result<()> {
    while !intents.is_closed() {
        if !event::poll(INPUT_POLL_INTERVAL)? {
            continue;
        }
        let intent = match event::read()? {
            Event::Key(key) => match key.code {
                KeyCode::Char('q') => Intent::Quit,
                KeyCode::Char(' ') => Intent::StartStop,
                KeyCode::Enter => Intent::Step,
                KeyCode::Char('r') => Intent::Randomize,
                KeyCode::Char('c') => Intent::Clear,
                _ => continue,
            },
            Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                Intent::Click {
                    column: mouse.column,
                    row: mouse.row,
                }
            }
            _ => continue,
        };
        if intents.send(intent).is_err() {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_match_engine_defaults() {
        let cli = Cli::parse_from(["life"]);
        assert_eq!(cli.engine_config(), EngineConfig::default());
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "life",
            "--rows",
            "40",
            "--cols",
            "80",
            "--interval-ms",
            "50",
            "--probability",
            "0.5",
        ]);
        let config = cli.engine_config();
        assert_eq!((config.rows, config.cols), (40, 80));
        assert_eq!(config.step_interval, Duration::from_millis(50));
        assert_eq!(config.random_alive_probability, 0.5);
    }
}

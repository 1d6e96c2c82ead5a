//! Simulation engine and run-loop controller.
//!
//! The engine is a single tokio task that owns the current board, the
//! running flag and the statistics. [`Engine`] handles talk to it over a
//! command channel, and every change is published as a [`Snapshot`] on a
//! watch channel for renderers.
//!
//! While running, the task keeps exactly one timer armed. When the timer
//! fires the task advances one generation, publishes it, and arms the next
//! timer one interval later. `stop` and `step` disarm the timer inside the
//! same task, so once `stop` has returned no further generation appears.
//!
//! Each advance runs synchronously on the engine task (spreading the cells
//! over rayon's pool), so it holds up that tokio worker for its duration.
//! Grids up to a few hundred rows and columns advance in well under one
//! step interval; much larger grids delay other tasks on the same worker.

use std::future::pending;
use std::pin::Pin;

use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{sleep, Sleep};
use tracing::{debug, info, warn};

use crate::board::Board;
use crate::config::EngineConfig;
use crate::error::{LifeError, Result};
use crate::rules::{advance, Transition};

const COMMAND_BUFFER_SIZE: usize = 32;

/// Whether the run-loop is advancing generations on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Stopped,
    Running,
}

impl RunState {
    pub fn is_running(self) -> bool {
        self == RunState::Running
    }
}

/// Counters describing the simulation since the last clear or randomize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stats {
    /// Generations advanced
    pub generation: u64,
    /// Cells born by advances
    pub cells_created: u64,
    /// Cells that died in advances
    pub cells_destroyed: u64,
    /// Living cells on the current board
    pub population: u64,
}

impl Stats {
    fn reset(board: &Board) -> Self {
        Stats {
            population: board.population(),
            ..Stats::default()
        }
    }

    /// Average births per generation.
    pub fn birth_rate(&self) -> f64 {
        self.cells_created as f64 / self.generation.max(1) as f64
    }

    /// Average deaths per generation.
    pub fn death_rate(&self) -> f64 {
        self.cells_destroyed as f64 / self.generation.max(1) as f64
    }
}

/// Everything a renderer needs to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub board: Board,
    pub run_state: RunState,
    pub stats: Stats,
}

#[derive(Debug)]
enum Command {
    Start,
    Stop,
    ToggleRunning,
    Step,
    ToggleCell { row: usize, col: usize },
    Randomize,
    Clear,
    Shutdown,
}

#[derive(Debug)]
struct Request {
    command: Command,
    reply: oneshot::Sender<Result<()>>,
}

/// Handle to a running simulation engine.
///
/// Handles are cheap to clone; the engine task exits once every handle is
/// dropped or [`Engine::shutdown`] is called.
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    requests: mpsc::Sender<Request>,
    snapshots: watch::Receiver<Snapshot>,
}

impl Engine {
    /// Validates `config` and spawns the engine task on the current tokio
    /// runtime. The engine starts stopped, with an all-dead board.
    ///
    /// # Errors
    ///
    /// Returns the first configuration error found by
    /// [`EngineConfig::validate`], or [`LifeError::NoRuntime`] when called
    /// outside a tokio runtime.
    pub fn spawn(config: EngineConfig) -> Result<Engine> {
        let board = Board::new(config.rows, config.cols)?;
        Engine::spawn_with_board(config, board)
    }

    /// Like [`Engine::spawn`] but starts from the given board.
    ///
    /// # Errors
    ///
    /// Returns [`LifeError::DimensionMismatch`] if the board does not match
    /// the configured dimensions, plus the errors of [`Engine::spawn`].
    pub fn spawn_with_board(config: EngineConfig, board: Board) -> Result<Engine> {
        config.validate()?;
        if board.rows() != config.rows || board.cols() != config.cols {
            return Err(LifeError::DimensionMismatch {
                expected_rows: config.rows,
                expected_cols: config.cols,
                rows: board.rows(),
                cols: board.cols(),
            });
        }
        let runtime = Handle::try_current().map_err(|_| LifeError::NoRuntime)?;

        let state = SimulationState::new(board);
        let (snapshot_sender, snapshots) = watch::channel(state.snapshot());
        let (requests, request_receiver) = mpsc::channel(COMMAND_BUFFER_SIZE);

        let task = EngineTask {
            config: config.clone(),
            state,
            next_tick: None,
            requests: request_receiver,
            snapshots: snapshot_sender,
        };
        runtime.spawn(task.run());

        Ok(Engine {
            config,
            requests,
            snapshots,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the most recently published snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    /// Returns a receiver notified after every published change.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    /// Begins auto-advancing. The first generation appears one interval from
    /// now. Does nothing if already running.
    pub async fn start(&self) -> Result<()> {
        self.request(Command::Start).await
    }

    /// Halts auto-advancing. No generation is published after this returns.
    pub async fn stop(&self) -> Result<()> {
        self.request(Command::Stop).await
    }

    /// Starts when stopped, stops when running.
    pub async fn toggle_running(&self) -> Result<()> {
        self.request(Command::ToggleRunning).await
    }

    /// Advances exactly one generation. If the engine was running it is
    /// stopped first, so manual stepping always ends auto-play.
    pub async fn step(&self) -> Result<()> {
        self.request(Command::Step).await
    }

    /// Flips cell `(row, col)` on the current board. The run state is left
    /// as it is.
    ///
    /// # Errors
    ///
    /// Returns [`LifeError::IndexOutOfBounds`] for coordinates outside the
    /// board, in which case the board is unchanged.
    pub async fn toggle_cell(&self, row: usize, col: usize) -> Result<()> {
        self.request(Command::ToggleCell { row, col }).await
    }

    /// Replaces the board with a random one using the configured
    /// probability and resets the statistics.
    pub async fn randomize(&self) -> Result<()> {
        self.request(Command::Randomize).await
    }

    /// Replaces the board with an all-dead one and resets the statistics.
    pub async fn clear(&self) -> Result<()> {
        self.request(Command::Clear).await
    }

    /// Ends the engine task. Later calls on any handle fail with
    /// [`LifeError::EngineStopped`].
    pub async fn shutdown(&self) -> Result<()> {
        self.request(Command::Shutdown).await
    }

    async fn request(&self, command: Command) -> Result<()> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(Request { command, reply })
            .await
            .map_err(|_| LifeError::EngineStopped)?;
        response.await.map_err(|_| LifeError::EngineStopped)?
    }
}

/// Board, run flag and counters owned by the engine task.
#[derive(Debug)]
struct SimulationState {
    board: Board,
    run_state: RunState,
    stats: Stats,
}

impl SimulationState {
    fn new(board: Board) -> Self {
        let stats = Stats::reset(&board);
        SimulationState {
            board,
            run_state: RunState::Stopped,
            stats,
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            board: self.board.clone(),
            run_state: self.run_state,
            stats: self.stats,
        }
    }

    fn advance(&mut self) {
        let next = advance(&self.board);
        let transition = Transition::between(&self.board, &next);
        self.board = next;
        self.stats.generation += 1;
        self.stats.cells_created += transition.births;
        self.stats.cells_destroyed += transition.deaths;
        self.stats.population = self.board.population();
    }

    fn replace_board(&mut self, board: Board) {
        self.stats = Stats::reset(&board);
        self.board = board;
    }
}

struct EngineTask {
    config: EngineConfig,
    state: SimulationState,
    /// Armed only while running
    next_tick: Option<Pin<Box<Sleep>>>,
    requests: mpsc::Receiver<Request>,
    snapshots: watch::Sender<Snapshot>,
}

impl EngineTask {
    async fn run(mut self) {
        info!(
            rows = self.config.rows,
            cols = self.config.cols,
            interval_ms = self.config.step_interval.as_millis() as u64,
            "Simulation engine started"
        );

        loop {
            tokio::select! {
                request = self.requests.recv() => {
                    let Some(Request { command, reply }) = request else {
                        debug!("All engine handles dropped");
                        break;
                    };
                    let shutdown = matches!(command, Command::Shutdown);
                    let result = self.handle(command);
                    let _ = reply.send(result);
                    if shutdown {
                        break;
                    }
                }
                () = tick(&mut self.next_tick) => self.on_tick(),
            }
        }

        info!(
            generation = self.state.stats.generation,
            "Simulation engine shut down"
        );
    }

    fn handle(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Start => self.start(),
            Command::Stop => self.stop(),
            Command::ToggleRunning => {
                if self.state.run_state.is_running() {
                    self.stop();
                } else {
                    self.start();
                }
            }
            Command::Step => {
                if self.halt() {
                    info!(
                        generation = self.state.stats.generation,
                        "Run-loop stopped by manual step"
                    );
                }
                self.state.advance();
                debug!(
                    generation = self.state.stats.generation,
                    population = self.state.stats.population,
                    "Manual step"
                );
                self.publish();
            }
            Command::ToggleCell { row, col } => {
                let board = self.state.board.toggle(row, col).map_err(|e| {
                    warn!("Rejected cell toggle: {}", e);
                    e
                })?;
                self.state.board = board;
                self.state.stats.population = self.state.board.population();
                self.publish();
            }
            Command::Randomize => {
                let board = Board::random(
                    self.config.rows,
                    self.config.cols,
                    self.config.random_alive_probability,
                )?;
                self.state.replace_board(board);
                debug!(population = self.state.stats.population, "Board randomized");
                self.publish();
            }
            Command::Clear => {
                self.state.replace_board(Board::clear(self.config.rows, self.config.cols)?);
                debug!("Board cleared");
                self.publish();
            }
            Command::Shutdown => {
                self.halt();
            }
        }
        Ok(())
    }

    fn start(&mut self) {
        if self.state.run_state.is_running() {
            return;
        }
        self.state.run_state = RunState::Running;
        self.arm();
        info!(generation = self.state.stats.generation, "Run-loop started");
        self.publish();
    }

    fn stop(&mut self) {
        if self.halt() {
            info!(generation = self.state.stats.generation, "Run-loop stopped");
            self.publish();
        }
    }

    /// Switches to stopped and disarms the timer. Returns whether the engine
    /// was running.
    fn halt(&mut self) -> bool {
        self.next_tick = None;
        let was_running = self.state.run_state.is_running();
        self.state.run_state = RunState::Stopped;
        was_running
    }

    fn arm(&mut self) {
        self.next_tick = Some(Box::pin(sleep(self.config.step_interval)));
    }

    fn on_tick(&mut self) {
        self.next_tick = None;
        if !self.state.run_state.is_running() {
            return;
        }

        self.state.advance();
        debug!(
            generation = self.state.stats.generation,
            population = self.state.stats.population,
            "Generation advanced"
        );
        self.publish();
        self.arm();
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.state.snapshot());
    }
}

/// Resolves when the armed timer fires; never resolves while disarmed.
async fn tick(next_tick: &mut Option<Pin<Box<Sleep>>>) {
    match next_tick {
        Some(timer) => timer.as_mut().await,
        None => pending().await,
    }
}

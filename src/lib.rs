//! # Life Engine
//!
//! A fixed-size Conway's Game of Life simulator.
//!
//! ## Features
//!
//! * Immutable [`Board`] snapshots that can be shared with a renderer
//! * The classic B3/S23 rule with hard, non-wrapping edges
//! * A timer-driven run-loop with start, stop and single-step control
//! * Snapshot publication after every change, with generation statistics

pub mod board;
pub mod config;
pub mod engine;
pub mod error;
pub mod rules;

pub use board::{Board, Cell};
pub use config::EngineConfig;
pub use engine::{Engine, RunState, Snapshot, Stats};
pub use error::{LifeError, Result};
pub use rules::advance;

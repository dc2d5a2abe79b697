//! Work container, agent execution loop, and tick cycle for Deckhand.
//!
//! This crate wires the generic job engine from `deckhand-jobs` to the tile
//! graph from `deckhand-world`: agents walk the grid, containers hand out
//! jobs first-fit, and each tick runs every agent's job logic followed by
//! its movement.
//!
//! # Modules
//!
//! - [`agent`] -- [`Agent`] state, path requests, and movement interpolation.
//! - [`clock`] -- Simulation clock with tick counter and elapsed time.
//! - [`config`] -- Configuration loading from `deckhand-config.yaml`.
//! - [`container`] -- [`WorkContainer`]: spots, agents, and jobs of one vessel.
//! - [`runner`] -- Bounded async simulation loop with a per-tick callback.
//! - [`tasks`] -- Built-in requirements, actions, and toil builders.
//! - [`tick`] -- The per-tick agent loop.
//!
//! [`Agent`]: agent::Agent
//! [`WorkContainer`]: container::WorkContainer

pub mod agent;
pub mod clock;
pub mod config;
pub mod container;
pub mod runner;
pub mod tasks;
pub mod tick;

pub use agent::{Agent, Arrival, DEFAULT_MOVE_SPEED};
pub use clock::{ClockError, SimClock};
pub use config::{ConfigError, SimulationConfig};
pub use container::{ContainerError, DetachPolicy, ShipJob, ShipToil, WorkContainer};
pub use runner::{
    NoOpCallback, RunLimits, RunnerError, SimulationEndReason, SimulationResult, TickCallback,
    log_simulation_end, run_simulation,
};
pub use tick::{TickError, TickSummary, run_tick};

//! Bounded simulation loop.
//!
//! [`run_simulation`] drives [`run_tick`] until the tick limit is reached or,
//! when configured, until no jobs remain. Cancelled jobs are torn down after
//! every tick, and the loop sleeps between ticks when an interval is set.
//!
//! [`run_tick`]: crate::tick::run_tick

use tracing::info;

use crate::clock::SimClock;
use crate::config::SimulationConfig;
use crate::container::WorkContainer;
use crate::tick::{self, TickError, TickSummary};

/// Errors that can occur during the simulation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A tick execution failed.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: TickError,
    },
}

/// Why the run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationEndReason {
    /// The configured tick limit was reached.
    MaxTicksReached,
    /// No jobs remain and the run was set to stop when idle.
    AllJobsDone,
}

/// Boundaries of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunLimits {
    /// Stop after this many ticks (0 = unlimited).
    pub max_ticks: u64,
    /// Stop as soon as the container holds no jobs.
    pub stop_when_idle: bool,
    /// Real-time pause between ticks in milliseconds.
    pub tick_interval_ms: u64,
}

impl RunLimits {
    /// Limits taken from the simulation and world sections of the config.
    pub const fn from_config(config: &SimulationConfig) -> Self {
        Self {
            max_ticks: config.simulation.max_ticks,
            stop_when_idle: config.simulation.stop_when_idle,
            tick_interval_ms: config.world.tick_interval_ms,
        }
    }

    const fn tick_limit_reached(&self, tick: u64) -> bool {
        self.max_ticks > 0 && tick >= self.max_ticks
    }
}

/// Result of the simulation run.
#[derive(Debug)]
pub struct SimulationResult {
    /// The reason the simulation ended.
    pub end_reason: SimulationEndReason,
    /// The last tick summary, if any tick completed.
    pub final_summary: Option<TickSummary>,
    /// Total number of ticks executed.
    pub total_ticks: u64,
    /// Total number of jobs that completed.
    pub jobs_completed: u64,
    /// Total number of cancelled jobs torn down.
    pub jobs_reaped: u64,
}

/// Callback invoked after each tick completes.
pub trait TickCallback {
    /// Called after a tick completes successfully and cancelled jobs have
    /// been reaped.
    fn on_tick(&mut self, summary: &TickSummary, container: &WorkContainer);
}

/// A callback that does nothing.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _container: &WorkContainer) {}
}

/// Run the tick loop until a limit in `limits` is hit.
///
/// # Errors
///
/// Returns [`RunnerError`] if a tick fails.
pub async fn run_simulation(
    container: &mut WorkContainer,
    clock: &mut SimClock,
    limits: RunLimits,
    callback: &mut dyn TickCallback,
) -> Result<SimulationResult, RunnerError> {
    let mut last_summary: Option<TickSummary> = None;
    let mut total_ticks: u64 = 0;
    let mut jobs_completed: u64 = 0;
    let mut jobs_reaped: u64 = 0;

    info!(
        max_ticks = limits.max_ticks,
        stop_when_idle = limits.stop_when_idle,
        tick_interval_ms = limits.tick_interval_ms,
        agents = container.agents().len(),
        jobs = container.open_jobs(),
        "Simulation starting"
    );

    loop {
        if limits.stop_when_idle && container.open_jobs() == 0 {
            info!(tick = clock.tick(), "No jobs left");
            return Ok(SimulationResult {
                end_reason: SimulationEndReason::AllJobsDone,
                final_summary: last_summary,
                total_ticks,
                jobs_completed,
                jobs_reaped,
            });
        }

        let mut summary = tick::run_tick(container, clock)?;
        total_ticks = total_ticks.saturating_add(1);
        jobs_completed = jobs_completed.saturating_add(u64::try_from(summary.completed.len()).unwrap_or(u64::MAX));

        let reaped = container.reap_cancelled();
        if !reaped.is_empty() {
            info!(tick = summary.tick, count = reaped.len(), "Cancelled jobs reaped");
            jobs_reaped = jobs_reaped.saturating_add(u64::try_from(reaped.len()).unwrap_or(u64::MAX));
            summary.open_jobs = container.open_jobs();
        }

        callback.on_tick(&summary, container);

        if limits.tick_limit_reached(summary.tick) {
            info!(tick = summary.tick, max_ticks = limits.max_ticks, "Tick limit reached");
            return Ok(SimulationResult {
                end_reason: SimulationEndReason::MaxTicksReached,
                final_summary: Some(summary),
                total_ticks,
                jobs_completed,
                jobs_reaped,
            });
        }

        last_summary = Some(summary);

        if limits.tick_interval_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(limits.tick_interval_ms)).await;
        }
    }
}

/// Log the outcome of a run.
pub fn log_simulation_end(result: &SimulationResult) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        jobs_completed = result.jobs_completed,
        jobs_reaped = result.jobs_reaped,
        final_tick = result.final_summary.as_ref().map(|s| s.tick),
        open_jobs = result.final_summary.as_ref().map(|s| s.open_jobs),
        "Simulation ended"
    );
}

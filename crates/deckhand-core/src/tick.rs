//! The per-tick agent loop.
//!
//! Each tick advances the clock once, then visits agents in container order.
//! For every agent job logic runs first (take a job if idle, then work it or
//! let go of it), followed by movement along the queued route.

use deckhand_jobs::JobError;
use deckhand_types::{AgentId, JobId};
use deckhand_world::{GridError, ShipGrid};
use tracing::{debug, info, trace, warn};

use crate::agent::Agent;
use crate::clock::{ClockError, SimClock};
use crate::container::{DetachPolicy, ShipJob, WorkContainer, first_workable};

/// Errors that can abort a tick.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// A clock operation failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// A job invariant was violated while an agent handled it.
    #[error("job error for agent {agent_id}: {source}")]
    Job {
        /// The agent that was handling the job.
        agent_id: AgentId,
        /// The underlying job error.
        source: JobError,
    },

    /// Updating spot occupancy failed.
    #[error("grid error: {source}")]
    Grid {
        /// The underlying grid error.
        #[from]
        source: GridError,
    },
}

/// What happened during one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickSummary {
    /// The tick number that was executed.
    pub tick: u64,
    /// Simulated seconds elapsed after this tick.
    pub elapsed: f64,
    /// Jobs handed to idle agents this tick.
    pub assigned: Vec<(AgentId, JobId)>,
    /// Jobs whose worker let go because they stopped qualifying.
    pub detached: Vec<(AgentId, JobId)>,
    /// Jobs that completed and were removed.
    pub completed: Vec<JobId>,
    /// Number of spot-to-spot steps finished.
    pub arrivals: u32,
    /// Jobs left in the container at the end of the tick.
    pub open_jobs: usize,
}

/// Execute one tick of the agent loop.
///
/// A path requested by an agent's job logic starts moving in that same
/// tick, since movement follows job logic within each agent's turn.
///
/// # Errors
///
/// Returns [`TickError`] if the clock overflows, a job invariant is
/// violated, or occupancy cannot be updated on arrival.
pub fn run_tick(
    container: &mut WorkContainer,
    clock: &mut SimClock,
) -> Result<TickSummary, TickError> {
    let tick = clock.advance()?;
    let dt = clock.dt_seconds();
    let policy = container.policy();
    let mut summary = TickSummary {
        tick,
        elapsed: clock.elapsed_seconds(),
        ..TickSummary::default()
    };

    let (site, agents, jobs) = container.split_mut();
    for agent in agents.iter_mut() {
        if agent.drop_stale_route(|pos| site.has_spot(pos)) {
            warn!(agent = %agent.id(), at = %agent.current_spot(), "Route crossed a removed spot");
        }
        handle_job(agent, site, jobs, policy, dt, &mut summary)?;

        if let Some(arrival) = agent.advance_movement(dt) {
            site.move_occupant(agent.id(), arrival.from, arrival.to)?;
            summary.arrivals = summary.arrivals.saturating_add(1);
            trace!(agent = %agent.id(), from = %arrival.from, to = %arrival.to, "Arrived");
        }
    }

    summary.open_jobs = jobs.len();
    debug!(
        tick,
        assigned = summary.assigned.len(),
        completed = summary.completed.len(),
        detached = summary.detached.len(),
        open_jobs = summary.open_jobs,
        "Tick complete"
    );
    Ok(summary)
}

/// Job half of one agent's turn.
fn handle_job(
    agent: &mut Agent,
    site: &mut ShipGrid,
    jobs: &mut Vec<ShipJob>,
    policy: DetachPolicy,
    dt: f32,
    summary: &mut TickSummary,
) -> Result<(), TickError> {
    let agent_id = agent.id();
    let job_err = |source: JobError| TickError::Job { agent_id, source };

    if agent.is_idle()
        && let Some(job) = first_workable(jobs, agent, site).and_then(|i| jobs.get_mut(i))
    {
        job.assign(agent_id).map_err(job_err)?;
        agent.assign_job(job.id());
        summary.assigned.push((agent_id, job.id()));
        info!(agent = %agent_id, job = %job.id(), label = job.label(), "Job assigned to agent");
    }

    let Some(job_id) = agent.assigned_job() else {
        return Ok(());
    };
    let Some(index) = jobs.iter().position(|j| j.id() == job_id) else {
        debug!(agent = %agent_id, job = %job_id, "Assigned job no longer exists");
        agent.clear_job();
        return Ok(());
    };
    let Some(job) = jobs.get_mut(index) else {
        return Ok(());
    };

    let verdict = job.qualify(agent, site);
    if let Some(reason) = verdict.reason() {
        match policy {
            DetachPolicy::Detach => {
                job.detach();
            }
            DetachPolicy::Quit => job.quit(agent, site).map_err(job_err)?,
        }
        agent.clear_job();
        summary.detached.push((agent_id, job_id));
        debug!(agent = %agent_id, job = %job_id, ?policy, reason, "Job no longer qualifies");
        return Ok(());
    }

    if job.work(agent, site, dt).map_err(job_err)? {
        let job = jobs.remove(index);
        agent.clear_job();
        summary.completed.push(job_id);
        info!(agent = %agent_id, job = %job_id, label = job.label(), "Job completed");
    }
    Ok(())
}

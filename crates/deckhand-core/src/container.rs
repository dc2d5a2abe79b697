//! The work container: one vessel's spots, agents, and jobs.
//!
//! Agents and jobs are kept in insertion order, which is the order the tick
//! visits agents in and the order idle agents scan jobs in (first fit).

use deckhand_jobs::{Job, JobError, Toil};
use deckhand_types::{AgentId, BlockKind, JobId, TilePos};
use deckhand_world::{GridError, ShipGrid, Spot};
use tracing::{debug, info, warn};

use crate::agent::Agent;
use crate::config::JobsConfig;

/// A job operating on agents and the ship grid.
pub type ShipJob = Job<Agent, ShipGrid>;

/// A toil operating on agents and the ship grid.
pub type ShipToil = Toil<Agent, ShipGrid>;

/// What the tick does with a job that stops qualifying for its worker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DetachPolicy {
    /// Clear the worker only. Action state (progress, claims) is left as is.
    #[default]
    Detach,
    /// Run the full quit so every action in the tree can reset.
    Quit,
}

impl DetachPolicy {
    /// Policy selected by the jobs section of the configuration.
    pub const fn from_config(config: &JobsConfig) -> Self {
        if config.quit_on_disqualify {
            Self::Quit
        } else {
            Self::Detach
        }
    }
}

/// Errors raised by container operations.
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    /// No spot exists at the given coordinate.
    #[error("no spot at {0}")]
    SpotNotFound(TilePos),

    /// No agent with this id lives in the container.
    #[error("agent {0} not found")]
    AgentNotFound(AgentId),

    /// No job with this id lives in the container.
    #[error("job {0} not found")]
    JobNotFound(JobId),

    /// Removing the spot would leave an agent with nowhere to stand.
    #[error("agent {agent} on {pos} has no spot to move to")]
    Stranded {
        /// The spot whose removal was refused.
        pos: TilePos,
        /// An agent standing there.
        agent: AgentId,
    },

    /// A grid operation failed.
    #[error("grid error: {0}")]
    Grid(#[from] GridError),

    /// A job operation failed.
    #[error("job error: {0}")]
    Job(#[from] JobError),
}

/// Owner of a tile graph and the agents and jobs living on it.
#[derive(Debug, Default)]
pub struct WorkContainer {
    site: ShipGrid,
    agents: Vec<Agent>,
    jobs: Vec<ShipJob>,
    policy: DetachPolicy,
}

impl WorkContainer {
    /// Create a container around `site` with no agents or jobs.
    pub const fn new(site: ShipGrid) -> Self {
        Self {
            site,
            agents: Vec::new(),
            jobs: Vec::new(),
            policy: DetachPolicy::Detach,
        }
    }

    /// Set the policy applied when a job stops qualifying.
    #[must_use]
    pub const fn with_policy(mut self, policy: DetachPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The active detach policy.
    pub const fn policy(&self) -> DetachPolicy {
        self.policy
    }

    // -------------------------------------------------------------------
    // Agents
    // -------------------------------------------------------------------

    /// Place a new agent on the spot at `pos`.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::SpotNotFound`] if there is no spot at `pos`.
    pub fn spawn_agent(
        &mut self,
        name: impl Into<String>,
        pos: TilePos,
        speed: f32,
    ) -> Result<AgentId, ContainerError> {
        if !self.site.has_spot(pos) {
            return Err(ContainerError::SpotNotFound(pos));
        }
        let agent = Agent::new(name, pos, speed);
        let id = agent.id();
        self.site.set_occupant(pos, id)?;
        info!(agent = %id, name = agent.name(), %pos, "Agent spawned");
        self.agents.push(agent);
        Ok(id)
    }

    /// All agents in iteration order.
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Look up an agent.
    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id() == id)
    }

    // -------------------------------------------------------------------
    // Jobs
    // -------------------------------------------------------------------

    /// Append a job at `position` driven by `root`.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::Job`] if the toil tree is too deep.
    pub fn create_job(
        &mut self,
        label: impl Into<String>,
        position: TilePos,
        root: ShipToil,
    ) -> Result<JobId, ContainerError> {
        let job = Job::new(label, position, root)?;
        let id = job.id();
        info!(job = %id, label = job.label(), %position, "Job created");
        self.jobs.push(job);
        Ok(id)
    }

    /// All jobs in iteration order.
    pub fn jobs(&self) -> &[ShipJob] {
        &self.jobs
    }

    /// Look up a job.
    pub fn job(&self, id: JobId) -> Option<&ShipJob> {
        self.jobs.iter().find(|j| j.id() == id)
    }

    /// Number of jobs still in the container.
    pub fn open_jobs(&self) -> usize {
        self.jobs.len()
    }

    /// Remove a job. A worker still holding it quits through the toil tree
    /// and is left idle.
    pub fn remove_job(&mut self, id: JobId) -> Option<ShipJob> {
        let index = self.jobs.iter().position(|j| j.id() == id)?;
        let mut job = self.jobs.remove(index);

        if let Some(worker) = job.worker() {
            match self.agents.iter_mut().find(|a| a.id() == worker) {
                Some(agent) => {
                    if let Err(e) = job.quit(agent, &mut self.site) {
                        warn!(job = %id, agent = %worker, error = %e, "Quit failed during removal");
                    }
                    if agent.assigned_job() == Some(id) {
                        agent.clear_job();
                    }
                }
                None => {
                    warn!(job = %id, agent = %worker, "Worker of removed job is not in the container");
                    job.detach();
                }
            }
        }

        info!(job = %id, label = job.label(), "Job removed");
        Some(job)
    }

    /// Flag a job as cancelled. It keeps running until it is reaped.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::JobNotFound`] if the job does not exist.
    pub fn cancel_job(&mut self, id: JobId) -> Result<(), ContainerError> {
        let job = self
            .jobs
            .iter_mut()
            .find(|j| j.id() == id)
            .ok_or(ContainerError::JobNotFound(id))?;
        job.cancel();
        debug!(job = %id, "Job cancelled");
        Ok(())
    }

    /// Remove every cancelled job. Returns their ids in container order.
    pub fn reap_cancelled(&mut self) -> Vec<JobId> {
        let cancelled: Vec<JobId> = self
            .jobs
            .iter()
            .filter(|j| j.is_cancelled())
            .map(Job::id)
            .collect();
        for id in &cancelled {
            self.remove_job(*id);
        }
        cancelled
    }

    /// First job, in container order, that nobody holds, is not cancelled,
    /// and qualifies for `agent`.
    pub fn find_workable_job(&self, agent: AgentId) -> Option<JobId> {
        let agent = self.agent(agent)?;
        first_workable(&self.jobs, agent, &self.site).and_then(|i| self.jobs.get(i).map(Job::id))
    }

    // -------------------------------------------------------------------
    // Spots
    // -------------------------------------------------------------------

    /// Look up the spot at `pos`.
    pub fn get_spot(&self, pos: TilePos) -> Option<&Spot> {
        self.site.spot(pos)
    }

    /// Place or re-block a spot. Returns `true` if it is new.
    pub fn place_spot(&mut self, pos: TilePos, block: BlockKind) -> bool {
        self.site.place_spot(pos, block)
    }

    /// Remove the spot at `pos`.
    ///
    /// Agents standing on it are moved to the nearest remaining spot and let
    /// go of their job under the active [`DetachPolicy`]. Agents stepping
    /// onto it or routing through it are snapped back onto their current
    /// spot, and jobs positioned on it are removed.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::Grid`] if the spot does not exist, or
    /// [`ContainerError::Stranded`] if an agent stands on the only spot left.
    pub fn remove_spot(&mut self, pos: TilePos) -> Result<Spot, ContainerError> {
        if !self.site.has_spot(pos) {
            warn!(%pos, "Spot removal refused: no such spot");
            return Err(GridError::SpotNotFound(pos).into());
        }
        let standing: Vec<AgentId> = self
            .agents
            .iter()
            .filter(|a| a.current_spot() == pos)
            .map(Agent::id)
            .collect();
        let refuge = match (self.site.nearest_spot(pos), standing.first()) {
            (Some(refuge), _) => Some(refuge),
            (None, None) => None,
            (None, Some(&agent)) => {
                warn!(%pos, %agent, "Spot removal refused: agent would be stranded");
                return Err(ContainerError::Stranded { pos, agent });
            }
        };

        let spot = self.site.evict_spot(pos)?;

        if let Some(refuge) = refuge {
            for id in standing {
                self.release_job(id);
                if let Some(agent) = self.agents.iter_mut().find(|a| a.id() == id) {
                    agent.relocate(refuge);
                }
                self.site.set_occupant(refuge, id)?;
                info!(agent = %id, from = %pos, to = %refuge, "Agent displaced by spot removal");
            }
        }

        for agent in self.agents.iter_mut().filter(|a| a.route_contains(pos)) {
            debug!(agent = %agent.id(), %pos, "Route invalidated by spot removal");
            agent.reanchor();
        }

        let stale: Vec<JobId> = self
            .jobs
            .iter()
            .filter(|j| j.position() == pos)
            .map(Job::id)
            .collect();
        for id in stale {
            self.remove_job(id);
        }
        Ok(spot)
    }

    /// Let `agent_id` go of its job, detaching or quitting per the policy.
    fn release_job(&mut self, agent_id: AgentId) {
        let Some(agent) = self.agents.iter_mut().find(|a| a.id() == agent_id) else {
            return;
        };
        let Some(job_id) = agent.assigned_job() else {
            return;
        };
        if let Some(job) = self.jobs.iter_mut().find(|j| j.id() == job_id) {
            match self.policy {
                DetachPolicy::Detach => {
                    job.detach();
                }
                DetachPolicy::Quit => {
                    if let Err(e) = job.quit(agent, &mut self.site) {
                        warn!(job = %job_id, agent = %agent_id, error = %e, "Quit failed during displacement");
                        job.detach();
                    }
                }
            }
        }
        agent.clear_job();
        debug!(agent = %agent_id, job = %job_id, policy = ?self.policy, "Job released");
    }

    /// The tile graph.
    pub const fn site(&self) -> &ShipGrid {
        &self.site
    }

    /// Mutable access to the tile graph, for stock and block edits. Spot
    /// removal should go through [`WorkContainer::remove_spot`]; a raw removal
    /// skips route and job invalidation, and the tick only recovers routes.
    pub const fn site_mut(&mut self) -> &mut ShipGrid {
        &mut self.site
    }

    /// Disjoint mutable borrows for the tick.
    pub(crate) fn split_mut(&mut self) -> (&mut ShipGrid, &mut [Agent], &mut Vec<ShipJob>) {
        (&mut self.site, self.agents.as_mut_slice(), &mut self.jobs)
    }
}

/// Index of the first job `agent` could take.
pub(crate) fn first_workable(jobs: &[ShipJob], agent: &Agent, site: &ShipGrid) -> Option<usize> {
    jobs.iter().position(|job| {
        job.worker().is_none() && !job.is_cancelled() && job.qualify(agent, site).is_met()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use deckhand_jobs::{Action, FnRequirement, ToilFrame, Verdict};

    use super::*;

    /// Never finishes; counts quit calls.
    struct Tally {
        quits: Rc<Cell<u32>>,
    }

    impl Action<Agent, ShipGrid> for Tally {
        fn name(&self) -> &str {
            "tally"
        }

        fn work(
            &mut self,
            _worker: &mut Agent,
            _site: &mut ShipGrid,
            _frame: &ToilFrame,
            _dt: f32,
        ) -> Result<bool, JobError> {
            Ok(false)
        }

        fn on_quit(&mut self, _worker: &mut Agent, _site: &mut ShipGrid, _frame: &ToilFrame) {
            self.quits.set(self.quits.get().saturating_add(1));
        }
    }

    fn tally() -> (ShipToil, Rc<Cell<u32>>) {
        let quits = Rc::new(Cell::new(0));
        (
            Toil::new(Tally {
                quits: Rc::clone(&quits),
            }),
            quits,
        )
    }

    fn container() -> WorkContainer {
        WorkContainer::new(ShipGrid::rectangle(4, 4, &BlockKind::new("deck"), false))
    }

    fn p(x: i32, y: i32) -> TilePos {
        TilePos::new(x, y)
    }

    fn assign(c: &mut WorkContainer, agent: AgentId, job: JobId) {
        let (_, agents, jobs) = c.split_mut();
        jobs.iter_mut().find(|j| j.id() == job).unwrap().assign(agent).unwrap();
        agents.iter_mut().find(|a| a.id() == agent).unwrap().assign_job(job);
    }

    #[test]
    fn spawn_agent_sets_occupant() {
        let mut c = container();
        let id = c.spawn_agent("Ada", p(1, 1), 1.5).unwrap();
        assert_eq!(c.get_spot(p(1, 1)).unwrap().occupant(), Some(id));
        assert_eq!(c.agents().len(), 1);
        assert!(c.agent(id).is_some());
    }

    #[test]
    fn spawn_agent_off_grid_fails() {
        let mut c = container();
        assert!(matches!(
            c.spawn_agent("Ada", p(9, 9), 1.5),
            Err(ContainerError::SpotNotFound(_))
        ));
    }

    #[test]
    fn find_workable_job_is_first_fit() {
        let mut c = container();
        let agent = c.spawn_agent("Ada", p(0, 0), 1.5).unwrap();
        let (t1, _) = tally();
        let (t2, _) = tally();
        let first = c.create_job("first", p(3, 3), t1).unwrap();
        let _second = c.create_job("second", p(2, 2), t2).unwrap();
        assert_eq!(c.find_workable_job(agent), Some(first));
    }

    #[test]
    fn held_and_cancelled_jobs_are_skipped() {
        let mut c = container();
        let a = c.spawn_agent("Ada", p(0, 0), 1.5).unwrap();
        let b = c.spawn_agent("Brin", p(1, 0), 1.5).unwrap();
        let (t1, _) = tally();
        let (t2, _) = tally();
        let (t3, _) = tally();
        let held = c.create_job("held", p(3, 3), t1).unwrap();
        let cancelled = c.create_job("cancelled", p(3, 2), t2).unwrap();
        let open = c.create_job("open", p(3, 1), t3).unwrap();

        assign(&mut c, a, held);
        c.cancel_job(cancelled).unwrap();
        assert_eq!(c.find_workable_job(b), Some(open));
    }

    #[test]
    fn unqualified_jobs_are_skipped() {
        let mut c = container();
        let agent = c.spawn_agent("Ada", p(0, 0), 1.5).unwrap();
        let (t, _) = tally();
        let gated = t.require(FnRequirement::new("never", |_: &Agent, _: &ShipGrid, _: &ToilFrame| {
            Verdict::unmet("never")
        }));
        c.create_job("gated", p(3, 3), gated).unwrap();
        assert_eq!(c.find_workable_job(agent), None);
    }

    #[test]
    fn remove_job_quits_worker() {
        let mut c = container();
        let agent = c.spawn_agent("Ada", p(0, 0), 1.5).unwrap();
        let (t, quits) = tally();
        let job = c.create_job("job", p(3, 3), t).unwrap();
        assign(&mut c, agent, job);

        let removed = c.remove_job(job).unwrap();
        assert_eq!(removed.worker(), None);
        assert_eq!(quits.get(), 1);
        assert_eq!(c.agent(agent).unwrap().assigned_job(), None);
        assert!(c.job(job).is_none());
    }

    #[test]
    fn remove_unknown_job_is_none() {
        let mut c = container();
        assert!(c.remove_job(JobId::new()).is_none());
    }

    #[test]
    fn cancel_unknown_job_fails() {
        let mut c = container();
        assert!(matches!(
            c.cancel_job(JobId::new()),
            Err(ContainerError::JobNotFound(_))
        ));
    }

    #[test]
    fn reap_cancelled_removes_only_cancelled() {
        let mut c = container();
        let (t1, _) = tally();
        let (t2, _) = tally();
        let keep = c.create_job("keep", p(1, 1), t1).unwrap();
        let doomed = c.create_job("doomed", p(2, 2), t2).unwrap();
        c.cancel_job(doomed).unwrap();

        assert_eq!(c.reap_cancelled(), vec![doomed]);
        assert_eq!(c.open_jobs(), 1);
        assert!(c.job(keep).is_some());
    }

    #[test]
    fn standing_agent_is_displaced_and_detached() {
        let mut c = container();
        let agent = c.spawn_agent("Ada", p(1, 1), 1.5).unwrap();
        let (t, quits) = tally();
        let job = c.create_job("elsewhere", p(3, 3), t).unwrap();
        assign(&mut c, agent, job);

        let removed = c.remove_spot(p(1, 1)).unwrap();
        assert!(removed.occupants().contains(&agent));
        assert!(c.get_spot(p(1, 1)).is_none());

        let ada = c.agent(agent).unwrap();
        assert_eq!(ada.current_spot(), p(0, 1));
        assert!(ada.is_at_rest());
        assert!(ada.is_idle());
        assert_eq!(c.get_spot(p(0, 1)).unwrap().occupant(), Some(agent));

        assert_eq!(c.job(job).unwrap().worker(), None);
        assert_eq!(quits.get(), 0);
    }

    #[test]
    fn standing_agent_quits_under_quit_policy() {
        let mut c = container().with_policy(DetachPolicy::Quit);
        let agent = c.spawn_agent("Ada", p(1, 1), 1.5).unwrap();
        let (t, quits) = tally();
        let job = c.create_job("elsewhere", p(3, 3), t).unwrap();
        assign(&mut c, agent, job);

        c.remove_spot(p(1, 1)).unwrap();
        assert_eq!(quits.get(), 1);
        assert_eq!(c.job(job).unwrap().worker(), None);
        assert!(c.agent(agent).unwrap().is_idle());
    }

    #[test]
    fn last_occupied_spot_is_kept() {
        let mut c = WorkContainer::new(ShipGrid::rectangle(1, 1, &BlockKind::new("deck"), false));
        let agent = c.spawn_agent("Ada", p(0, 0), 1.5).unwrap();
        assert!(matches!(
            c.remove_spot(p(0, 0)),
            Err(ContainerError::Stranded { agent: a, .. }) if a == agent
        ));
        assert!(c.get_spot(p(0, 0)).is_some());
    }

    #[test]
    fn removing_missing_spot_fails() {
        let mut c = container();
        assert!(matches!(
            c.remove_spot(p(9, 9)),
            Err(ContainerError::Grid(GridError::SpotNotFound(_)))
        ));
    }

    #[test]
    fn spot_removal_invalidates_routes_and_jobs() {
        let mut c = container();
        let agent = c.spawn_agent("Ada", p(0, 0), 1.0).unwrap();
        {
            let (_, agents, _) = c.split_mut();
            agents
                .first_mut()
                .unwrap()
                .set_path([p(1, 0), p(2, 0), p(3, 0)]);
        }
        let (t, _) = tally();
        let job = c.create_job("on removed spot", p(2, 0), t).unwrap();

        let removed = c.remove_spot(p(2, 0)).unwrap();
        assert_eq!(removed.pos, p(2, 0));
        assert!(c.agent(agent).unwrap().is_at_rest());
        assert!(c.job(job).is_none());
        assert!(c.get_spot(p(2, 0)).is_none());
    }

    #[test]
    fn policy_follows_config() {
        let mut jobs = JobsConfig::default();
        assert_eq!(DetachPolicy::from_config(&jobs), DetachPolicy::Detach);
        jobs.quit_on_disqualify = true;
        assert_eq!(DetachPolicy::from_config(&jobs), DetachPolicy::Quit);
        let c = container().with_policy(DetachPolicy::Quit);
        assert_eq!(c.policy(), DetachPolicy::Quit);
    }
}

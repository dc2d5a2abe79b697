//! Agent state: position, movement interpolation, and path requests.
//!
//! An agent stands on `current_spot` and, while moving, interpolates towards
//! `next_spot` by `move_progress`. The remaining route is kept in `path`,
//! nearest spot first. Whenever `next_spot` is `None` the progress is zero.

use std::collections::VecDeque;

use deckhand_jobs::Worker;
use deckhand_types::{AgentId, JobId, TilePos};
use deckhand_world::{Graph, PathError, find_path};
use tracing::debug;

/// Reference movement speed in spots per second.
pub const DEFAULT_MOVE_SPEED: f32 = 1.5;

/// An agent stepping from one spot onto the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arrival {
    /// The spot the agent left.
    pub from: TilePos,
    /// The spot the agent now stands on.
    pub to: TilePos,
}

/// A crew member that takes jobs and walks the tile graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    id: AgentId,
    name: String,
    current_spot: TilePos,
    next_spot: Option<TilePos>,
    move_progress: f32,
    assigned_job: Option<JobId>,
    path: VecDeque<TilePos>,
    speed: f32,
}

impl Agent {
    /// Create an idle agent standing at `spot`.
    pub fn new(name: impl Into<String>, spot: TilePos, speed: f32) -> Self {
        Self {
            id: AgentId::new(),
            name: name.into(),
            current_spot: spot,
            next_spot: None,
            move_progress: 0.0,
            assigned_job: None,
            path: VecDeque::new(),
            speed,
        }
    }

    /// Agent identifier.
    pub const fn id(&self) -> AgentId {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The spot the agent stands on (or is leaving).
    pub const fn current_spot(&self) -> TilePos {
        self.current_spot
    }

    /// The spot the agent is stepping onto.
    pub const fn next_spot(&self) -> Option<TilePos> {
        self.next_spot
    }

    /// Fraction of the current step covered, in `[0, 1)`.
    pub const fn move_progress(&self) -> f32 {
        self.move_progress
    }

    /// Movement speed in spots per second.
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// The job this agent holds.
    pub const fn assigned_job(&self) -> Option<JobId> {
        self.assigned_job
    }

    /// Whether the agent holds no job.
    pub const fn is_idle(&self) -> bool {
        self.assigned_job.is_none()
    }

    /// Remaining route, nearest spot first. Excludes `next_spot`.
    pub const fn path(&self) -> &VecDeque<TilePos> {
        &self.path
    }

    /// Whether the agent is standing still with nowhere queued to go.
    pub fn is_at_rest(&self) -> bool {
        self.next_spot.is_none() && self.path.is_empty()
    }

    /// Where a new route has to start: the spot being stepped onto, or the
    /// current spot when not moving.
    pub fn path_origin(&self) -> TilePos {
        self.next_spot.unwrap_or(self.current_spot)
    }

    /// Whether `pos` is the next spot or anywhere on the queued route.
    pub fn route_contains(&self, pos: TilePos) -> bool {
        self.next_spot == Some(pos) || self.path.contains(&pos)
    }

    /// Replace the route with a shortest path from [`Agent::path_origin`] to
    /// the nearest node satisfying `is_destination`. Returns the number of
    /// queued steps; 0 means the agent is already there or no destination
    /// is reachable, and the agent holds position either way.
    ///
    /// # Errors
    ///
    /// Returns [`PathError`] if the origin is not part of `graph` or an
    /// edge carries an invalid cost.
    pub fn path_to<G, F>(&mut self, graph: &G, is_destination: F) -> Result<usize, PathError>
    where
        G: Graph<Node = TilePos> + ?Sized,
        F: FnMut(TilePos) -> bool,
    {
        let origin = self.path_origin();
        let route = find_path(graph, origin, is_destination)?;
        self.path = route.into();
        debug!(
            agent = %self.id,
            from = %origin,
            steps = self.path.len(),
            "Path requested"
        );
        Ok(self.path.len())
    }

    /// Replace the queued route directly.
    pub fn set_path(&mut self, path: impl IntoIterator<Item = TilePos>) {
        self.path = path.into_iter().collect();
    }

    /// Drop the queued route. A step already under way is finished.
    pub fn halt(&mut self) {
        self.path.clear();
    }

    /// Abandon the current step and the route, snapping back onto
    /// `current_spot`.
    pub fn reanchor(&mut self) {
        self.path.clear();
        self.next_spot = None;
        self.move_progress = 0.0;
    }

    /// Put the agent on `spot` at rest, dropping any step and route.
    pub fn relocate(&mut self, spot: TilePos) {
        self.reanchor();
        self.current_spot = spot;
    }

    /// Reanchor if the next spot or any queued spot fails `exists`. Returns
    /// whether the route was dropped.
    pub fn drop_stale_route<F>(&mut self, mut exists: F) -> bool
    where
        F: FnMut(TilePos) -> bool,
    {
        let stale = self.next_spot.is_some_and(|next| !exists(next))
            || self.path.iter().any(|pos| !exists(*pos));
        if stale {
            self.reanchor();
        }
        stale
    }

    /// Record the job this agent now holds.
    pub const fn assign_job(&mut self, job: JobId) {
        self.assigned_job = Some(job);
    }

    /// Forget the held job. Returns it.
    pub const fn clear_job(&mut self) -> Option<JobId> {
        self.assigned_job.take()
    }

    /// Advance movement by `dt` seconds.
    ///
    /// Pops the next route step when not already stepping, then accumulates
    /// progress. On reaching a spot, excess progress carries over into the
    /// following step if the route continues; otherwise the agent comes to
    /// rest with zero progress. At most one spot is reached per call.
    pub fn advance_movement(&mut self, dt: f32) -> Option<Arrival> {
        if self.next_spot.is_none() {
            self.next_spot = self.path.pop_front();
        }
        let next = self.next_spot?;

        self.move_progress += dt * self.speed;
        if self.move_progress < 1.0 {
            return None;
        }

        let from = self.current_spot;
        self.current_spot = next;
        self.next_spot = self.path.pop_front();
        if self.next_spot.is_some() {
            self.move_progress -= 1.0;
        } else {
            self.move_progress = 0.0;
        }
        Some(Arrival { from, to: next })
    }

    /// Interpolated position between the current and next spot, for display.
    pub fn render_position(&self) -> (f32, f32) {
        let towards = self.next_spot.unwrap_or(self.current_spot);
        self.current_spot.lerp(towards, self.move_progress)
    }
}

impl Worker for Agent {
    fn worker_id(&self) -> AgentId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deckhand_types::BlockKind;
    use deckhand_world::ShipGrid;

    fn p(x: i32, y: i32) -> TilePos {
        TilePos::new(x, y)
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn new_agent_is_idle_and_at_rest() {
        let agent = Agent::new("Ada", p(1, 2), DEFAULT_MOVE_SPEED);
        assert!(agent.is_idle());
        assert!(agent.is_at_rest());
        assert_eq!(agent.current_spot(), p(1, 2));
        assert_eq!(agent.path_origin(), p(1, 2));
        assert_eq!(agent.name(), "Ada");
    }

    #[test]
    fn movement_carries_over_excess_progress() {
        let mut agent = Agent::new("Ada", p(0, 0), 1.0);
        agent.set_path([p(1, 0), p(2, 0), p(3, 0)]);

        assert!(agent.advance_movement(0.8).is_none());
        assert_eq!(agent.next_spot(), Some(p(1, 0)));
        assert!(close(agent.move_progress(), 0.8));

        let arrival = agent.advance_movement(0.5);
        assert_eq!(
            arrival,
            Some(Arrival {
                from: p(0, 0),
                to: p(1, 0)
            })
        );
        assert_eq!(agent.current_spot(), p(1, 0));
        assert_eq!(agent.next_spot(), Some(p(2, 0)));
        assert!(close(agent.move_progress(), 0.3));
        assert_eq!(agent.path().len(), 1);
    }

    #[test]
    fn final_step_zeroes_progress() {
        let mut agent = Agent::new("Ada", p(0, 0), 1.0);
        agent.set_path([p(1, 0)]);

        assert!(agent.advance_movement(0.7).is_none());
        assert!(agent.advance_movement(0.7).is_some());
        assert_eq!(agent.current_spot(), p(1, 0));
        assert_eq!(agent.next_spot(), None);
        assert!(close(agent.move_progress(), 0.0));
        assert!(agent.is_at_rest());
    }

    #[test]
    fn no_route_means_no_movement() {
        let mut agent = Agent::new("Ada", p(0, 0), DEFAULT_MOVE_SPEED);
        assert!(agent.advance_movement(10.0).is_none());
        assert!(close(agent.move_progress(), 0.0));
    }

    #[test]
    fn path_to_starts_from_next_spot_while_moving() {
        let grid = ShipGrid::rectangle(4, 1, &BlockKind::new("deck"), false);
        let mut agent = Agent::new("Ada", p(0, 0), 1.0);
        agent.set_path([p(1, 0)]);
        let _ = agent.advance_movement(0.5);
        assert_eq!(agent.path_origin(), p(1, 0));

        let steps = agent.path_to(&grid, |n| n == p(3, 0));
        assert!(matches!(steps, Ok(2)));
        assert_eq!(agent.path().iter().copied().collect::<Vec<_>>(), vec![p(2, 0), p(3, 0)]);
        assert_eq!(agent.next_spot(), Some(p(1, 0)));
    }

    #[test]
    fn path_to_current_spot_holds_position() {
        let grid = ShipGrid::rectangle(3, 3, &BlockKind::new("deck"), false);
        let mut agent = Agent::new("Ada", p(1, 1), 1.0);
        agent.set_path([p(2, 1)]);
        assert!(matches!(agent.path_to(&grid, |n| n == p(1, 1)), Ok(0)));
        assert!(agent.is_at_rest());
    }

    #[test]
    fn path_to_from_missing_spot_is_an_error() {
        let grid = ShipGrid::rectangle(2, 2, &BlockKind::new("deck"), false);
        let mut agent = Agent::new("Ada", p(9, 9), 1.0);
        assert!(matches!(
            agent.path_to(&grid, |n| n == p(0, 0)),
            Err(PathError::UnknownSource { .. })
        ));
    }

    #[test]
    fn reanchor_clears_step_and_route() {
        let mut agent = Agent::new("Ada", p(0, 0), 1.0);
        agent.set_path([p(1, 0), p(2, 0)]);
        let _ = agent.advance_movement(0.4);
        assert!(agent.route_contains(p(1, 0)));
        assert!(agent.route_contains(p(2, 0)));

        agent.reanchor();
        assert!(agent.is_at_rest());
        assert!(close(agent.move_progress(), 0.0));
        assert_eq!(agent.current_spot(), p(0, 0));
    }

    #[test]
    fn relocate_moves_agent_to_rest() {
        let mut agent = Agent::new("Ada", p(0, 0), 1.0);
        agent.set_path([p(1, 0), p(2, 0)]);
        let _ = agent.advance_movement(0.4);
        agent.relocate(p(0, 1));
        assert_eq!(agent.current_spot(), p(0, 1));
        assert!(agent.is_at_rest());
        assert!(close(agent.move_progress(), 0.0));
    }

    #[test]
    fn stale_route_is_dropped() {
        let mut agent = Agent::new("Ada", p(0, 0), 1.0);
        agent.set_path([p(1, 0), p(2, 0), p(3, 0)]);
        let _ = agent.advance_movement(0.4);
        assert!(!agent.drop_stale_route(|_| true));
        assert_eq!(agent.next_spot(), Some(p(1, 0)));

        assert!(agent.drop_stale_route(|pos| pos != p(3, 0)));
        assert!(agent.is_at_rest());
        assert_eq!(agent.current_spot(), p(0, 0));
    }

    #[test]
    fn render_position_interpolates() {
        let mut agent = Agent::new("Ada", p(0, 0), 1.0);
        agent.set_path([p(1, 0)]);
        let _ = agent.advance_movement(0.25);
        let (x, y) = agent.render_position();
        assert!(close(x, 0.25));
        assert!(close(y, 0.0));
    }

    #[test]
    fn job_bookkeeping() {
        let mut agent = Agent::new("Ada", p(0, 0), 1.0);
        let job = JobId::new();
        agent.assign_job(job);
        assert_eq!(agent.assigned_job(), Some(job));
        assert!(!agent.is_idle());
        assert_eq!(agent.clear_job(), Some(job));
        assert!(agent.is_idle());
        assert_eq!(agent.worker_id(), agent.id());
    }
}

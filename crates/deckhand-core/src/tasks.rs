//! Built-in requirements, actions, and toil builders.
//!
//! These form a small closed set covering the block placement jobs the
//! engine seeds: walk next to the job, optionally claim material, then work
//! for a while and place the block.

use deckhand_jobs::{Action, JobError, Requirement, Toil, ToilFrame, Verdict};
use deckhand_types::{BlockKind, ItemKind, TilePos};
use deckhand_world::{Graph, ShipGrid, find_path};
use tracing::{debug, info};

use crate::agent::Agent;
use crate::container::ShipToil;

fn standing_next_to(agent: &Agent, pos: TilePos) -> bool {
    agent.is_at_rest() && agent.current_spot().is_adjacent4(pos)
}

// ---------------------------------------------------------------------------
// Requirements
// ---------------------------------------------------------------------------

/// The worker stands still on a 4-neighbour of the toil position.
#[derive(Debug, Clone, Copy, Default)]
pub struct Adjacent;

impl Requirement<Agent, ShipGrid> for Adjacent {
    fn name(&self) -> &str {
        "adjacent"
    }

    fn check(&self, worker: &Agent, _site: &ShipGrid, frame: &ToilFrame) -> Verdict {
        Verdict::check(standing_next_to(worker, frame.position), || {
            format!("{} is not standing next to {}", worker.name(), frame.position)
        })
    }
}

/// Some spot next to the toil position exists and the worker can reach it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Accessible;

impl Requirement<Agent, ShipGrid> for Accessible {
    fn name(&self) -> &str {
        "accessible"
    }

    fn check(&self, worker: &Agent, site: &ShipGrid, frame: &ToilFrame) -> Verdict {
        let target = frame.position;
        if !target.neighbors4().into_iter().any(|n| site.contains(n)) {
            return Verdict::unmet(format!("no spot next to {target}"));
        }
        let origin = worker.path_origin();
        if origin.is_adjacent4(target) {
            return Verdict::Met;
        }
        match find_path(site, origin, |n| n.is_adjacent4(target)) {
            Ok(route) if !route.is_empty() => Verdict::Met,
            Ok(_) => Verdict::unmet(format!("{target} is unreachable from {origin}")),
            Err(e) => Verdict::unmet(e.to_string()),
        }
    }
}

/// The worker holds a claim on a stock pile of `item`.
#[derive(Debug, Clone)]
pub struct MaterialClaimed {
    item: ItemKind,
}

impl MaterialClaimed {
    /// Require a claim on `item`.
    pub const fn new(item: ItemKind) -> Self {
        Self { item }
    }
}

impl Requirement<Agent, ShipGrid> for MaterialClaimed {
    fn name(&self) -> &str {
        "material claimed"
    }

    fn check(&self, worker: &Agent, site: &ShipGrid, _frame: &ToilFrame) -> Verdict {
        Verdict::check(
            site.find_claimed_stock(&self.item, worker.id()).is_some(),
            || format!("{} holds no {}", worker.name(), self.item),
        )
    }
}

/// Unclaimed `item` exists, or the worker already holds some.
#[derive(Debug, Clone)]
pub struct MaterialAvailable {
    item: ItemKind,
}

impl MaterialAvailable {
    /// Require `item` to be obtainable.
    pub const fn new(item: ItemKind) -> Self {
        Self { item }
    }
}

impl Requirement<Agent, ShipGrid> for MaterialAvailable {
    fn name(&self) -> &str {
        "material available"
    }

    fn check(&self, worker: &Agent, site: &ShipGrid, _frame: &ToilFrame) -> Verdict {
        let available = site.find_unclaimed_stock(&self.item).is_some()
            || site.find_claimed_stock(&self.item, worker.id()).is_some();
        Verdict::check(available, || format!("no free {} on board", self.item))
    }
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// Walk to any spot next to the toil position.
///
/// Completes once the worker stands there. While the worker is already
/// heading for such a spot nothing is requested; otherwise a fresh path is.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathToAdjacent;

impl PathToAdjacent {
    const NAME: &'static str = "path to adjacent";
}

impl Action<Agent, ShipGrid> for PathToAdjacent {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn work(
        &mut self,
        worker: &mut Agent,
        site: &mut ShipGrid,
        frame: &ToilFrame,
        _dt: f32,
    ) -> Result<bool, JobError> {
        let target = frame.position;
        if standing_next_to(worker, target) {
            return Ok(true);
        }
        let heading = worker.path().back().copied().or_else(|| worker.next_spot());
        if heading.is_some_and(|h| h.is_adjacent4(target)) {
            return Ok(false);
        }
        let steps = worker
            .path_to(site, |n| n.is_adjacent4(target))
            .map_err(|e| JobError::action(Self::NAME, e))?;
        if steps == 0 {
            debug!(agent = %worker.id(), %target, "No route next to target");
        }
        Ok(false)
    }
}

/// Claim the first unclaimed pile of `item`. The claim is released on quit.
#[derive(Debug, Clone)]
pub struct ClaimMaterial {
    item: ItemKind,
    claimed: Option<TilePos>,
}

impl ClaimMaterial {
    const NAME: &'static str = "claim material";

    /// Claim `item`.
    pub const fn new(item: ItemKind) -> Self {
        Self {
            item,
            claimed: None,
        }
    }
}

impl Action<Agent, ShipGrid> for ClaimMaterial {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn work(
        &mut self,
        worker: &mut Agent,
        site: &mut ShipGrid,
        _frame: &ToilFrame,
        _dt: f32,
    ) -> Result<bool, JobError> {
        let agent = worker.id();
        if let Some(pos) = site.find_claimed_stock(&self.item, agent) {
            self.claimed = Some(pos);
            return Ok(true);
        }
        let Some(pos) = site.find_unclaimed_stock(&self.item) else {
            return Ok(false);
        };
        site.claim_stock(pos, agent)
            .map_err(|e| JobError::action(Self::NAME, e))?;
        self.claimed = Some(pos);
        debug!(%agent, item = %self.item, %pos, "Material claimed");
        Ok(true)
    }

    fn on_quit(&mut self, worker: &mut Agent, site: &mut ShipGrid, _frame: &ToilFrame) {
        let Some(pos) = self.claimed.take() else {
            return;
        };
        let held = site
            .spot(pos)
            .and_then(|s| s.stock.as_ref())
            .is_some_and(|s| s.is_claimed_by(worker.id()));
        if held && site.unclaim_stock(pos, worker.id()).is_ok() {
            debug!(agent = %worker.id(), item = %self.item, %pos, "Material released");
        }
    }
}

/// Work for `work_seconds`, then place `block` at the toil position,
/// consuming one claimed item of `consumes` if set.
#[derive(Debug, Clone)]
pub struct PlaceBlock {
    block: BlockKind,
    work_seconds: f32,
    progress: f32,
    consumes: Option<ItemKind>,
}

impl PlaceBlock {
    const NAME: &'static str = "place block";

    /// Place `block` after `work_seconds` of work.
    pub const fn new(block: BlockKind, work_seconds: f32) -> Self {
        Self {
            block,
            work_seconds,
            progress: 0.0,
            consumes: None,
        }
    }

    /// Place `block`, using up one `item` the worker has claimed.
    pub const fn consuming(block: BlockKind, item: ItemKind, work_seconds: f32) -> Self {
        Self {
            block,
            work_seconds,
            progress: 0.0,
            consumes: Some(item),
        }
    }

    /// Seconds of work accumulated so far.
    pub const fn progress(&self) -> f32 {
        self.progress
    }
}

impl Action<Agent, ShipGrid> for PlaceBlock {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn work(
        &mut self,
        worker: &mut Agent,
        site: &mut ShipGrid,
        frame: &ToilFrame,
        dt: f32,
    ) -> Result<bool, JobError> {
        self.progress += dt;
        if self.progress < self.work_seconds {
            return Ok(false);
        }

        let agent = worker.id();
        if let Some(item) = &self.consumes {
            let pos = site.find_claimed_stock(item, agent).ok_or_else(|| {
                JobError::action(Self::NAME, format!("{agent} holds no claimed {item}"))
            })?;
            site.take_stock(pos, agent)
                .map_err(|e| JobError::action(Self::NAME, e))?;
        }
        site.place_spot(frame.position, self.block.clone());
        info!(%agent, block = %self.block, pos = %frame.position, "Block placed");
        Ok(true)
    }

    fn on_quit(&mut self, _worker: &mut Agent, _site: &mut ShipGrid, _frame: &ToilFrame) {
        self.progress = 0.0;
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

fn reach_adjacent() -> ShipToil {
    Toil::new(PathToAdjacent).require(Accessible)
}

/// Root toil for placing `block` next to where the worker stands.
pub fn place_block(block: BlockKind, work_seconds: f32) -> ShipToil {
    Toil::new(PlaceBlock::new(block, work_seconds)).require_with(Adjacent, reach_adjacent())
}

/// Root toil for placing `block` from a claimed pile of `item`. The claim
/// is made before walking.
pub fn place_block_from_stock(block: BlockKind, item: ItemKind, work_seconds: f32) -> ShipToil {
    let claim = Toil::new(ClaimMaterial::new(item.clone()))
        .require(MaterialAvailable::new(item.clone()));
    Toil::new(PlaceBlock::consuming(block, item.clone(), work_seconds))
        .require_with(MaterialClaimed::new(item), claim)
        .require_with(Adjacent, reach_adjacent())
}

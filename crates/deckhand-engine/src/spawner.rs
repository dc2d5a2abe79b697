//! Seeds a vessel with its starting crew, jobs, and material.
//!
//! Everything is placed from a `StdRng` seeded with `world.seed`, so the same
//! configuration always produces the same starting layout.

use deckhand_core::tasks::{place_block, place_block_from_stock};
use deckhand_core::{DetachPolicy, SimulationConfig, WorkContainer};
use deckhand_types::{AgentId, BlockKind, ItemKind, JobId, TilePos};
use deckhand_world::{ShipGrid, Stock};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};

use crate::error::EngineError;

/// Names handed out once the configured list runs dry.
const NAME_POOL: &[&str] = &[
    "Anchor", "Bosun", "Cleat", "Davit", "Ensign", "Fathom", "Gunwale", "Halyard",
    "Jib", "Keel", "Lanyard", "Mizzen", "Oakum", "Pennant", "Quay", "Rigger",
    "Scupper", "Tiller", "Winch", "Yardarm",
];

/// What the spawner put on board.
#[derive(Debug)]
pub struct SeedResult {
    /// The populated container.
    pub container: WorkContainer,
    /// Crew in spawn order.
    pub crew: Vec<AgentId>,
    /// Jobs in creation order.
    pub jobs: Vec<JobId>,
    /// Spots holding a material pile.
    pub material_piles: Vec<TilePos>,
}

/// Build the starting grid and populate it per `config`.
///
/// # Errors
///
/// Returns [`EngineError`] if the crew does not fit on the grid or a
/// placement fails.
pub fn seed_vessel(config: &SimulationConfig) -> Result<SeedResult, EngineError> {
    let mut rng = StdRng::seed_from_u64(config.world.seed);

    let grid = ShipGrid::rectangle(
        config.grid.width,
        config.grid.height,
        &BlockKind::new(config.grid.floor_block.as_str()),
        config.grid.diagonal_moves,
    );
    let cells: Vec<TilePos> = grid.spots().map(|s| s.pos).collect();
    let mut container =
        WorkContainer::new(grid).with_policy(DetachPolicy::from_config(&config.jobs));

    let crew_count = usize::try_from(config.crew.count).unwrap_or(usize::MAX);
    if crew_count > cells.len() {
        return Err(EngineError::Spawner {
            message: format!(
                "{crew_count} crew do not fit on {} spots",
                cells.len()
            ),
        });
    }

    let mut crew = Vec::with_capacity(crew_count);
    for (index, pos) in pick_distinct(&mut rng, &cells, crew_count)
        .into_iter()
        .enumerate()
    {
        let name = crew_name(&config.crew.names, index);
        crew.push(container.spawn_agent(name, pos, config.crew.move_speed)?);
    }

    let material = config.jobs.material.as_deref().map(ItemKind::new);
    let mut material_piles = Vec::new();
    if let Some(item) = &material {
        let piles = usize::try_from(config.jobs.material_piles).unwrap_or(usize::MAX);
        for pos in pick_distinct(&mut rng, &cells, piles) {
            container.site_mut().put_stock(pos, Stock::new(item.clone(), 1))?;
            material_piles.push(pos);
        }
    }

    let block = BlockKind::new(config.jobs.block.as_str());
    let wanted = usize::try_from(config.jobs.initial_jobs).unwrap_or(usize::MAX);
    let positions = pick_distinct(&mut rng, &cells, wanted);
    if positions.len() < wanted {
        warn!(
            wanted,
            placed = positions.len(),
            "More jobs requested than spots; extra jobs dropped"
        );
    }
    let mut jobs = Vec::with_capacity(positions.len());
    for pos in positions {
        let root = match &material {
            Some(item) => {
                place_block_from_stock(block.clone(), item.clone(), config.jobs.work_seconds)
            }
            None => place_block(block.clone(), config.jobs.work_seconds),
        };
        jobs.push(container.create_job(format!("place {block} at {pos}"), pos, root)?);
    }

    info!(
        crew = crew.len(),
        jobs = jobs.len(),
        material_piles = material_piles.len(),
        spots = cells.len(),
        "Vessel seeded"
    );

    Ok(SeedResult {
        container,
        crew,
        jobs,
        material_piles,
    })
}

/// Name for the `index`th crew member: configured names first, then the
/// built-in pool, then numbered.
fn crew_name(configured: &[String], index: usize) -> String {
    if let Some(name) = configured.get(index) {
        return name.clone();
    }
    let pool_index = index.saturating_sub(configured.len());
    NAME_POOL.get(pool_index).map_or_else(
        || format!("Deckhand {}", index.saturating_add(1)),
        |name| (*name).to_owned(),
    )
}

/// Up to `count` distinct entries of `pool` in random order.
fn pick_distinct<R: Rng>(rng: &mut R, pool: &[TilePos], count: usize) -> Vec<TilePos> {
    let mut shuffled = pool.to_vec();
    let take = count.min(shuffled.len());
    // Fisher-Yates partial shuffle over the first `take` slots.
    for i in 0..take {
        let j = rng.random_range(i..shuffled.len());
        shuffled.swap(i, j);
    }
    shuffled.truncate(take);
    shuffled
}

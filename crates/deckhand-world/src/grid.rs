//! The tile graph owned by a work container.
//!
//! [`ShipGrid`] stores spots keyed by coordinate in a `BTreeMap`, so lookups
//! are logarithmic and enumeration is always in `(x, y)` order. Edges are
//! derived on demand from which neighbouring cells exist: orthogonal steps
//! cost 1, and when diagonal movement is enabled a diagonal step costs √2
//! provided both orthogonal cells it cuts past also exist.

use std::collections::BTreeMap;

use deckhand_types::{AgentId, BlockKind, ItemKind, TilePos};
use tracing::debug;

use crate::error::GridError;
use crate::graph::{Edge, Graph};
use crate::spot::{Spot, Stock};

/// Cost of an orthogonal step.
pub const ORTHOGONAL_COST: f32 = 1.0;

/// Cost of a diagonal step.
pub const DIAGONAL_COST: f32 = core::f32::consts::SQRT_2;

/// A set of spots forming a traversable tile graph.
#[derive(Debug, Clone, Default)]
pub struct ShipGrid {
    spots: BTreeMap<TilePos, Spot>,
    diagonal_moves: bool,
}

impl ShipGrid {
    /// Create an empty grid.
    pub const fn new(diagonal_moves: bool) -> Self {
        Self {
            spots: BTreeMap::new(),
            diagonal_moves,
        }
    }

    /// Create a `width` x `height` rectangle of `block` spots anchored at the
    /// origin.
    pub fn rectangle(width: u32, height: u32, block: &BlockKind, diagonal_moves: bool) -> Self {
        let mut grid = Self::new(diagonal_moves);
        let width = i32::try_from(width).unwrap_or(i32::MAX);
        let height = i32::try_from(height).unwrap_or(i32::MAX);
        for x in 0..width {
            for y in 0..height {
                grid.place_spot(TilePos::new(x, y), block.clone());
            }
        }
        grid
    }

    /// Whether diagonal steps are generated.
    pub const fn diagonal_moves(&self) -> bool {
        self.diagonal_moves
    }

    /// Place a spot, or re-block an existing one. Returns `true` if the spot
    /// is new. Occupants and stock of an existing spot are kept.
    pub fn place_spot(&mut self, pos: TilePos, block: BlockKind) -> bool {
        if let Some(spot) = self.spots.get_mut(&pos) {
            spot.block = block;
            return false;
        }
        self.spots.insert(pos, Spot::new(pos, block));
        true
    }

    /// Remove a spot and return it.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::SpotNotFound`] if there is no spot at `pos`, or
    /// [`GridError::SpotOccupied`] if an agent is standing on it.
    pub fn remove_spot(&mut self, pos: TilePos) -> Result<Spot, GridError> {
        let spot = self.spots.get(&pos).ok_or(GridError::SpotNotFound(pos))?;
        if let Some(agent) = spot.occupant() {
            return Err(GridError::SpotOccupied { pos, agent });
        }
        let removed = self.spots.remove(&pos).ok_or(GridError::SpotNotFound(pos))?;
        debug!(%pos, "Spot removed");
        Ok(removed)
    }

    /// Remove a spot together with whoever stands on it. The returned spot
    /// still lists its occupants; the caller must move them elsewhere.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::SpotNotFound`] if there is no spot at `pos`.
    pub fn evict_spot(&mut self, pos: TilePos) -> Result<Spot, GridError> {
        let removed = self.spots.remove(&pos).ok_or(GridError::SpotNotFound(pos))?;
        debug!(%pos, occupants = removed.occupants().len(), "Spot evicted");
        Ok(removed)
    }

    /// The existing spot closest to `pos`, excluding `pos` itself. Ties go to
    /// the spot enumerated first, so orthogonal neighbours win over diagonal
    /// ones.
    pub fn nearest_spot(&self, pos: TilePos) -> Option<TilePos> {
        let mut best: Option<(TilePos, f32)> = None;
        for candidate in self.spots.keys().copied().filter(|c| *c != pos) {
            let d = pos.distance(candidate);
            if best.is_none_or(|(_, best_d)| d < best_d) {
                best = Some((candidate, d));
            }
        }
        best.map(|(candidate, _)| candidate)
    }

    /// Look up the spot at `pos`.
    pub fn spot(&self, pos: TilePos) -> Option<&Spot> {
        self.spots.get(&pos)
    }

    /// Look up the spot at `pos` mutably.
    pub fn spot_mut(&mut self, pos: TilePos) -> Option<&mut Spot> {
        self.spots.get_mut(&pos)
    }

    /// Whether a spot exists at `pos`.
    pub fn has_spot(&self, pos: TilePos) -> bool {
        self.spots.contains_key(&pos)
    }

    /// Number of spots.
    pub fn spot_count(&self) -> usize {
        self.spots.len()
    }

    /// Iterate spots in enumeration order.
    pub fn spots(&self) -> impl Iterator<Item = &Spot> {
        self.spots.values()
    }

    // -------------------------------------------------------------------
    // Occupancy
    // -------------------------------------------------------------------

    /// Record `agent` standing at `pos`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::SpotNotFound`] if there is no spot at `pos`.
    pub fn set_occupant(&mut self, pos: TilePos, agent: AgentId) -> Result<(), GridError> {
        let spot = self.spots.get_mut(&pos).ok_or(GridError::SpotNotFound(pos))?;
        spot.add_occupant(agent);
        Ok(())
    }

    /// Forget `agent` standing at `pos`. Missing spots are ignored, since the
    /// agent has left either way.
    pub fn clear_occupant(&mut self, pos: TilePos, agent: AgentId) {
        if let Some(spot) = self.spots.get_mut(&pos) {
            spot.remove_occupant(agent);
        }
    }

    /// Move `agent` from one spot to another.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::SpotNotFound`] if the destination does not exist.
    pub fn move_occupant(
        &mut self,
        agent: AgentId,
        from: TilePos,
        to: TilePos,
    ) -> Result<(), GridError> {
        if !self.spots.contains_key(&to) {
            return Err(GridError::SpotNotFound(to));
        }
        self.clear_occupant(from, agent);
        self.set_occupant(to, agent)
    }

    // -------------------------------------------------------------------
    // Stock
    // -------------------------------------------------------------------

    /// Put a stock pile on the spot at `pos`, replacing any pile there.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::SpotNotFound`] if there is no spot at `pos`.
    pub fn put_stock(&mut self, pos: TilePos, stock: Stock) -> Result<Option<Stock>, GridError> {
        let spot = self.spots.get_mut(&pos).ok_or(GridError::SpotNotFound(pos))?;
        Ok(spot.stock.replace(stock))
    }

    /// First spot, in enumeration order, holding unclaimed stock of `item`.
    pub fn find_unclaimed_stock(&self, item: &ItemKind) -> Option<TilePos> {
        self.spots
            .values()
            .find(|spot| {
                spot.stock
                    .as_ref()
                    .is_some_and(|s| &s.item == item && s.is_unclaimed() && s.quantity > 0)
            })
            .map(|spot| spot.pos)
    }

    /// First spot holding stock of `item` claimed by `agent`.
    pub fn find_claimed_stock(&self, item: &ItemKind, agent: AgentId) -> Option<TilePos> {
        self.spots
            .values()
            .find(|spot| {
                spot.stock
                    .as_ref()
                    .is_some_and(|s| &s.item == item && s.is_claimed_by(agent))
            })
            .map(|spot| spot.pos)
    }

    /// Claim the pile at `pos` for `agent`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::SpotNotFound`], [`GridError::NoStock`], or
    /// [`GridError::Claim`] if another agent holds the pile.
    pub fn claim_stock(&mut self, pos: TilePos, agent: AgentId) -> Result<(), GridError> {
        self.stock_mut(pos)?
            .claim(agent)
            .map_err(|source| GridError::Claim { pos, source })
    }

    /// Release `agent`'s claim on the pile at `pos`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::SpotNotFound`], [`GridError::NoStock`], or
    /// [`GridError::Claim`] if `agent` does not hold the claim.
    pub fn unclaim_stock(&mut self, pos: TilePos, agent: AgentId) -> Result<(), GridError> {
        self.stock_mut(pos)?
            .unclaim(agent)
            .map_err(|source| GridError::Claim { pos, source })
    }

    /// Take one item from the pile at `pos`, which `agent` must have claimed.
    /// The claim is released; the pile is removed once empty.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::SpotNotFound`], [`GridError::NoStock`], or
    /// [`GridError::Claim`] if `agent` does not hold the claim.
    pub fn take_stock(&mut self, pos: TilePos, agent: AgentId) -> Result<ItemKind, GridError> {
        let spot = self.spots.get_mut(&pos).ok_or(GridError::SpotNotFound(pos))?;
        let stock = spot.stock.as_mut().ok_or(GridError::NoStock(pos))?;
        stock
            .unclaim(agent)
            .map_err(|source| GridError::Claim { pos, source })?;
        stock.quantity = stock.quantity.saturating_sub(1);
        let item = stock.item.clone();
        if stock.quantity == 0 {
            spot.stock = None;
        }
        Ok(item)
    }

    fn stock_mut(&mut self, pos: TilePos) -> Result<&mut Stock, GridError> {
        self.spots
            .get_mut(&pos)
            .ok_or(GridError::SpotNotFound(pos))?
            .stock
            .as_mut()
            .ok_or(GridError::NoStock(pos))
    }
}

impl Graph for ShipGrid {
    type Node = TilePos;

    fn nodes(&self) -> Vec<TilePos> {
        self.spots.keys().copied().collect()
    }

    fn edges(&self, node: TilePos) -> Vec<Edge<TilePos>> {
        if !self.spots.contains_key(&node) {
            return Vec::new();
        }
        let mut edges: Vec<Edge<TilePos>> = node
            .neighbors4()
            .into_iter()
            .filter(|n| self.spots.contains_key(n))
            .map(|n| Edge::new(ORTHOGONAL_COST, n))
            .collect();

        if self.diagonal_moves {
            for diagonal in node.diagonals() {
                let corner_a = TilePos::new(diagonal.x, node.y);
                let corner_b = TilePos::new(node.x, diagonal.y);
                if self.spots.contains_key(&diagonal)
                    && self.spots.contains_key(&corner_a)
                    && self.spots.contains_key(&corner_b)
                {
                    edges.push(Edge::new(DIAGONAL_COST, diagonal));
                }
            }
        }
        edges
    }

    fn contains(&self, node: TilePos) -> bool {
        self.spots.contains_key(&node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClaimError;
    use crate::pathfinding::{find_path, find_path_to};

    fn deck() -> BlockKind {
        BlockKind::new("deck")
    }

    #[test]
    fn rectangle_has_expected_spots() {
        let grid = ShipGrid::rectangle(6, 6, &deck(), false);
        assert_eq!(grid.spot_count(), 36);
        assert!(grid.has_spot(TilePos::new(5, 5)));
        assert!(!grid.has_spot(TilePos::new(6, 0)));
    }

    #[test]
    fn corner_has_two_orthogonal_edges() {
        let grid = ShipGrid::rectangle(3, 3, &deck(), false);
        assert_eq!(grid.edges(TilePos::new(0, 0)).len(), 2);
        assert_eq!(grid.edges(TilePos::new(1, 1)).len(), 4);
    }

    #[test]
    fn diagonals_need_both_corners() {
        let mut grid = ShipGrid::rectangle(2, 2, &deck(), true);
        assert_eq!(grid.edges(TilePos::new(0, 0)).len(), 3);
        assert!(grid.remove_spot(TilePos::new(1, 0)).is_ok());
        let edges = grid.edges(TilePos::new(0, 0));
        assert_eq!(edges.len(), 1);
        assert!(edges.iter().all(|e| e.target != TilePos::new(1, 1)));
    }

    #[test]
    fn grid_path_is_manhattan_length() {
        let grid = ShipGrid::rectangle(6, 6, &deck(), false);
        let path = find_path_to(&grid, TilePos::new(0, 0), TilePos::new(3, 2)).unwrap_or_default();
        assert_eq!(path.len(), 5);
        assert_eq!(path.last().copied(), Some(TilePos::new(3, 2)));
    }

    #[test]
    fn grid_path_is_deterministic() {
        let grid = ShipGrid::rectangle(4, 4, &deck(), false);
        let first = find_path_to(&grid, TilePos::new(0, 0), TilePos::new(2, 2)).unwrap_or_default();
        for _ in 0..5 {
            let again =
                find_path_to(&grid, TilePos::new(0, 0), TilePos::new(2, 2)).unwrap_or_default();
            assert_eq!(first, again);
        }
    }

    #[test]
    fn path_to_any_neighbour() {
        let grid = ShipGrid::rectangle(6, 6, &deck(), false);
        let target = TilePos::new(5, 5);
        let path = find_path(&grid, TilePos::new(0, 0), |p| p.is_adjacent4(target)).unwrap_or_default();
        assert_eq!(path.len(), 9);
        assert!(path.last().is_some_and(|p| p.is_adjacent4(target)));
    }

    #[test]
    fn occupied_spot_cannot_be_removed() {
        let mut grid = ShipGrid::rectangle(2, 1, &deck(), false);
        let agent = AgentId::new();
        assert!(grid.set_occupant(TilePos::new(0, 0), agent).is_ok());
        assert!(matches!(
            grid.remove_spot(TilePos::new(0, 0)),
            Err(GridError::SpotOccupied { .. })
        ));
        assert!(grid.move_occupant(agent, TilePos::new(0, 0), TilePos::new(1, 0)).is_ok());
        assert!(grid.remove_spot(TilePos::new(0, 0)).is_ok());
    }

    #[test]
    fn evict_spot_keeps_occupant_list() {
        let mut grid = ShipGrid::rectangle(3, 3, &deck(), false);
        let agent = AgentId::new();
        assert!(grid.set_occupant(TilePos::new(1, 1), agent).is_ok());
        let spot = grid.evict_spot(TilePos::new(1, 1));
        assert!(spot.is_ok_and(|s| s.occupants().contains(&agent)));
        assert!(!grid.has_spot(TilePos::new(1, 1)));
        assert!(matches!(
            grid.evict_spot(TilePos::new(1, 1)),
            Err(GridError::SpotNotFound(_))
        ));
    }

    #[test]
    fn nearest_spot_prefers_orthogonal_in_order() {
        let mut grid = ShipGrid::rectangle(3, 3, &deck(), false);
        assert!(grid.evict_spot(TilePos::new(1, 1)).is_ok());
        assert_eq!(grid.nearest_spot(TilePos::new(1, 1)), Some(TilePos::new(0, 1)));

        assert!(grid.evict_spot(TilePos::new(0, 1)).is_ok());
        assert!(grid.evict_spot(TilePos::new(1, 0)).is_ok());
        assert_eq!(grid.nearest_spot(TilePos::new(1, 1)), Some(TilePos::new(1, 2)));

        let single = ShipGrid::rectangle(1, 1, &deck(), false);
        assert_eq!(single.nearest_spot(TilePos::new(0, 0)), None);
    }

    #[test]
    fn place_spot_reblocks_existing() {
        let mut grid = ShipGrid::rectangle(1, 1, &deck(), false);
        assert!(!grid.place_spot(TilePos::new(0, 0), BlockKind::new("hull")));
        assert_eq!(
            grid.spot(TilePos::new(0, 0)).map(|s| s.block.as_str()),
            Some("hull")
        );
        assert!(grid.place_spot(TilePos::new(1, 0), BlockKind::new("hull")));
    }

    #[test]
    fn stock_claim_roundtrip() {
        let mut grid = ShipGrid::rectangle(3, 1, &deck(), false);
        let plank = ItemKind::new("plank");
        let pos = TilePos::new(2, 0);
        let a = AgentId::new();
        let b = AgentId::new();
        assert!(grid.put_stock(pos, Stock::new(plank.clone(), 1)).is_ok());

        assert_eq!(grid.find_unclaimed_stock(&plank), Some(pos));
        assert!(grid.claim_stock(pos, a).is_ok());
        assert_eq!(grid.find_unclaimed_stock(&plank), None);
        assert_eq!(grid.find_claimed_stock(&plank, a), Some(pos));

        let stolen = grid.claim_stock(pos, b);
        assert!(matches!(
            stolen,
            Err(GridError::Claim {
                source: ClaimError::AlreadyClaimed { .. },
                ..
            })
        ));

        assert!(grid.take_stock(pos, b).is_err());
        assert_eq!(grid.take_stock(pos, a).ok(), Some(plank));
        assert!(grid.spot(pos).is_some_and(|s| s.stock.is_none()));
    }

    #[test]
    fn stock_ops_on_missing_pile_fail() {
        let mut grid = ShipGrid::rectangle(1, 1, &deck(), false);
        let a = AgentId::new();
        assert!(matches!(
            grid.claim_stock(TilePos::new(0, 0), a),
            Err(GridError::NoStock(_))
        ));
        assert!(matches!(
            grid.unclaim_stock(TilePos::new(9, 9), a),
            Err(GridError::SpotNotFound(_))
        ));
    }
}

//! Spots and the stock claim contract.
//!
//! A [`Spot`] is one traversable cell of a container's tile grid. It records
//! which block template forms it, which agents stand on it, and at most one
//! [`Stock`] pile sitting on it.
//!
//! Stock uses a single-claimant contract: a job claims a pile before using
//! it so that two agents never plan around the same item. Claims are
//! released explicitly, either when the job consumes the pile or when the
//! worker quits.

use std::collections::BTreeSet;

use deckhand_types::{AgentId, BlockKind, ItemKind, TilePos};
use serde::{Deserialize, Serialize};

use crate::error::ClaimError;

/// A pile of one item kind, optionally reserved by one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    /// Item template of the pile.
    pub item: ItemKind,
    /// Number of items in the pile.
    pub quantity: u32,
    /// Agent currently holding the claim, if any.
    claimed_by: Option<AgentId>,
}

impl Stock {
    /// Create an unclaimed pile.
    pub const fn new(item: ItemKind, quantity: u32) -> Self {
        Self {
            item,
            quantity,
            claimed_by: None,
        }
    }

    /// The current claimant.
    pub const fn claimant(&self) -> Option<AgentId> {
        self.claimed_by
    }

    /// Whether nobody holds a claim.
    pub const fn is_unclaimed(&self) -> bool {
        self.claimed_by.is_none()
    }

    /// Whether `agent` holds the claim.
    pub fn is_claimed_by(&self, agent: AgentId) -> bool {
        self.claimed_by == Some(agent)
    }

    /// Reserve the pile for `agent`. Re-claiming by the holder is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`ClaimError::AlreadyClaimed`] if another agent holds it.
    pub fn claim(&mut self, agent: AgentId) -> Result<(), ClaimError> {
        match self.claimed_by {
            Some(holder) if holder != agent => Err(ClaimError::AlreadyClaimed { holder }),
            _ => {
                self.claimed_by = Some(agent);
                Ok(())
            }
        }
    }

    /// Release the claim held by `agent`.
    ///
    /// # Errors
    ///
    /// Returns [`ClaimError::NotClaimedBy`] if `agent` is not the holder.
    pub fn unclaim(&mut self, agent: AgentId) -> Result<(), ClaimError> {
        if !self.is_claimed_by(agent) {
            return Err(ClaimError::NotClaimedBy { agent });
        }
        self.claimed_by = None;
        Ok(())
    }
}

/// One cell of a tile grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spot {
    /// Grid coordinate.
    pub pos: TilePos,
    /// Block template forming this cell.
    pub block: BlockKind,
    /// Agents standing here.
    occupants: BTreeSet<AgentId>,
    /// Stock pile resting here.
    pub stock: Option<Stock>,
}

impl Spot {
    /// Create an empty spot.
    pub const fn new(pos: TilePos, block: BlockKind) -> Self {
        Self {
            pos,
            block,
            occupants: BTreeSet::new(),
            stock: None,
        }
    }

    /// The first agent standing here, if any.
    pub fn occupant(&self) -> Option<AgentId> {
        self.occupants.first().copied()
    }

    /// All agents standing here.
    pub const fn occupants(&self) -> &BTreeSet<AgentId> {
        &self.occupants
    }

    /// Whether any agent stands here.
    pub fn is_occupied(&self) -> bool {
        !self.occupants.is_empty()
    }

    /// Record `agent` as standing here.
    pub fn add_occupant(&mut self, agent: AgentId) {
        self.occupants.insert(agent);
    }

    /// Forget `agent`. Returns whether it was here.
    pub fn remove_occupant(&mut self, agent: AgentId) -> bool {
        self.occupants.remove(&agent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plank() -> Stock {
        Stock::new(ItemKind::new("plank"), 4)
    }

    #[test]
    fn claim_is_exclusive() {
        let mut stock = plank();
        let a = AgentId::new();
        let b = AgentId::new();
        assert!(stock.claim(a).is_ok());
        assert_eq!(stock.claim(b), Err(ClaimError::AlreadyClaimed { holder: a }));
        assert!(stock.is_claimed_by(a));
    }

    #[test]
    fn reclaim_by_holder_is_noop() {
        let mut stock = plank();
        let a = AgentId::new();
        assert!(stock.claim(a).is_ok());
        assert!(stock.claim(a).is_ok());
        assert_eq!(stock.claimant(), Some(a));
    }

    #[test]
    fn only_holder_can_unclaim() {
        let mut stock = plank();
        let a = AgentId::new();
        let b = AgentId::new();
        assert!(stock.unclaim(a).is_err());
        assert!(stock.claim(a).is_ok());
        assert_eq!(stock.unclaim(b), Err(ClaimError::NotClaimedBy { agent: b }));
        assert!(stock.unclaim(a).is_ok());
        assert!(stock.is_unclaimed());
    }

    #[test]
    fn occupancy_tracks_agents() {
        let mut spot = Spot::new(TilePos::new(0, 0), BlockKind::new("deck"));
        let a = AgentId::new();
        assert!(!spot.is_occupied());
        spot.add_occupant(a);
        assert_eq!(spot.occupant(), Some(a));
        assert!(spot.remove_occupant(a));
        assert!(!spot.remove_occupant(a));
    }

    #[test]
    fn spot_with_claimed_stock_survives_json() {
        let mut spot = Spot::new(TilePos::new(2, 3), BlockKind::new("deck"));
        let mut stock = plank();
        let a = AgentId::new();
        assert!(stock.claim(a).is_ok());
        spot.stock = Some(stock);
        spot.add_occupant(a);

        let json = serde_json::to_string(&spot).unwrap_or_default();
        let restored: Result<Spot, _> = serde_json::from_str(&json);
        assert!(restored.is_ok());
        if let Ok(restored) = restored {
            assert_eq!(restored, spot);
            assert!(restored.stock.is_some_and(|s| s.is_claimed_by(a)));
        }
    }
}

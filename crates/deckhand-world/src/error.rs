//! Error types for the `deckhand-world` crate.
//!
//! Only invariant violations live here. Expected absence (no path, no free
//! stock) is reported as an empty result or `None`, never as an error.

use deckhand_types::{AgentId, TilePos};

/// Errors raised by path search.
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    /// The search was started from a node the graph does not enumerate.
    #[error("source node {node} is not part of the graph")]
    UnknownSource {
        /// Debug rendering of the offending node.
        node: String,
    },

    /// The search was aimed at a target the graph does not enumerate.
    #[error("target node {node} is not part of the graph")]
    UnknownTarget {
        /// Debug rendering of the offending node.
        node: String,
    },

    /// An edge carried a negative or NaN cost.
    #[error("edge {from} -> {to} has invalid cost {cost}")]
    InvalidCost {
        /// Debug rendering of the edge origin.
        from: String,
        /// Debug rendering of the edge target.
        to: String,
        /// The rejected cost.
        cost: f32,
    },
}

/// Violations of the single-claimant stock contract.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClaimError {
    /// Another agent already holds the claim.
    #[error("stock already claimed by {holder}")]
    AlreadyClaimed {
        /// Current claimant.
        holder: AgentId,
    },

    /// The agent releasing or consuming the stock does not hold the claim.
    #[error("stock is not claimed by {agent}")]
    NotClaimedBy {
        /// The agent that attempted the operation.
        agent: AgentId,
    },
}

/// Errors that can occur during grid operations.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// No spot exists at the given coordinate.
    #[error("no spot at {0}")]
    SpotNotFound(TilePos),

    /// The spot cannot be removed while an agent stands on it.
    #[error("spot {pos} is occupied by agent {agent}")]
    SpotOccupied {
        /// The occupied spot.
        pos: TilePos,
        /// The agent standing there.
        agent: AgentId,
    },

    /// The spot carries no stock.
    #[error("no stock at {0}")]
    NoStock(TilePos),

    /// A stock claim operation violated the claim contract.
    #[error("stock claim at {pos} failed: {source}")]
    Claim {
        /// The spot holding the stock.
        pos: TilePos,
        /// The underlying claim violation.
        source: ClaimError,
    },
}

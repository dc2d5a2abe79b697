//! Shared type definitions for the Deckhand job engine.
//!
//! Everything here is plain data: identifiers, tile coordinates, and the
//! opaque template names that static definitions hand to the engine.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for agents and jobs
//! - [`tile`] -- Integer tile coordinates and neighbourhood helpers
//! - [`kinds`] -- Opaque block and item template identifiers

pub mod ids;
pub mod kinds;
pub mod tile;

pub use ids::{AgentId, JobId};
pub use kinds::{BlockKind, ItemKind};
pub use tile::TilePos;

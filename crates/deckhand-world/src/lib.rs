//! Tile graph, spots, and path search for the Deckhand job engine.
//!
//! This crate models the physical side of a work container: a set of spots
//! (tiles) forming a directed weighted graph, the stock items that sit on
//! them, and the shortest-path search agents use to walk between them.
//!
//! # Modules
//!
//! - [`error`] -- Error types for grid, stock, and path operations.
//! - [`graph`] -- The [`Graph`] contract consumed by search, plus a small
//!   insertion-ordered [`EdgeListGraph`].
//! - [`grid`] -- [`ShipGrid`], the tile graph owned by a container.
//! - [`pathfinding`] -- Dijkstra search with a first-in-enumeration tie-break.
//! - [`spot`] -- [`Spot`] cells and the [`Stock`] claim contract.
//!
//! [`Graph`]: graph::Graph
//! [`EdgeListGraph`]: graph::EdgeListGraph
//! [`ShipGrid`]: grid::ShipGrid
//! [`Spot`]: spot::Spot
//! [`Stock`]: spot::Stock

pub mod error;
pub mod graph;
pub mod grid;
pub mod pathfinding;
pub mod spot;

pub use error::{ClaimError, GridError, PathError};
pub use graph::{Edge, EdgeListGraph, Graph};
pub use grid::ShipGrid;
pub use pathfinding::{find_path, find_path_to};
pub use spot::{Spot, Stock};

//! The graph contract consumed by path search.
//!
//! A graph enumerates its nodes and, for each node, its outgoing weighted
//! edges. Edges are directed. Nothing is cached: every call is a live
//! snapshot of the graph as it stands, so callers must not hold on to the
//! results across mutations.
//!
//! The order in which [`Graph::nodes`] yields nodes is significant. Search
//! breaks distance ties in favour of the node enumerated first, so the same
//! graph always produces the same path.

use std::collections::BTreeMap;

/// A directed, weighted edge to `target`.
///
/// `cost` is a linear traversal cost and must be non-negative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge<N> {
    /// Cost of traversing this edge.
    pub cost: f32,
    /// The node this edge leads to.
    pub target: N,
}

impl<N> Edge<N> {
    /// Create an edge.
    pub const fn new(cost: f32, target: N) -> Self {
        Self { cost, target }
    }
}

/// Any structure that can be searched for paths.
pub trait Graph {
    /// Node handle. Cheap to copy and totally ordered so search can index it.
    type Node: Copy + Ord + core::fmt::Debug;

    /// All nodes, in the graph's enumeration order.
    fn nodes(&self) -> Vec<Self::Node>;

    /// Outgoing edges of `node`. Unknown nodes have no edges.
    fn edges(&self, node: Self::Node) -> Vec<Edge<Self::Node>>;

    /// Whether `node` is currently part of the graph.
    fn contains(&self, node: Self::Node) -> bool {
        self.nodes().contains(&node)
    }
}

/// A plain edge-list graph whose enumeration order is insertion order.
///
/// Useful for non-grid topologies and for pinning down tie-break behaviour.
#[derive(Debug, Clone)]
pub struct EdgeListGraph<N> {
    order: Vec<N>,
    outbound: BTreeMap<N, Vec<Edge<N>>>,
}

impl<N: Copy + Ord + core::fmt::Debug> EdgeListGraph<N> {
    /// Create an empty graph.
    pub const fn new() -> Self {
        Self {
            order: Vec::new(),
            outbound: BTreeMap::new(),
        }
    }

    /// Add a node. Re-adding an existing node keeps its original position.
    pub fn add_node(&mut self, node: N) {
        if !self.outbound.contains_key(&node) {
            self.order.push(node);
            self.outbound.insert(node, Vec::new());
        }
    }

    /// Add a directed edge, adding either endpoint if missing.
    pub fn add_edge(&mut self, from: N, to: N, cost: f32) {
        self.add_node(from);
        self.add_node(to);
        self.outbound
            .entry(from)
            .or_default()
            .push(Edge::new(cost, to));
    }

    /// Add edges in both directions with the same cost.
    pub fn add_undirected(&mut self, a: N, b: N, cost: f32) {
        self.add_edge(a, b, cost);
        self.add_edge(b, a, cost);
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.order.len()
    }
}

impl<N: Copy + Ord + core::fmt::Debug> Default for EdgeListGraph<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Copy + Ord + core::fmt::Debug> Graph for EdgeListGraph<N> {
    type Node = N;

    fn nodes(&self) -> Vec<N> {
        self.order.clone()
    }

    fn edges(&self, node: N) -> Vec<Edge<N>> {
        self.outbound.get(&node).cloned().unwrap_or_default()
    }

    fn contains(&self, node: N) -> bool {
        self.outbound.contains_key(&node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insertion_order_is_enumeration_order() {
        let mut g = EdgeListGraph::new();
        g.add_node('c');
        g.add_node('a');
        g.add_node('b');
        g.add_node('a');
        assert_eq!(g.nodes(), vec!['c', 'a', 'b']);
        assert_eq!(g.node_count(), 3);
    }

    #[test]
    fn edges_are_directed() {
        let mut g = EdgeListGraph::new();
        g.add_edge(1_u8, 2, 1.0);
        assert_eq!(g.edges(1).len(), 1);
        assert!(g.edges(2).is_empty());
        assert!(g.contains(2));
        assert!(!g.contains(3));
    }

    #[test]
    fn undirected_adds_both_directions() {
        let mut g = EdgeListGraph::new();
        g.add_undirected('a', 'b', 2.5);
        assert_eq!(g.edges('a').first().map(|e| e.target), Some('b'));
        assert_eq!(g.edges('b').first().map(|e| e.target), Some('a'));
    }
}

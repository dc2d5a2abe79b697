//! Single-source shortest-path search (Dijkstra).
//!
//! The minimum-distance node is found by a linear scan over the unvisited
//! set rather than a heap. That is O(V²) overall and keeps the tie-break
//! exact: among unvisited nodes at equal distance, the one enumerated first by
//! [`Graph::nodes`] is expanded first. Paths are therefore reproducible
//! for a given enumeration order.
//!
//! Results are ordered nearest-first and exclude the source. An empty
//! result means either the source already satisfies the destination
//! predicate or no destination is reachable; callers treat both as
//! "hold position". A source or explicit target outside the graph is an
//! error, never an empty result.

use std::collections::BTreeMap;

use tracing::trace;

use crate::error::PathError;
use crate::graph::Graph;

/// Find a minimum-cost path from `source` to the first node satisfying
/// `is_destination`.
///
/// # Errors
///
/// Returns [`PathError::UnknownSource`] if `source` is not enumerated by the
/// graph, or [`PathError::InvalidCost`] if an expanded edge has a negative
/// or NaN cost.
pub fn find_path<G, F>(
    graph: &G,
    source: G::Node,
    mut is_destination: F,
) -> Result<Vec<G::Node>, PathError>
where
    G: Graph + ?Sized,
    F: FnMut(G::Node) -> bool,
{
    let nodes = graph.nodes();
    let index: BTreeMap<G::Node, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, node)| (*node, i))
        .collect();

    let Some(&start) = index.get(&source) else {
        return Err(PathError::UnknownSource {
            node: format!("{source:?}"),
        });
    };

    let mut dist = vec![f32::INFINITY; nodes.len()];
    let mut prev: Vec<Option<usize>> = vec![None; nodes.len()];
    let mut visited = vec![false; nodes.len()];
    if let Some(d) = dist.get_mut(start) {
        *d = 0.0;
    }

    let mut expanded: usize = 0;
    while let Some((current, current_dist)) = closest_unvisited(&dist, &visited) {
        if let Some(seen) = visited.get_mut(current) {
            *seen = true;
        }
        expanded = expanded.saturating_add(1);

        let Some(&node) = nodes.get(current) else {
            continue;
        };

        if is_destination(node) {
            let path = reconstruct(&nodes, &prev, start, current);
            trace!(?source, ?node, expanded, len = path.len(), "Path found");
            return Ok(path);
        }

        for edge in graph.edges(node) {
            if edge.cost.is_nan() || edge.cost < 0.0 {
                return Err(PathError::InvalidCost {
                    from: format!("{node:?}"),
                    to: format!("{:?}", edge.target),
                    cost: edge.cost,
                });
            }
            let Some(&next) = index.get(&edge.target) else {
                continue;
            };
            if visited.get(next).copied().unwrap_or(true) {
                continue;
            }
            let candidate = current_dist + edge.cost;
            if let Some(best) = dist.get_mut(next)
                && candidate < *best
            {
                *best = candidate;
                if let Some(link) = prev.get_mut(next) {
                    *link = Some(current);
                }
            }
        }
    }

    trace!(?source, expanded, "No reachable destination");
    Ok(Vec::new())
}

/// Find a minimum-cost path from `source` to `target`.
///
/// # Errors
///
/// Returns [`PathError::UnknownTarget`] if `target` is not part of the
/// graph, otherwise see [`find_path`].
pub fn find_path_to<G>(graph: &G, source: G::Node, target: G::Node) -> Result<Vec<G::Node>, PathError>
where
    G: Graph + ?Sized,
{
    if !graph.contains(target) {
        return Err(PathError::UnknownTarget {
            node: format!("{target:?}"),
        });
    }
    find_path(graph, source, |node| node == target)
}

/// Index and distance of the first unvisited node with the smallest finite
/// distance. Strict `<` keeps the earliest node on ties.
fn closest_unvisited(dist: &[f32], visited: &[bool]) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (i, (&d, &seen)) in dist.iter().zip(visited).enumerate() {
        if seen || !d.is_finite() {
            continue;
        }
        if best.is_none_or(|(_, best_dist)| d < best_dist) {
            best = Some((i, d));
        }
    }
    best
}

/// Walk predecessors from `end` back to `start`, then reverse.
fn reconstruct<N: Copy>(nodes: &[N], prev: &[Option<usize>], start: usize, end: usize) -> Vec<N> {
    let mut path = Vec::new();
    let mut cursor = end;
    while cursor != start {
        if let Some(&node) = nodes.get(cursor) {
            path.push(node);
        }
        match prev.get(cursor).copied().flatten() {
            Some(p) => cursor = p,
            None => break,
        }
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::EdgeListGraph;

    fn line() -> EdgeListGraph<char> {
        let mut g = EdgeListGraph::new();
        g.add_undirected('A', 'B', 1.0);
        g.add_undirected('B', 'C', 1.0);
        g
    }

    #[test]
    fn line_path_excludes_source() {
        let g = line();
        let path = find_path_to(&g, 'A', 'C');
        assert_eq!(path.ok(), Some(vec!['B', 'C']));
    }

    #[test]
    fn source_at_destination_is_empty() {
        let g = line();
        let path = find_path_to(&g, 'A', 'A');
        assert_eq!(path.ok(), Some(Vec::new()));
    }

    #[test]
    fn disconnected_components_are_unreachable() {
        let mut g = line();
        g.add_undirected('X', 'Y', 1.0);
        let path = find_path_to(&g, 'A', 'Y');
        assert_eq!(path.ok(), Some(Vec::new()));
    }

    #[test]
    fn unknown_source_is_an_error() {
        let g = line();
        let result = find_path_to(&g, 'Z', 'A');
        assert!(matches!(result, Err(PathError::UnknownSource { .. })));
    }

    #[test]
    fn unknown_target_is_an_error() {
        let g = line();
        let result = find_path_to(&g, 'A', 'Z');
        assert!(matches!(result, Err(PathError::UnknownTarget { .. })));
    }

    #[test]
    fn prefers_cheaper_longer_route() {
        let mut g = EdgeListGraph::new();
        g.add_undirected('A', 'C', 10.0);
        g.add_undirected('A', 'B', 3.0);
        g.add_undirected('B', 'C', 5.0);
        let path = find_path_to(&g, 'A', 'C');
        assert_eq!(path.ok(), Some(vec!['B', 'C']));
    }

    #[test]
    fn respects_edge_direction() {
        let mut g = EdgeListGraph::new();
        g.add_edge('A', 'B', 1.0);
        let back = find_path_to(&g, 'B', 'A');
        assert_eq!(back.ok(), Some(Vec::new()));
    }

    #[test]
    fn tie_break_follows_enumeration_order() {
        // Diamond: S -> L -> T and S -> R -> T, both cost 2.
        let build = |first: char, second: char| {
            let mut g = EdgeListGraph::new();
            g.add_node('S');
            g.add_node(first);
            g.add_node(second);
            g.add_node('T');
            g.add_undirected('S', 'L', 1.0);
            g.add_undirected('S', 'R', 1.0);
            g.add_undirected('L', 'T', 1.0);
            g.add_undirected('R', 'T', 1.0);
            g
        };

        let left_first = build('L', 'R');
        for _ in 0..5 {
            let path = find_path_to(&left_first, 'S', 'T');
            assert_eq!(path.ok(), Some(vec!['L', 'T']));
        }

        let right_first = build('R', 'L');
        let path = find_path_to(&right_first, 'S', 'T');
        assert_eq!(path.ok(), Some(vec!['R', 'T']));
    }

    #[test]
    fn predicate_picks_nearest_match() {
        let mut g = EdgeListGraph::new();
        g.add_undirected(0_i32, 1, 1.0);
        g.add_undirected(1, 2, 1.0);
        g.add_undirected(2, 3, 1.0);
        g.add_undirected(0, 4, 5.0);
        let path = find_path(&g, 0, |n| n >= 3);
        assert_eq!(path.ok(), Some(vec![1, 2, 3]));
    }

    #[test]
    fn negative_cost_is_rejected() {
        let mut g = EdgeListGraph::new();
        g.add_edge('A', 'B', -1.0);
        let result = find_path_to(&g, 'A', 'B');
        assert!(matches!(result, Err(PathError::InvalidCost { .. })));
    }
}

//! Shortest-path planning over the waypoint graph.
//!
//! DESIGN
//! ======
//! Dijkstra with a binary min-heap. The graph is ~40 nodes, so this is
//! microseconds per request; the heap keeps the code honest about edge
//! weights rather than buying performance. Stale heap entries (a node
//! already settled through a shorter path) are skipped on pop.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::geometry::Point;
use crate::nav::RouteGraph;

/// Heap entry ordered by inverse cost so `BinaryHeap` acts as a min-heap.
#[derive(Clone, Copy, Debug)]
struct HeapState {
    cost: f64,
    node: usize,
}

impl PartialEq for HeapState {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost && self.node == other.node
    }
}

impl Eq for HeapState {}

impl Ord for HeapState {
    fn cmp(&self, other: &Self) -> Ordering {
        other.cost.partial_cmp(&self.cost).unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for HeapState {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Plan a route from `start` to the destination named by `target`.
///
/// The first waypoint is the graph node closest to `start` (not `start`
/// itself — the client draws the leg from its marker to the route).
/// Returns an empty path when the target does not resolve or is
/// unreachable.
#[must_use]
pub fn shortest_path(graph: &RouteGraph, start: Point, target: &str) -> Vec<Point> {
    let Some(start_node) = graph.closest_node(start) else {
        return Vec::new();
    };
    let Some(end_node) = graph.resolve_target(target) else {
        return Vec::new();
    };

    let Some(node_path) = dijkstra(graph, start_node, end_node) else {
        return Vec::new();
    };

    node_path
        .into_iter()
        .map(|index| graph.node(index).location())
        .collect()
}

/// Node-index path from `start` to `goal`, or `None` when unreachable.
fn dijkstra(graph: &RouteGraph, start: usize, goal: usize) -> Option<Vec<usize>> {
    let n = graph.node_count();

    if start == goal {
        return Some(vec![start]);
    }

    let mut dist = vec![f64::INFINITY; n];
    let mut prev: Vec<Option<usize>> = vec![None; n];
    dist[start] = 0.0;

    let mut heap = BinaryHeap::new();
    heap.push(HeapState { cost: 0.0, node: start });

    while let Some(HeapState { cost, node }) = heap.pop() {
        if cost > dist[node] {
            continue;
        }
        if node == goal {
            break;
        }

        for &(neighbor, edge_dist) in graph.neighbors(node) {
            let next_dist = dist[node] + edge_dist;
            if next_dist < dist[neighbor] {
                dist[neighbor] = next_dist;
                prev[neighbor] = Some(node);
                heap.push(HeapState { cost: next_dist, node: neighbor });
            }
        }
    }

    prev[goal]?;

    let mut path = Vec::new();
    let mut current = goal;
    while current != start {
        path.push(current);
        current = prev[current]?;
    }
    path.push(start);
    path.reverse();

    Some(path)
}

#[cfg(test)]
#[path = "planner_test.rs"]
mod tests;

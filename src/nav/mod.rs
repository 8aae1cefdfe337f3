//! Route graph and shortest-path planning.

pub mod graph;
pub mod planner;

pub use graph::{RouteGraph, Waypoint};
pub use planner::shortest_path;

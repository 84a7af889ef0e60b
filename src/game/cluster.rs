//! Cluster detection - finding groups of matching bubbles.
//!
//! Uses flood fill (BFS) over the same-color adjacency produced by
//! [`BubbleGrid::neighbors_of`], so a cluster is always monochrome.

use std::collections::{HashSet, VecDeque};

use super::{bubble::BubbleId, config::MatchConfig, grid::BubbleGrid};

/// Find all bubbles connected to `seed` through same-colored neighbours.
///
/// The seed is always the first entry. A cluster of one means the seed has
/// no matching neighbour. Each bubble is visited at most once.
pub fn find_cluster(seed: BubbleId, grid: &BubbleGrid, config: &MatchConfig) -> Vec<BubbleId> {
    let mut cluster = vec![seed];
    let mut visited = HashSet::from([seed]);
    let mut queue = VecDeque::from([seed]);

    while let Some(current) = queue.pop_front() {
        for neighbor in grid.neighbors_of(current, config) {
            if visited.insert(neighbor) {
                cluster.push(neighbor);
                queue.push_back(neighbor);
            }
        }
    }

    cluster
}

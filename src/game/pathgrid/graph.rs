use bevy::prelude::*;
use fixedbitset::FixedBitSet;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::VecDeque;

use super::astar::find_node_sequence;

/// Node indices along a route through a pathgrid.
pub type NodeSequence = SmallVec<[usize; 16]>;

/// Marker for nodes whose component has not been assigned yet.
const UNLABELLED: u32 = u32::MAX;

/// Waypoint graph of one cell.
///
/// Points are stored in cell-local coordinates. Edges are undirected. Connected
/// components are labelled once on construction so reachability queries are
/// O(1); the graph is immutable afterwards.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Pathgrid {
    points: Vec<Vec3>,
    neighbors: Vec<SmallVec<[usize; 4]>>,
    components: Vec<u32>,
    component_count: u32,
}

impl Pathgrid {
    /// Build a graph from local points and undirected edges.
    ///
    /// Edges referring to missing points and self-loops are dropped with a warning.
    pub fn new(points: Vec<Vec3>, edges: &[(usize, usize)]) -> Self {
        let mut neighbors: Vec<SmallVec<[usize; 4]>> = vec![SmallVec::new(); points.len()];

        for &(a, b) in edges {
            if a >= points.len() || b >= points.len() {
                warn!("[PATHGRID] Ignoring edge ({}, {}) outside {} points", a, b, points.len());
                continue;
            }
            if a == b {
                continue;
            }
            if !neighbors[a].contains(&b) {
                neighbors[a].push(b);
            }
            if !neighbors[b].contains(&a) {
                neighbors[b].push(a);
            }
        }

        let mut grid = Self {
            points,
            neighbors,
            components: Vec::new(),
            component_count: 0,
        };
        grid.label_components();
        grid
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn neighbors(&self, node: usize) -> &[usize] {
        self.neighbors.get(node).map(|n| n.as_slice()).unwrap_or(&[])
    }

    pub fn component_count(&self) -> u32 {
        self.component_count
    }

    pub fn is_connected(&self, from: usize, to: usize) -> bool {
        match (self.components.get(from), self.components.get(to)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    pub fn shortest_node_sequence(&self, from: usize, to: usize) -> NodeSequence {
        if from == to || !self.is_connected(from, to) {
            return NodeSequence::new();
        }
        find_node_sequence(self, from, to).unwrap_or_default()
    }

    /// BFS flood fill assigning one label per connected component.
    fn label_components(&mut self) {
        self.components = vec![UNLABELLED; self.points.len()];
        self.component_count = 0;

        let mut visited = FixedBitSet::with_capacity(self.points.len());
        let mut queue = VecDeque::new();

        for seed in 0..self.points.len() {
            if visited.contains(seed) {
                continue;
            }
            let label = self.component_count;
            self.component_count += 1;

            visited.insert(seed);
            queue.push_back(seed);
            while let Some(node) = queue.pop_front() {
                self.components[node] = label;
                for &next in &self.neighbors[node] {
                    if !visited.contains(next) {
                        visited.insert(next);
                        queue.push_back(next);
                    }
                }
            }
        }

        trace!("[PATHGRID] {} points in {} components", self.points.len(), self.component_count);
    }
}

use bevy::prelude::*;
use fixedbitset::FixedBitSet;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::graph::{NodeSequence, Pathgrid};

/// Open-set entry, ordered so the `BinaryHeap` pops the lowest estimate first.
#[derive(Clone, Copy, Debug)]
struct State {
    estimate: f32,
    node: usize,
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for State {}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .estimate
            .total_cmp(&self.estimate)
            .then_with(|| other.node.cmp(&self.node))
    }
}

fn reconstruct(came_from: &[Option<usize>], mut current: usize) -> NodeSequence {
    let mut sequence = NodeSequence::new();
    sequence.push(current);
    while let Some(prev) = came_from[current] {
        current = prev;
        sequence.push(current);
    }
    sequence.reverse();
    sequence
}

/// A* over the pathgrid with straight-line edge costs and heuristic.
pub(super) fn find_node_sequence(grid: &Pathgrid, start: usize, goal: usize) -> Option<NodeSequence> {
    const MAX_ITERATIONS: usize = 100_000;

    let points = grid.points();
    if start >= points.len() || goal >= points.len() {
        return None;
    }

    let mut open_set = BinaryHeap::new();
    let mut closed = FixedBitSet::with_capacity(points.len());
    let mut came_from: Vec<Option<usize>> = vec![None; points.len()];
    let mut g_score = vec![f32::INFINITY; points.len()];

    g_score[start] = 0.0;
    open_set.push(State { estimate: points[start].distance(points[goal]), node: start });

    let mut iterations = 0;
    while let Some(State { node: current, .. }) = open_set.pop() {
        iterations += 1;
        if iterations > MAX_ITERATIONS {
            error!("[PATHGRID] A* exceeded max iterations ({}) from {} to {}", MAX_ITERATIONS, start, goal);
            return None;
        }

        if current == goal {
            return Some(reconstruct(&came_from, current));
        }
        if closed.contains(current) {
            continue;
        }
        closed.insert(current);

        for &next in grid.neighbors(current) {
            if closed.contains(next) {
                continue;
            }
            let tentative = g_score[current] + points[current].distance(points[next]);
            if tentative < g_score[next] {
                came_from[next] = Some(current);
                g_score[next] = tentative;
                open_set.push(State {
                    estimate: tentative + points[next].distance(points[goal]),
                    node: next,
                });
            }
        }
    }

    None
}

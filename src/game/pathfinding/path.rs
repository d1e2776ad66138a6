use bevy::prelude::*;

use crate::game::math::{distance_2d_squared, pitch_toward};
use crate::game::pathgrid::GraphProvider;
use crate::game::profiling::profile;

/// Ordered waypoints for one agent, consumed from the front.
///
/// Waypoints are world coordinates. Storage is a `Vec` plus a read cursor, so
/// popping the front is O(1) and the buffer is reused across rebuilds.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    waypoints: Vec<Vec3>,
    cursor: usize,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remaining waypoints, next one first.
    pub fn waypoints(&self) -> &[Vec3] {
        &self.waypoints[self.cursor..]
    }

    pub fn len(&self) -> usize {
        self.waypoints.len() - self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn first(&self) -> Option<Vec3> {
        self.waypoints().first().copied()
    }

    pub fn last(&self) -> Option<Vec3> {
        self.waypoints().last().copied()
    }

    pub fn clear(&mut self) {
        self.waypoints.clear();
        self.cursor = 0;
    }

    pub fn push(&mut self, waypoint: Vec3) {
        self.waypoints.push(waypoint);
    }

    /// Replace the whole path with a single straight leg to `target`.
    pub fn set_direct(&mut self, target: Vec3) {
        self.clear();
        self.push(target);
    }

    fn pop_front(&mut self) {
        self.cursor += 1;
        if self.cursor >= self.waypoints.len() {
            self.clear();
        }
    }

    /// Rebuild the path from `start` to `end` through `cell`'s pathgrid.
    ///
    /// Without a usable graph the path is the single waypoint `end`. Otherwise
    /// the route runs from the node closest to `start` to the closest node
    /// reachable from it near `end`. `end` itself is appended only when that node
    /// is also the globally closest one; if a closer node exists but is cut off,
    /// `end` is assumed unreachable and the path stops short. The guess can be
    /// wrong both ways (e.g. `end` reachable but right next to an unreachable
    /// node), so callers must cope with a path that ends before `end`.
    ///
    /// A path is produced even when start and end resolve to the same node:
    /// wandering behaviour treats "no path" differently from "nowhere to go".
    #[profile(1)]
    pub fn build(&mut self, start: Vec3, end: Vec3, cell: &dyn GraphProvider) {
        self.clear();

        // No pathgrid: go straight and let physics deal with blockages.
        if !cell.has_graph() {
            self.push(end);
            return;
        }
        let points = cell.node_positions();

        let converter = cell.converter();
        let start_local = converter.to_local(start);
        let end_local = converter.to_local(end);

        // Closest node may sit behind a wall; the graph has no notion of that.
        let start_node = closest_point(points, start_local);
        let (end_node, end_is_global_closest) = closest_reachable_point(cell, points, end_local, start_node);

        // Walking straight beats detouring to the graph.
        let start_to_end = start_local.distance_squared(end_local);
        let start_to_first = points[start_node].distance_squared(start_local);
        let last_to_end = points[end_node].distance_squared(end_local);
        if start_to_end < start_to_first || start_to_end < last_to_end {
            self.push(end);
            return;
        }

        if start_node == end_node {
            self.push(converter.to_world(points[start_node]));
        } else {
            let sequence = cell.shortest_node_sequence(start_node, end_node);
            if sequence.is_empty() {
                warn!("[PATH] No node sequence between connected nodes {} and {}", start_node, end_node);
            }
            self.waypoints
                .extend(sequence.iter().map(|&node| converter.to_world(points[node])));
        }

        if end_is_global_closest {
            self.push(end);
        }

        trace!("[PATH] Built {} waypoints from {:?} to {:?}", self.len(), start, end);
    }

    /// Rebuild without stepping back to a waypoint that was just passed.
    ///
    /// [`Path::build`] starts at the node closest to the agent. Right after an
    /// agent passes a node, that node is still the closest one, so a fresh path
    /// would be `[passed, old_first, ...]` and the agent would turn around. When
    /// the new second waypoint equals the old first one, the new first is dropped.
    pub fn build_synced(&mut self, start: Vec3, end: Vec3, cell: &dyn GraphProvider) {
        // A single remaining point is the destination; nothing to sync.
        let Some(old_first) = self.first().filter(|_| self.len() >= 2) else {
            self.build(start, end, cell);
            return;
        };

        self.build(start, end, cell);
        if self.waypoints().get(1) == Some(&old_first) {
            self.pop_front();
        }
    }

    /// Pop the next waypoint if `(x, y)` is within `tolerance` of it.
    ///
    /// Returns true once the path is empty; an empty path always reports true.
    pub fn consume_if_reached(&mut self, x: f32, y: f32, tolerance: f32) -> bool {
        let Some(next) = self.first() else {
            return true;
        };

        if distance_2d_squared(next, x, y) < tolerance * tolerance {
            self.pop_front();
            return self.is_empty();
        }

        false
    }

    /// Yaw toward the next waypoint, 0 when the path is empty.
    pub fn yaw_to_next(&self, x: f32, y: f32) -> f32 {
        match self.first() {
            Some(next) => (next.x - x).atan2(next.y - y),
            None => 0.0,
        }
    }

    /// Pitch toward the next waypoint, 0 when the path is empty.
    ///
    /// Like [`pitch_toward`], undefined when the position is the waypoint itself.
    pub fn pitch_to_next(&self, x: f32, y: f32, z: f32) -> f32 {
        match self.first() {
            Some(next) => pitch_toward(next - Vec3::new(x, y, z)),
            None => 0.0,
        }
    }
}

/// Index of the node closest to `pos` (cell-local). `points` must not be empty.
fn closest_point(points: &[Vec3], pos: Vec3) -> usize {
    let mut closest = 0;
    let mut best = points[0].distance_squared(pos);

    for (index, point) in points.iter().enumerate().skip(1) {
        let dist = point.distance_squared(pos);
        if dist < best {
            best = dist;
            closest = index;
        }
    }

    closest
}

/// Closest node to `pos` that is connected to `start`, and whether it is also
/// the closest node overall.
///
/// A node only competes once it beats the best reachable candidate so far, so
/// the global closest is tracked among those candidates.
fn closest_reachable_point(
    cell: &dyn GraphProvider,
    points: &[Vec3],
    pos: Vec3,
    start: usize,
) -> (usize, bool) {
    let mut closest_any = f32::MAX;
    let mut closest_reachable = f32::MAX;
    let mut closest_index = 0;
    let mut reachable_index = start;

    for (index, point) in points.iter().enumerate() {
        let dist = point.distance_squared(pos);
        if dist < closest_reachable {
            if cell.is_point_connected(start, index) {
                closest_reachable = dist;
                reachable_index = index;
            }
            if dist < closest_any {
                closest_any = dist;
                closest_index = index;
            }
        }
    }

    (reachable_index, reachable_index == closest_index)
}

//! Simple analytic world used when no physics backend is wired in.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::visibility::RayCaster;

/// Vertical wall between two ground-plane points, infinitely tall.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Wall {
    pub start: Vec2,
    pub end: Vec2,
}

/// Axis-aligned area whose floor sits at `floor` instead of the ground height.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Sink {
    pub min: Vec2,
    pub max: Vec2,
    pub floor: f32,
}

impl Sink {
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

/// Flat ground at `ground_height` with optional walls and pits/plateaus.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct OpenTerrain {
    pub ground_height: f32,
    pub walls: Vec<Wall>,
    pub sinks: Vec<Sink>,
}

impl OpenTerrain {
    pub fn flat(ground_height: f32) -> Self {
        Self { ground_height, ..Default::default() }
    }

    pub fn with_wall(mut self, start: Vec2, end: Vec2) -> Self {
        self.walls.push(Wall { start, end });
        self
    }

    pub fn with_sink(mut self, min: Vec2, max: Vec2, floor: f32) -> Self {
        self.sinks.push(Sink { min, max, floor });
        self
    }

    /// Floor height under a ground-plane point.
    pub fn floor_at(&self, p: Vec2) -> f32 {
        self.sinks
            .iter()
            .rev()
            .find(|sink| sink.contains(p))
            .map(|sink| sink.floor)
            .unwrap_or(self.ground_height)
    }
}

/// Proper intersection test between segments `a0-a1` and `b0-b1`.
fn segments_cross(a0: Vec2, a1: Vec2, b0: Vec2, b1: Vec2) -> bool {
    let d1 = (a1 - a0).perp_dot(b0 - a0);
    let d2 = (a1 - a0).perp_dot(b1 - a0);
    let d3 = (b1 - b0).perp_dot(a0 - b0);
    let d4 = (b1 - b0).perp_dot(a1 - b0);
    d1 * d2 < 0.0 && d3 * d4 < 0.0
}

impl RayCaster for OpenTerrain {
    fn cast_ray(&self, from: Vec3, to: Vec3) -> bool {
        let (a0, a1) = (from.truncate(), to.truncate());
        self.walls.iter().any(|wall| segments_cross(a0, a1, wall.start, wall.end))
    }

    fn dist_to_nearest_ray_hit(&self, origin: Vec3, dir: Vec3, max_distance: f32) -> f32 {
        // Only vertical probes are meaningful on a heightfield without overhangs.
        if dir.z >= 0.0 || dir.truncate().length_squared() > f32::EPSILON {
            return max_distance;
        }
        let floor = self.floor_at(origin.truncate());
        let dist = (origin.z - floor) / -dir.z;
        if dist < 0.0 {
            max_distance
        } else {
            dist.min(max_distance)
        }
    }
}

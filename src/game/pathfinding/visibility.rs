use bevy::prelude::*;

use crate::game::config::NavConfig;

/// World collision queries used by the navigation core.
pub trait RayCaster {
    /// True if the segment `from -> to` hits anything.
    fn cast_ray(&self, from: Vec3, to: Vec3) -> bool;

    /// Distance along `dir` from `origin` to the first surface, or
    /// `max_distance` when nothing is hit within range.
    fn dist_to_nearest_ray_hit(&self, origin: Vec3, dir: Vec3, max_distance: f32) -> f32;
}

/// Check a straight walk from `from` to `to` for pits and ledges.
///
/// A single down-ray is cast from a point `offset_xy` ahead of `from` (toward
/// `to`) and `probe_height` above it; the way is clear when the surface found
/// there is within `z_reach` of `from`'s height. Short hops whose endpoints
/// already differ by more than `z_reach` are reported clear without probing,
/// so ramps and stairs near the agent do not block shortcuts.
pub fn check_way_is_clear(
    rays: &dyn RayCaster,
    from: Vec3,
    to: Vec3,
    offset_xy: f32,
    config: &NavConfig,
) -> bool {
    let horizontal = Vec3::new(to.x - from.x, to.y - from.y, 0.0);

    if horizontal.length() < config.caution_distance && (from.z - to.z).abs() > config.z_reach {
        return true;
    }

    let dir = horizontal.normalize_or_zero();
    let probe = from + dir * offset_xy + Vec3::Z * config.probe_height;
    let reach = config.probe_height + config.z_reach + 1.0;
    let surface = probe.z - rays.dist_to_nearest_ray_hit(probe, Vec3::NEG_Z, reach);

    (from.z - surface).abs() <= config.z_reach
}

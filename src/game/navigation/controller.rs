use bevy::prelude::*;

use crate::game::config::NavConfig;
use crate::game::math::{distance_3d, pitch_between, yaw_between};
use crate::game::pathfinding::{check_way_is_clear, Path, RayCaster};
use crate::game::pathgrid::GraphProvider;

use super::active_area::ActiveArea;
use super::agent::{AgentState, MovementIntent};
use super::doors::DoorRegistry;
use super::obstacle::StuckDetector;

/// Everything the controller consults besides the agent itself.
///
/// Built fresh for every call; the controller keeps no references between
/// ticks.
pub struct NavContext<'a> {
    pub config: &'a NavConfig,
    /// Cell the agent is currently in.
    pub cell: &'a dyn GraphProvider,
    pub rays: &'a dyn RayCaster,
    pub active_area: &'a ActiveArea,
    pub doors: &'a mut dyn DoorRegistry,
    pub stuck: &'a mut dyn StuckDetector,
}

/// Per-agent navigation state carried across ticks.
///
/// Call [`NavigationController::advance`] once per tick while the agent is
/// travelling. Expensive decisions (rebuilding the path, trying a straight
/// shortcut) are throttled to one per `reaction_time`; between them the
/// agent just follows the current path.
#[derive(Clone, Debug)]
pub struct NavigationController {
    /// Seconds since the last re-evaluation.
    timer: f32,
    /// Position at the last re-evaluation, for the stuck test.
    last_position: Option<Vec3>,
    /// Where a shortcut last failed. Shortcuts are not retried near it.
    shortcut_fail_pos: Option<Vec3>,
    /// Destination the current path was built for.
    prev_destination: Option<Vec3>,
    path: Path,
}

impl Default for NavigationController {
    fn default() -> Self {
        Self {
            // Forces an evaluation on the first tick.
            timer: f32::INFINITY,
            last_position: None,
            shortcut_fail_pos: None,
            prev_destination: None,
            path: Path::new(),
        }
    }
}

impl NavigationController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn shortcut_fail_position(&self) -> Option<Vec3> {
        self.shortcut_fail_pos
    }

    /// Forget everything, as if the agent just started travelling.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Steer the agent one tick toward `destination`.
    ///
    /// Writes the requested movement and facing into `movement` and returns
    /// true once the agent is within `dest_tolerance` of the destination or
    /// has consumed its whole path.
    pub fn advance(
        &mut self,
        agent: &AgentState,
        destination: Vec3,
        dt: f32,
        dest_tolerance: f32,
        ctx: &mut NavContext,
        movement: &mut MovementIntent,
    ) -> bool {
        self.timer += dt;
        let config = ctx.config;
        let pos = agent.position;

        // Walking into an unloaded cell would drop the agent out of the world.
        if ctx.active_area.is_near_inactive(pos, config) {
            movement.forward = 0.0;
            return false;
        }

        let dest_reached = distance_3d(pos, destination) <= dest_tolerance;

        if !dest_reached && self.timer > config.reaction_time {
            self.reevaluate(agent, destination, ctx);
            self.timer = 0.0;
        }

        if dest_reached || self.path.consume_if_reached(pos.x, pos.y, config.path_tolerance) {
            movement.stop();
            movement.yaw = yaw_between(pos, destination);
            if pos != destination {
                movement.pitch = pitch_between(pos, destination);
            }
            return true;
        }

        self.evade_obstacles(agent, dt, ctx, movement);
        movement.yaw = self.path.yaw_to_next(pos.x, pos.y);
        movement.pitch = self.path.pitch_to_next(pos.x, pos.y, pos.z);
        false
    }

    fn reevaluate(&mut self, agent: &AgentState, destination: Vec3, ctx: &mut NavContext) {
        let config = ctx.config;
        let pos = agent.position;

        let stuck = self.last_position.is_some_and(|last| {
            distance_3d(pos, last) < agent.speed * self.timer
                && distance_3d(destination, pos) > config.stuck_min_remaining
        });
        self.last_position = Some(pos);

        let need_recalc = self.does_path_need_recalc(destination, config);
        let way_clear = need_recalc || self.check_way_is_clear_for_actor(pos, destination, agent, ctx);

        if !way_clear || need_recalc {
            let mut dest_in_los = false;
            let shortcut = !stuck
                && way_clear
                && self.shortcut_path(pos, destination, agent, ctx, &mut dest_in_los);

            if !shortcut {
                self.path.build_synced(pos, destination, ctx.cell);

                // The graph detours further than walking straight at the
                // destination we can already see.
                if dest_in_los && self.path.len() > 1 {
                    let waypoints = self.path.waypoints();
                    let before_dest = waypoints[waypoints.len() - 2];
                    if distance_3d(pos, destination) <= distance_3d(destination, before_dest) {
                        self.path.set_direct(destination);
                    }
                }
            }

            trace!(
                "[NAV] Rebuilt path at {:?}: {} waypoints (stuck: {}, shortcut: {})",
                pos, self.path.len(), stuck, shortcut
            );
        }

        // The graph may end short of the destination; close the gap directly.
        if let Some(last) = self.path.last() {
            if distance_3d(destination, last) > config.far_end_distance {
                self.path.push(destination);
            }
        }
    }

    /// Replace the path with a straight leg to `end` if nothing is in the way.
    ///
    /// `dest_in_los` is set to the raw line-of-sight result when a ray was cast.
    fn shortcut_path(
        &mut self,
        start: Vec3,
        end: Vec3,
        agent: &AgentState,
        ctx: &mut NavContext,
        dest_in_los: &mut bool,
    ) -> bool {
        let mut clear = agent.can_move_by_z();

        if !clear && self.shortcut_allowed_from(start, ctx.config) {
            clear = !ctx.rays.cast_ray(start, end);
            *dest_in_los = clear;

            if !clear {
                self.prohibit_shortcut_from(start);
                return false;
            }

            clear = self.check_way_is_clear_for_actor(start, end, agent, ctx);
        }

        if clear {
            self.path.set_direct(end);
        }
        clear
    }

    /// Probe for pits on the way, scaled by how far the agent runs before it
    /// can react and turn.
    fn check_way_is_clear_for_actor(
        &mut self,
        start: Vec3,
        end: Vec3,
        agent: &AgentState,
        ctx: &NavContext,
    ) -> bool {
        if agent.can_move_by_z() {
            return true;
        }

        let config = ctx.config;
        let max_avoid = config.reaction_time * agent.speed
            + agent.speed / config.max_angular_velocity * 2.0;
        let horizontal = start.truncate().distance(end.truncate());
        let offset = if horizontal > max_avoid * 1.5 { max_avoid } else { max_avoid / 2.0 };

        let clear = check_way_is_clear(ctx.rays, start, end, offset, config);
        if clear {
            self.shortcut_fail_pos = None;
        } else {
            self.prohibit_shortcut_from(start);
        }
        clear
    }

    fn does_path_need_recalc(&mut self, destination: Vec3, config: &NavConfig) -> bool {
        let need = self
            .prev_destination
            .map_or(true, |prev| distance_3d(prev, destination) > config.recalc_threshold);
        if need {
            self.prev_destination = Some(destination);
        }
        need
    }

    fn shortcut_allowed_from(&self, pos: Vec3, config: &NavConfig) -> bool {
        match self.shortcut_fail_pos {
            Some(fail) => distance_3d(fail, pos) >= config.shortcut_retry_distance,
            None => true,
        }
    }

    fn prohibit_shortcut_from(&mut self, pos: Vec3) {
        if self.shortcut_fail_pos.is_none() {
            debug!("[NAV] Shortcut blocked at {:?}", pos);
            self.shortcut_fail_pos = Some(pos);
        }
    }

    /// Keep moving forward; when stuck, open a door in the way or sidestep.
    fn evade_obstacles(
        &mut self,
        agent: &AgentState,
        dt: f32,
        ctx: &mut NavContext,
        movement: &mut MovementIntent,
    ) {
        movement.yaw = self.path.yaw_to_next(agent.position.x, agent.position.y);

        if !ctx.stuck.check(agent, dt) {
            movement.forward = 1.0;
            movement.strafe = 0.0;
            return;
        }

        match ctx.doors.nearby_door(agent.position, agent.yaw, ctx.config.door_search_distance) {
            Some(door) => {
                // Locked, trapped or load doors are left alone.
                if door.can_be_opened_by_agent() {
                    debug!("[NAV] Opening door {:?} at {:?}", door.id, door.position);
                    ctx.doors.open_door(door.id);
                }
            }
            None => ctx.stuck.take_evasive_action(movement),
        }
    }
}

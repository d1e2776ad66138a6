/// Kinematic integration of movement intents.
///
/// Agents are moved exactly as requested, without collision response. The
/// navigation core only needs positions to change; a host game would replace
/// this with its own character controller.

use bevy::prelude::*;

use crate::game::config::NavConfig;
use crate::game::math::{forward_from_yaw, wrap_angle};
use crate::game::navigation::MovementIntent;
use super::components::{Heading, NavAgent, WorldPosition};

/// Snap headings to the requested facing and move agents along it.
pub fn apply_movement_intent(
    config: Res<NavConfig>,
    mut query: Query<(&mut WorldPosition, &mut Heading, &NavAgent, &MovementIntent)>,
) {
    let delta = config.tick_delta();

    for (mut pos, mut heading, agent, intent) in query.iter_mut() {
        heading.yaw = wrap_angle(intent.yaw);
        heading.pitch = intent.pitch;

        if !intent.is_moving() {
            continue;
        }

        let velocity = intent_velocity(agent, &heading, intent);
        pos.0 += velocity * agent.speed * delta;
    }
}

/// Unit-bounded velocity direction for an intent.
///
/// Ground agents move in the horizontal plane; swimmers and flyers follow
/// their pitch and may use the vertical axis.
pub fn intent_velocity(agent: &NavAgent, heading: &Heading, intent: &MovementIntent) -> Vec3 {
    let forward = forward_from_yaw(heading.yaw);
    let right = Vec3::new(forward.y, -forward.x, 0.0);

    let mut velocity = right * intent.strafe;
    let can_move_by_z = (agent.can_swim && agent.swimming) || agent.flying;

    if can_move_by_z {
        // Positive pitch looks down.
        let (sin, cos) = heading.pitch.sin_cos();
        velocity += (forward * cos - Vec3::Z * sin) * intent.forward;
        velocity.z += intent.vertical;
    } else {
        velocity += forward * intent.forward;
    }

    // Diagonal input is not faster than straight input.
    if velocity.length_squared() > 1.0 {
        velocity = velocity.normalize();
    }
    velocity
}

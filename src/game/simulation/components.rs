/// Component definitions for the simulation layer.
///
/// Agents are plain entities carrying a position, a heading and their
/// movement capabilities. Navigation state lives in `navigation::components`.

use bevy::prelude::*;

use crate::game::navigation::AgentState;
use crate::game::pathgrid::CellId;

// ============================================================================
// Kinematics
// ============================================================================

/// World-space position of an agent.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct WorldPosition(pub Vec3);

/// Facing of an agent in radians. Yaw 0 looks along +y.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct Heading {
    pub yaw: f32,
    pub pitch: f32,
}

// ============================================================================
// Agent Capabilities
// ============================================================================

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct NavAgent {
    /// Units per second at full forward input.
    pub speed: f32,
    pub can_swim: bool,
    pub swimming: bool,
    pub flying: bool,
}

impl Default for NavAgent {
    fn default() -> Self {
        Self {
            speed: 100.0,
            can_swim: false,
            swimming: false,
            flying: false,
        }
    }
}

impl NavAgent {
    pub fn state(&self, position: &WorldPosition, heading: &Heading) -> AgentState {
        AgentState {
            position: position.0,
            yaw: heading.yaw,
            speed: self.speed,
            can_swim: self.can_swim,
            swimming: self.swimming,
            flying: self.flying,
        }
    }
}

/// Cell the agent is currently in; selects the pathgrid used for planning.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct InCell(pub CellId);

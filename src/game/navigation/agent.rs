use bevy::prelude::*;

/// Snapshot of the agent the controller is steering this tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AgentState {
    pub position: Vec3,
    /// Current facing, used to look for doors in front of the agent.
    pub yaw: f32,
    /// Rated movement speed in units per second.
    pub speed: f32,
    pub can_swim: bool,
    pub swimming: bool,
    pub flying: bool,
}

impl AgentState {
    /// Swimmers in water and flyers ignore terrain height, so pits and ledges
    /// never block them.
    pub fn can_move_by_z(&self) -> bool {
        (self.can_swim && self.swimming) || self.flying
    }
}

/// Movement and rotation requested by the controller for this tick.
///
/// Axes are normalized: `forward` along the facing, `strafe` to the right,
/// `vertical` up. `yaw` / `pitch` are the facing targets.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
pub struct MovementIntent {
    pub forward: f32,
    pub strafe: f32,
    pub vertical: f32,
    pub yaw: f32,
    pub pitch: f32,
}

impl MovementIntent {
    /// Zero all positional axes, keep the facing targets.
    pub fn stop(&mut self) {
        self.forward = 0.0;
        self.strafe = 0.0;
        self.vertical = 0.0;
    }

    pub fn is_moving(&self) -> bool {
        self.forward != 0.0 || self.strafe != 0.0 || self.vertical != 0.0
    }
}

/// Active concealment effects on a potential target.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MagicEffects {
    pub invisibility: f32,
    pub chameleon: f32,
}

/// Chameleon magnitude above which a target counts as unseen.
const CHAMELEON_HIDDEN_THRESHOLD: f32 = 75.0;

/// True when `effects` hide the target from ordinary sight.
pub fn is_target_magically_hidden(effects: &MagicEffects) -> bool {
    effects.invisibility > 0.0 || effects.chameleon > CHAMELEON_HIDDEN_THRESHOLD
}

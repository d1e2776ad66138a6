use bevy::prelude::*;

use crate::game::config::NavConfig;
use crate::game::math::distance_3d;

use super::agent::{AgentState, MovementIntent};

/// Decides whether an agent made no progress and how it tries to get free.
pub trait StuckDetector {
    /// Called once per navigation tick with the agent's current state.
    fn check(&mut self, agent: &AgentState, dt: f32) -> bool;

    /// Overwrite the movement axes with an evasive maneuver.
    fn take_evasive_action(&mut self, movement: &mut MovementIntent);
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WalkState {
    #[default]
    Normal,
    CheckStuck,
    Evade,
}

/// Evasive maneuvers as (strafe, forward): sidestep right, sidestep left,
/// back off to the left, back off to the right.
const EVADE_DIRECTIONS: [(f32, f32); 4] = [(1.0, 0.0), (-1.0, 0.0), (-1.0, -1.0), (1.0, -1.0)];

/// Default [`StuckDetector`]: same-spot timer followed by a timed evasion.
#[derive(Clone, Debug)]
pub struct ObstacleCheck {
    prev_position: Option<Vec3>,
    walk_state: WalkState,
    stuck_time: f32,
    evade_time: f32,
    evade_index: usize,

    same_spot_factor: f32,
    same_spot_duration: f32,
    evade_duration: f32,
}

impl Default for ObstacleCheck {
    fn default() -> Self {
        Self::new(&NavConfig::default())
    }
}

impl ObstacleCheck {
    pub fn new(config: &NavConfig) -> Self {
        Self {
            prev_position: None,
            walk_state: WalkState::Normal,
            stuck_time: 0.0,
            evade_time: 0.0,
            evade_index: 0,
            same_spot_factor: config.same_spot_factor,
            same_spot_duration: config.same_spot_duration,
            evade_duration: config.evade_duration,
        }
    }

    pub fn walk_state(&self) -> WalkState {
        self.walk_state
    }

    pub fn clear(&mut self) {
        self.prev_position = None;
        self.walk_state = WalkState::Normal;
        self.stuck_time = 0.0;
        self.evade_time = 0.0;
    }
}

impl StuckDetector for ObstacleCheck {
    fn check(&mut self, agent: &AgentState, dt: f32) -> bool {
        let Some(prev) = self.prev_position.replace(agent.position) else {
            return false;
        };

        if agent.speed <= 0.0 {
            self.walk_state = WalkState::Normal;
            self.stuck_time = 0.0;
            return false;
        }

        let same_spot = distance_3d(prev, agent.position) < self.same_spot_factor * agent.speed * dt;

        match self.walk_state {
            WalkState::Normal => {
                if same_spot {
                    self.walk_state = WalkState::CheckStuck;
                    self.stuck_time = dt;
                }
                false
            }
            WalkState::CheckStuck => {
                if !same_spot {
                    self.walk_state = WalkState::Normal;
                    self.stuck_time = 0.0;
                    return false;
                }

                self.stuck_time += dt;
                if self.stuck_time < self.same_spot_duration {
                    return false;
                }

                self.walk_state = WalkState::Evade;
                self.stuck_time = 0.0;
                self.evade_time = 0.0;
                debug!("[OBSTACLE] Stuck at {:?}, evading", agent.position);
                true
            }
            WalkState::Evade => {
                self.evade_time += dt;
                if self.evade_time < self.evade_duration {
                    return true;
                }

                // Next time we get stuck, try a different direction.
                self.evade_index = (self.evade_index + 1) % EVADE_DIRECTIONS.len();
                self.walk_state = WalkState::CheckStuck;
                self.evade_time = 0.0;
                false
            }
        }
    }

    fn take_evasive_action(&mut self, movement: &mut MovementIntent) {
        let (strafe, forward) = EVADE_DIRECTIONS[self.evade_index];
        movement.strafe = strafe;
        movement.forward = forward;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 0.05;

    fn agent_at(x: f32, speed: f32) -> AgentState {
        AgentState {
            position: Vec3::new(x, 0.0, 0.0),
            yaw: 0.0,
            speed,
            can_swim: false,
            swimming: false,
            flying: false,
        }
    }

    #[test]
    fn test_moving_agent_is_never_stuck() {
        let mut check = ObstacleCheck::default();
        for step in 0..100 {
            assert!(!check.check(&agent_at(step as f32 * 5.0, 100.0), DT));
        }
        assert_eq!(check.walk_state(), WalkState::Normal);
    }

    #[test]
    fn test_stuck_only_after_same_spot_duration() {
        let mut check = ObstacleCheck::default();
        let agent = agent_at(0.0, 100.0);

        // 1 s at 20 Hz; the first call only records the position.
        let mut first_stuck = None;
        for step in 0..40 {
            if check.check(&agent, DT) {
                first_stuck = Some(step);
                break;
            }
        }

        let step = first_stuck.expect("agent never reported stuck");
        assert!(step as f32 * DT >= 1.0 - 1e-4, "stuck after {} ticks", step);
        assert_eq!(check.walk_state(), WalkState::Evade);
    }

    #[test]
    fn test_evasion_lasts_then_rechecks() {
        let mut check = ObstacleCheck::default();
        let agent = agent_at(0.0, 100.0);
        while !check.check(&agent, DT) {}

        let mut evading = 1;
        while check.check(&agent, DT) {
            evading += 1;
            assert!(evading < 100);
        }
        // 0.4 s of evasion at 20 Hz.
        assert!((7..=9).contains(&evading), "evaded for {} ticks", evading);
        assert_eq!(check.walk_state(), WalkState::CheckStuck);
    }

    #[test]
    fn test_progress_resets_the_timer() {
        let mut check = ObstacleCheck::default();
        let mut x = 0.0;
        for step in 0..200 {
            // Alternate between standing still and a real step.
            if step % 10 == 0 {
                x += 50.0;
            }
            assert!(!check.check(&agent_at(x, 100.0), DT));
        }
    }

    #[test]
    fn test_zero_speed_is_never_stuck() {
        let mut check = ObstacleCheck::default();
        for _ in 0..100 {
            assert!(!check.check(&agent_at(0.0, 0.0), DT));
        }
    }

    #[test]
    fn test_evasive_actions_cycle() {
        let mut check = ObstacleCheck::default();
        let agent = agent_at(0.0, 100.0);
        let mut seen = Vec::new();

        for _ in 0..2 {
            while !check.check(&agent, DT) {}
            let mut movement = MovementIntent::default();
            check.take_evasive_action(&mut movement);
            seen.push((movement.strafe, movement.forward));
            while check.check(&agent, DT) {}
        }

        assert_eq!(seen[0], EVADE_DIRECTIONS[0]);
        assert_eq!(seen[1], EVADE_DIRECTIONS[1]);
    }
}

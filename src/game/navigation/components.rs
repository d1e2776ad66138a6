use bevy::prelude::*;

use crate::game::config::NavConfig;

use super::controller::NavigationController;
use super::obstacle::ObstacleCheck;

/// Where a navigating agent is headed.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Destination {
    pub point: Vec3,
    /// Distance at which the destination counts as reached.
    pub tolerance: f32,
}

/// Navigation state of an agent that is currently travelling.
#[derive(Component, Debug, Clone)]
pub struct Navigator {
    pub controller: NavigationController,
    pub obstacle: ObstacleCheck,
    /// Result of the last controller update.
    pub arrived: bool,
}

impl Navigator {
    pub fn new(config: &NavConfig) -> Self {
        Self {
            controller: NavigationController::new(),
            obstacle: ObstacleCheck::new(config),
            arrived: false,
        }
    }
}

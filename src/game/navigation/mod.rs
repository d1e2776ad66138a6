//! Per-tick navigation: the path-following controller, its collaborators and
//! the ECS systems that run it for every travelling agent.

mod active_area;
mod agent;
mod components;
mod controller;
mod doors;
mod events;
mod obstacle;
mod systems;
mod world;


// ============================================================================
// PUBLIC API
// ============================================================================

pub use active_area::ActiveArea;
pub use agent::{is_target_magically_hidden, AgentState, MagicEffects, MovementIntent};
pub use components::{Destination, Navigator};
pub use controller::{NavContext, NavigationController};
pub use doors::{DoorId, DoorInfo, DoorList, DoorRegistry, DoorRequests, DoorState};
pub use events::{DestinationReached, NavigateCommand, OpenDoorCommand, StopCommand};
pub use obstacle::{ObstacleCheck, StuckDetector, WalkState};
pub use systems::{advance_navigators, apply_door_commands, process_nav_commands};
pub use world::NavWorld;

use bevy::prelude::*;

use crate::game::simulation::{increment_nav_tick, SimSet};

pub struct NavigationPlugin;

impl Plugin for NavigationPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<NavigateCommand>();
        app.add_message::<StopCommand>();
        app.add_message::<OpenDoorCommand>();
        app.add_message::<DestinationReached>();
        app.init_resource::<NavWorld>();

        app.add_systems(FixedUpdate, (
            process_nav_commands.in_set(SimSet::Input).after(increment_nav_tick),
            advance_navigators.in_set(SimSet::Navigation),
            apply_door_commands.in_set(SimSet::World),
        ));
    }
}

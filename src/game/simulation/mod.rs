/// Simulation layer - fixed-tick agent kinematics.
///
/// This module is organized into:
/// - **components**: Agent components (position, heading, capabilities, cell)
/// - **resources**: Tick counter
/// - **physics**: Applying movement intents to positions

use bevy::prelude::*;

use crate::game::config::NavConfig;

// Module declarations
pub mod components;
pub mod resources;
pub mod physics;

// Re-export commonly used items
pub use components::*;
pub use resources::*;

// System sets for organizing execution order
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum SimSet {
    Input,       // Tick counter and navigation commands
    Navigation,  // Per-agent controller updates
    Integration, // Applying movement intents to positions
    World,       // Applying world changes requested by agents (doors)
}

/// Main simulation plugin
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        // Overwritten from NavConfig::tick_rate once the config is loaded
        app.insert_resource(Time::<Fixed>::from_hz(20.0));
        app.init_resource::<NavTick>();

        app.configure_sets(FixedUpdate, (
            SimSet::Input,
            SimSet::Navigation,
            SimSet::Integration,
            SimSet::World,
        ).chain());

        app.add_systems(PostStartup, sync_fixed_timestep);

        app.add_systems(FixedUpdate, (
            increment_nav_tick.in_set(SimSet::Input),
            physics::apply_movement_intent.in_set(SimSet::Integration),
        ));
    }
}

pub fn increment_nav_tick(mut tick: ResMut<NavTick>) {
    tick.increment();
}

fn sync_fixed_timestep(config: Res<NavConfig>, time: Option<ResMut<Time<Fixed>>>) {
    if let Some(mut time) = time {
        time.set_timestep_hz(config.tick_rate);
        info!("Fixed timestep set to {} Hz", config.tick_rate);
    }
}

use bevy::prelude::*;

pub mod config;
pub mod math;
pub mod navigation;
pub mod pathfinding;
pub mod pathgrid;
pub mod profiling;
pub mod simulation;

use config::NavConfigPlugin;
use navigation::NavigationPlugin;
use simulation::SimulationPlugin;

/// Everything needed to run navigating agents headless: config loading,
/// the fixed-tick simulation and the navigation systems.
pub struct WayfarerPlugin;

impl Plugin for WayfarerPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            NavConfigPlugin,
            SimulationPlugin,
            NavigationPlugin,
        ));
    }
}

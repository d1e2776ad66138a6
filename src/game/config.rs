use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Default location of the tuning file, relative to the working directory.
pub const NAV_CONFIG_PATH: &str = "assets/nav_config.ron";

/// Tuning constants for path building and per-tick navigation.
///
/// Loaded once at startup. Distances are in world units, times in seconds,
/// angles in radians.
#[derive(Resource, Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct NavConfig {
    // Simulation
    pub tick_rate: f64,

    // Controller timing
    /// Minimum interval between rebuild / shortcut re-evaluations.
    pub reaction_time: f32,
    /// Turn rate used to widen the lateral probe offset.
    pub max_angular_velocity: f32,

    // Path following
    pub path_tolerance: f32,
    /// Destination movement that triggers a full rebuild.
    pub recalc_threshold: f32,
    /// Remaining distance below which an agent is never considered stuck.
    pub stuck_min_remaining: f32,
    /// Gap between the path's end and the destination that gets closed explicitly.
    pub far_end_distance: f32,

    // Visibility probe
    pub z_reach: f32,
    pub caution_distance: f32,
    pub probe_height: f32,
    pub shortcut_retry_distance: f32,

    // Obstacle evasion
    pub same_spot_factor: f32,
    pub same_spot_duration: f32,
    pub evade_duration: f32,
    pub door_search_distance: f32,

    // Active area
    pub cell_size: f32,
    pub active_edge_margin: f32,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            tick_rate: 20.0,
            reaction_time: 0.25,
            max_angular_velocity: std::f32::consts::PI,
            path_tolerance: 32.0,
            recalc_threshold: 10.0,
            stuck_min_remaining: 20.0,
            far_end_distance: 100.0,
            z_reach: 50.0,
            caution_distance: 500.0,
            probe_height: 200.0,
            shortcut_retry_distance: 300.0,
            same_spot_factor: 0.5,
            same_spot_duration: 1.0,
            evade_duration: 0.4,
            door_search_distance: 100.0,
            cell_size: 8192.0,
            active_edge_margin: 200.0,
        }
    }
}

impl NavConfig {
    /// Fixed timestep derived from `tick_rate`.
    pub fn tick_delta(&self) -> f32 {
        (1.0 / self.tick_rate) as f32
    }

    pub fn from_ron_str(contents: &str) -> Result<Self, ConfigError> {
        ron::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_ron_str(&contents)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "failed to read nav config: {}", e),
            ConfigError::Parse(e) => write!(f, "failed to parse nav config: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(_) => None,
        }
    }
}

/// Where [`load_nav_config`] reads from. Insert before startup to override.
#[derive(Resource, Clone, Debug)]
pub struct NavConfigSource(pub String);

impl Default for NavConfigSource {
    fn default() -> Self {
        Self(NAV_CONFIG_PATH.to_string())
    }
}

pub struct NavConfigPlugin;

impl Plugin for NavConfigPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<NavConfigSource>()
           .add_systems(Startup, load_nav_config);
    }
}

/// Load the tuning file synchronously at startup, falling back to defaults.
///
/// An already inserted [`NavConfig`] wins over the file, so tests and embedding
/// apps can pin their own values.
fn load_nav_config(
    mut commands: Commands,
    source: Res<NavConfigSource>,
    existing: Option<Res<NavConfig>>,
) {
    if existing.is_some() {
        debug!("NavConfig already present, skipping {}", source.0);
        return;
    }

    match NavConfig::load(&source.0) {
        Ok(config) => {
            info!("Loaded nav config from {}", source.0);
            commands.insert_resource(config);
        }
        Err(e) => {
            error!("{} ({})", e, source.0);
            error!("Using default NavConfig");
            commands.insert_resource(NavConfig::default());
        }
    }
}

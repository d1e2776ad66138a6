use bevy::prelude::*;

use crate::game::pathfinding::{OpenTerrain, RayCaster};
use crate::game::pathgrid::CellRegistry;

use super::active_area::ActiveArea;
use super::doors::DoorList;

/// The static world the navigation systems plan against.
#[derive(Resource)]
pub struct NavWorld {
    pub cells: CellRegistry,
    pub rays: Box<dyn RayCaster + Send + Sync>,
    pub doors: DoorList,
    pub active_area: ActiveArea,
}

impl Default for NavWorld {
    fn default() -> Self {
        Self {
            cells: CellRegistry::default(),
            rays: Box::new(OpenTerrain::flat(0.0)),
            doors: DoorList::new(),
            active_area: ActiveArea::default(),
        }
    }
}

impl NavWorld {
    pub fn with_rays(mut self, rays: impl RayCaster + Send + Sync + 'static) -> Self {
        self.rays = Box::new(rays);
        self
    }
}

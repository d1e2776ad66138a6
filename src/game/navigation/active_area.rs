use bevy::prelude::*;

use crate::game::config::NavConfig;
use crate::game::pathgrid::CellId;

/// The loaded part of the world around the observer.
///
/// In an exterior cell the 3x3 block of cells centered on the observer is
/// simulated; agents walking toward its edge stop before they leave it.
/// Interiors are loaded one cell at a time and have no such edge.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ActiveArea {
    pub observer_cell: Option<CellId>,
}

impl ActiveArea {
    pub fn new(observer_cell: CellId) -> Self {
        Self { observer_cell: Some(observer_cell) }
    }

    pub fn is_near_inactive(&self, pos: Vec3, config: &NavConfig) -> bool {
        let Some(CellId::Exterior(grid)) = self.observer_cell else {
            return false;
        };

        let size = config.cell_size;
        let local = pos.truncate() - grid.as_vec2() * size;
        let low = -size + config.active_edge_margin;
        let high = 2.0 * size - config.active_edge_margin;

        local.x < low || local.x > high || local.y < low || local.y > high
    }
}

use bevy::prelude::*;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::graph::{NodeSequence, Pathgrid};
use super::GraphProvider;

/// Identity of a world cell.
///
/// Exterior cells tile the ground plane on a square grid; interior cells all
/// share the world origin as their local frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellId {
    Exterior(IVec2),
    Interior(u32),
}

/// Cell-local <-> world transform.
///
/// ```text
///    |       cell
///    |     +-----------+
///    |     |      @    |
///    |  i  |   j  |    |
///    |<--->|<---->|    |
///    |     +-----------+
///    |   k        |
///    |<---------->|          world
///    +-----------------------------
///    i = grid x * cell size, j = local x, k = world x = i + j
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoordinateConverter {
    offset: Vec3,
}

impl CoordinateConverter {
    pub fn for_cell(cell: CellId, cell_size: f32) -> Self {
        let offset = match cell {
            CellId::Exterior(grid) => Vec3::new(grid.x as f32 * cell_size, grid.y as f32 * cell_size, 0.0),
            CellId::Interior(_) => Vec3::ZERO,
        };
        Self { offset }
    }

    #[inline]
    pub fn to_local(&self, world: Vec3) -> Vec3 {
        world - self.offset
    }

    #[inline]
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        local + self.offset
    }
}

/// A loaded cell: its identity, local frame and optional pathgrid.
#[derive(Clone, Debug)]
pub struct Cell {
    pub id: CellId,
    pub pathgrid: Option<Pathgrid>,
    converter: CoordinateConverter,
}

impl Cell {
    pub fn new(id: CellId, cell_size: f32, pathgrid: Option<Pathgrid>) -> Self {
        Self {
            id,
            pathgrid,
            converter: CoordinateConverter::for_cell(id, cell_size),
        }
    }

    /// A cell without a pathgrid; agents in it always travel directly.
    pub fn bare(id: CellId, cell_size: f32) -> Self {
        Self::new(id, cell_size, None)
    }
}

impl GraphProvider for Cell {
    fn node_positions(&self) -> &[Vec3] {
        self.pathgrid.as_ref().map(Pathgrid::points).unwrap_or(&[])
    }

    fn converter(&self) -> CoordinateConverter {
        self.converter
    }

    fn is_point_connected(&self, from: usize, to: usize) -> bool {
        self.pathgrid
            .as_ref()
            .is_some_and(|grid| grid.is_connected(from, to))
    }

    fn shortest_node_sequence(&self, from: usize, to: usize) -> NodeSequence {
        match &self.pathgrid {
            Some(grid) => grid.shortest_node_sequence(from, to),
            None => NodeSequence::new(),
        }
    }
}

/// All loaded cells, keyed by identity.
#[derive(Default, Debug)]
pub struct CellRegistry {
    cells: FxHashMap<CellId, Cell>,
}

impl CellRegistry {
    pub fn insert(&mut self, cell: Cell) -> Option<Cell> {
        if let Some(grid) = &cell.pathgrid {
            debug!("Registering cell {:?} with {} pathgrid nodes", cell.id, grid.len());
        }
        self.cells.insert(cell.id, cell)
    }

    pub fn get(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(&id)
    }

    pub fn remove(&mut self, id: CellId) -> Option<Cell> {
        self.cells.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

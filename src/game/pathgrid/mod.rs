//! Per-cell waypoint graphs ("pathgrids") and the coordinate frames they live in.
//!
//! The navigation core only talks to [`GraphProvider`]; [`Cell`] is the
//! implementation used by the ECS layer and the tests.

mod astar;
mod cell;
mod graph;


// ============================================================================
// PUBLIC API
// ============================================================================

pub use cell::{Cell, CellId, CellRegistry, CoordinateConverter};
pub use graph::{NodeSequence, Pathgrid};

use bevy::prelude::*;

/// Read-only view of one cell's connectivity graph.
///
/// Node positions are in cell-local coordinates; [`GraphProvider::converter`]
/// maps them to world space.
pub trait GraphProvider {
    fn has_graph(&self) -> bool {
        !self.node_positions().is_empty()
    }

    /// Cell-local node positions, empty when the cell has no graph.
    fn node_positions(&self) -> &[Vec3];

    fn converter(&self) -> CoordinateConverter;

    /// Whether any walk along graph edges leads from `from` to `to`.
    fn is_point_connected(&self, from: usize, to: usize) -> bool;

    /// Shortest node sequence from `from` to `to`, both ends included.
    /// Empty when `from == to` or when no route exists.
    fn shortest_node_sequence(&self, from: usize, to: usize) -> NodeSequence;
}

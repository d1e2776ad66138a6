//! Waypoint paths and the visibility probe that guards straight-line shortcuts.

mod path;
mod terrain;
mod visibility;


// ============================================================================
// PUBLIC API
// ============================================================================

pub use path::Path;
pub use terrain::{OpenTerrain, Sink, Wall};
pub use visibility::{check_way_is_clear, RayCaster};

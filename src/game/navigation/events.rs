/// Commands and notifications exchanged with the navigation systems.

use bevy::prelude::*;

use super::doors::DoorId;

// ============================================================================
// Commands
// ============================================================================

/// Start (or redirect) an agent toward a destination.
#[derive(Event, Message, Debug, Clone)]
pub struct NavigateCommand {
    pub entity: Entity,
    pub destination: Vec3,
    pub tolerance: f32,
}

/// Stop an agent and drop its navigation state.
#[derive(Event, Message, Debug, Clone)]
pub struct StopCommand {
    pub entity: Entity,
}

/// Open a door on behalf of a stuck agent. Applied after integration.
#[derive(Event, Message, Debug, Clone)]
pub struct OpenDoorCommand {
    pub door: DoorId,
    pub requested_by: Entity,
}

// ============================================================================
// Notifications
// ============================================================================

/// Sent once when an agent arrives; sent again only after it set off anew.
#[derive(Event, Message, Debug, Clone)]
pub struct DestinationReached {
    pub entity: Entity,
    pub position: Vec3,
}

/// Fixed-tick systems driving navigation for every travelling agent.
///
/// Order within a tick (see `SimSet`):
/// 1. `process_nav_commands` - start, redirect and stop agents
/// 2. `advance_navigators` - one controller update per agent
/// 3. movement integration (simulation layer)
/// 4. `apply_door_commands` - doors opened by stuck agents

use bevy::prelude::*;
use rustc_hash::FxHashSet;
use crate::game::profiling::profile;

use crate::game::config::NavConfig;
use crate::game::pathgrid::{Cell, GraphProvider};
use crate::game::simulation::{Heading, InCell, NavAgent, NavTick, WorldPosition};
use crate::profile_log;

use super::agent::MovementIntent;
use super::components::{Destination, Navigator};
use super::controller::NavContext;
use super::doors::{DoorRegistry, DoorRequests};
use super::events::{DestinationReached, NavigateCommand, OpenDoorCommand, StopCommand};
use super::world::NavWorld;

// ============================================================================
// Command Processing
// ============================================================================

/// Apply stop commands first, then navigate commands.
///
/// A navigate command always starts a fresh trip, so a path left over from
/// the previous destination is never followed. To chase a moving target,
/// mutate the agent's [`Destination`] instead; the controller picks up the
/// change on its next re-evaluation.
pub fn process_nav_commands(
    mut commands: Commands,
    config: Res<NavConfig>,
    mut stop_events: MessageReader<StopCommand>,
    mut navigate_events: MessageReader<NavigateCommand>,
    mut agents: Query<(Option<&mut Navigator>, &mut MovementIntent), With<NavAgent>>,
) {
    // Removals are deferred, so a stopped agent still shows its old Navigator below.
    let mut stopped = FxHashSet::default();
    for event in stop_events.read() {
        let Ok((_, mut intent)) = agents.get_mut(event.entity) else {
            warn!("[NAV] Stop command for unknown agent {:?}", event.entity);
            continue;
        };
        intent.stop();
        commands.entity(event.entity).remove::<(Destination, Navigator)>();
        stopped.insert(event.entity);
    }

    for event in navigate_events.read() {
        let Ok((navigator, _)) = agents.get_mut(event.entity) else {
            warn!("[NAV] Navigate command for unknown agent {:?}", event.entity);
            continue;
        };

        let destination = Destination {
            point: event.destination,
            tolerance: event.tolerance,
        };

        match navigator.filter(|_| !stopped.contains(&event.entity)) {
            Some(mut navigator) => {
                navigator.controller.reset();
                navigator.obstacle.clear();
                navigator.arrived = false;
                commands.entity(event.entity).insert(destination);
            }
            None => {
                commands
                    .entity(event.entity)
                    .insert((destination, Navigator::new(&config)));
            }
        }

        debug!("[NAV] {:?} heading to {:?}", event.entity, event.destination);
    }
}

// ============================================================================
// Navigation
// ============================================================================

/// Run one controller update for every agent with a destination.
#[profile(2)]
pub fn advance_navigators(
    tick: Res<NavTick>,
    config: Res<NavConfig>,
    world: Res<NavWorld>,
    mut door_commands: MessageWriter<OpenDoorCommand>,
    mut reached_events: MessageWriter<DestinationReached>,
    mut query: Query<(
        Entity,
        &WorldPosition,
        &Heading,
        &NavAgent,
        &InCell,
        &Destination,
        &mut Navigator,
        &mut MovementIntent,
    )>,
) {
    let delta = config.tick_delta();

    for (entity, position, heading, agent, in_cell, destination, mut navigator, mut intent) in query.iter_mut() {
        // Unregistered cells have no pathgrid; agents there travel directly.
        let fallback;
        let cell: &dyn GraphProvider = match world.cells.get(in_cell.0) {
            Some(cell) => cell,
            None => {
                fallback = Cell::bare(in_cell.0, config.cell_size);
                &fallback
            }
        };

        let state = agent.state(position, heading);
        let mut doors = DoorRequests::new(&world.doors);
        let Navigator { controller, obstacle, arrived } = &mut *navigator;

        let now_arrived = {
            let mut ctx = NavContext {
                config: &config,
                cell,
                rays: world.rays.as_ref(),
                active_area: &world.active_area,
                doors: &mut doors,
                stuck: obstacle,
            };
            controller.advance(&state, destination.point, delta, destination.tolerance, &mut ctx, &mut intent)
        };

        if now_arrived && !*arrived {
            info!("[NAV] {:?} reached {:?}", entity, destination.point);
            reached_events.write(DestinationReached {
                entity,
                position: position.0,
            });
        }
        *arrived = now_arrived;

        for door in doors.into_requests() {
            door_commands.write(OpenDoorCommand {
                door,
                requested_by: entity,
            });
        }
    }

    profile_log!(tick, "[NAV] Agents navigating: {}", query.iter().len());
}

// ============================================================================
// World Updates
// ============================================================================

/// Finish doors opened last tick, then start opening the newly requested ones.
pub fn apply_door_commands(
    mut door_commands: MessageReader<OpenDoorCommand>,
    mut world: ResMut<NavWorld>,
) {
    let finished = world.doors.finish_opening();
    if finished > 0 {
        debug!("[DOORS] {} door(s) finished opening", finished);
    }

    for command in door_commands.read() {
        info!("[DOORS] {:?} opens door {:?}", command.requested_by, command.door);
        world.doors.open_door(command.door);
    }
}

use bevy::prelude::*;
use std::time::Duration;
use wayfarer::game::config::NavConfig;
use wayfarer::game::navigation::{
    Destination, DoorId, DoorInfo, DoorState, DestinationReached, MovementIntent, NavWorld, NavigateCommand,
    Navigator, StopCommand,
};
use wayfarer::game::pathfinding::OpenTerrain;
use wayfarer::game::pathgrid::{Cell, CellId, Pathgrid};
use wayfarer::game::simulation::{Heading, InCell, NavAgent, NavTick, SimSet, WorldPosition};
use wayfarer::game::WayfarerPlugin;

#[derive(Resource, Default)]
struct Arrivals(Vec<Entity>);

fn record_arrivals(mut events: MessageReader<DestinationReached>, mut arrivals: ResMut<Arrivals>) {
    for event in events.read() {
        arrivals.0.push(event.entity);
    }
}

fn setup_app(config: NavConfig) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.insert_resource(config);
    app.add_plugins(WayfarerPlugin);
    app.init_resource::<Arrivals>();
    app.add_systems(FixedUpdate, record_arrivals.after(SimSet::Navigation));

    // Run startup
    app.update();
    app
}

fn spawn_agent(app: &mut App, position: Vec3, cell: CellId) -> Entity {
    app.world_mut()
        .spawn((
            WorldPosition(position),
            Heading::default(),
            NavAgent::default(),
            InCell(cell),
            MovementIntent::default(),
        ))
        .id()
}

fn position_of(app: &App, entity: Entity) -> Vec3 {
    app.world().get::<WorldPosition>(entity).unwrap().0
}

fn arrived(app: &App, entity: Entity) -> bool {
    app.world().get::<Navigator>(entity).is_some_and(|navigator| navigator.arrived)
}

/// Step until `entity` arrives, calling `observe` after every tick.
fn run_until_arrived(app: &mut App, entity: Entity, max_ticks: usize, mut observe: impl FnMut(&App)) -> usize {
    for tick in 0..max_ticks {
        app.world_mut().run_schedule(FixedUpdate);
        observe(app);
        if arrived(app, entity) {
            return tick + 1;
        }
    }
    panic!("agent did not arrive within {} ticks, at {:?}", max_ticks, position_of(app, entity));
}

#[test]
fn test_agent_walks_straight_without_pathgrid() {
    let mut app = setup_app(NavConfig::default());
    // Interior cell 7 is never registered, so there is no pathgrid.
    let agent = spawn_agent(&mut app, Vec3::ZERO, CellId::Interior(7));
    let dest = Vec3::new(500.0, 0.0, 0.0);

    app.world_mut().write_message(NavigateCommand { entity: agent, destination: dest, tolerance: 32.0 });

    let mut max_drift: f32 = 0.0;
    let ticks = run_until_arrived(&mut app, agent, 400, |app| {
        max_drift = max_drift.max(position_of(app, agent).y.abs());
    });
    println!("Arrived after {} ticks", ticks);

    // 5 units per tick at speed 100 and 20 Hz.
    assert!(ticks < 110, "took {} ticks", ticks);
    assert!(max_drift < 1.0, "drifted {} off the straight line", max_drift);

    let pos = position_of(&app, agent);
    assert!(pos.distance(dest) <= 32.0 + 5.0, "stopped at {:?}", pos);
    assert!(!app.world().get::<MovementIntent>(agent).unwrap().is_moving());

    // Arrival is reported once, even though the agent keeps "arriving".
    for _ in 0..10 {
        app.world_mut().run_schedule(FixedUpdate);
    }
    assert_eq!(app.world().resource::<Arrivals>().0, vec![agent]);
    assert_eq!(position_of(&app, agent), pos);
}

#[test]
fn test_agent_follows_pathgrid_around_wall() {
    let mut app = setup_app(NavConfig::default());

    //   1 -------- 2
    //   |    |     |
    //   0    |     3
    //  @     |      D
    //        | wall
    let cell_id = CellId::Exterior(IVec2::ZERO);
    let grid = Pathgrid::new(
        vec![
            Vec3::new(600.0, 0.0, 0.0),
            Vec3::new(600.0, 800.0, 0.0),
            Vec3::new(1400.0, 800.0, 0.0),
            Vec3::new(1400.0, 0.0, 0.0),
        ],
        &[(0, 1), (1, 2), (2, 3)],
    );
    let cell_size = app.world().resource::<NavConfig>().cell_size;
    let mut world = NavWorld::default()
        .with_rays(OpenTerrain::flat(0.0).with_wall(Vec2::new(1000.0, -600.0), Vec2::new(1000.0, 600.0)));
    world.cells.insert(Cell::new(cell_id, cell_size, Some(grid)));
    app.insert_resource(world);

    let agent = spawn_agent(&mut app, Vec3::new(500.0, 0.0, 0.0), cell_id);
    let dest = Vec3::new(1500.0, 0.0, 0.0);
    app.world_mut().write_message(NavigateCommand { entity: agent, destination: dest, tolerance: 32.0 });

    let mut max_y: f32 = 0.0;
    let ticks = run_until_arrived(&mut app, agent, 1000, |app| {
        max_y = max_y.max(position_of(app, agent).y);
    });
    println!("Detour took {} ticks, max y {}", ticks, max_y);

    assert!(max_y > 700.0, "agent never went around the wall (max y {})", max_y);
    assert!(position_of(&app, agent).distance(dest) <= 40.0);
}

#[test]
fn test_stop_command_halts_agent() {
    let mut app = setup_app(NavConfig::default());
    let agent = spawn_agent(&mut app, Vec3::ZERO, CellId::Interior(0));

    app.world_mut().write_message(NavigateCommand {
        entity: agent,
        destination: Vec3::new(0.0, 1000.0, 0.0),
        tolerance: 32.0,
    });
    for _ in 0..10 {
        app.world_mut().run_schedule(FixedUpdate);
    }
    let moved = position_of(&app, agent);
    assert!(moved.y > 10.0);

    app.world_mut().write_message(StopCommand { entity: agent });
    app.world_mut().run_schedule(FixedUpdate);
    let stopped = position_of(&app, agent);

    for _ in 0..10 {
        app.world_mut().run_schedule(FixedUpdate);
    }
    assert_eq!(position_of(&app, agent), stopped);
    assert!(app.world().get::<Navigator>(agent).is_none());
    assert!(!app.world().get::<MovementIntent>(agent).unwrap().is_moving());
}

#[test]
fn test_stop_then_navigate_in_one_tick_starts_new_trip() {
    let mut app = setup_app(NavConfig::default());
    let agent = spawn_agent(&mut app, Vec3::ZERO, CellId::Interior(0));

    app.world_mut().write_message(NavigateCommand {
        entity: agent,
        destination: Vec3::new(0.0, 1000.0, 0.0),
        tolerance: 32.0,
    });
    for _ in 0..5 {
        app.world_mut().run_schedule(FixedUpdate);
    }
    let before = position_of(&app, agent);

    let second = Vec3::new(300.0, before.y, 0.0);
    app.world_mut().write_message(StopCommand { entity: agent });
    app.world_mut().write_message(NavigateCommand { entity: agent, destination: second, tolerance: 32.0 });
    app.world_mut().run_schedule(FixedUpdate);

    assert!(app.world().get::<Destination>(agent).is_some());
    assert!(app.world().get::<Navigator>(agent).is_some(), "navigator lost after stop + navigate");

    run_until_arrived(&mut app, agent, 200, |_| {});
    assert!(position_of(&app, agent).distance(second) <= 40.0);
}

#[test]
fn test_redirect_keeps_navigating() {
    let mut app = setup_app(NavConfig::default());
    let agent = spawn_agent(&mut app, Vec3::ZERO, CellId::Interior(0));

    app.world_mut().write_message(NavigateCommand {
        entity: agent,
        destination: Vec3::new(100.0, 0.0, 0.0),
        tolerance: 32.0,
    });
    run_until_arrived(&mut app, agent, 200, |_| {});

    let second = Vec3::new(100.0, 300.0, 0.0);
    app.world_mut().write_message(NavigateCommand { entity: agent, destination: second, tolerance: 32.0 });
    app.world_mut().run_schedule(FixedUpdate);
    assert!(!arrived(&app, agent));

    run_until_arrived(&mut app, agent, 200, |_| {});
    assert!(position_of(&app, agent).distance(second) <= 40.0);
    assert_eq!(app.world().resource::<Arrivals>().0.len(), 2);
}

#[test]
fn test_destination_edits_are_followed() {
    let mut app = setup_app(NavConfig::default());
    let agent = spawn_agent(&mut app, Vec3::ZERO, CellId::Interior(0));

    app.world_mut().write_message(NavigateCommand {
        entity: agent,
        destination: Vec3::new(0.0, 1000.0, 0.0),
        tolerance: 32.0,
    });
    for _ in 0..10 {
        app.world_mut().run_schedule(FixedUpdate);
    }

    // The target walked off to the east.
    let moved = Vec3::new(300.0, 50.0, 0.0);
    app.world_mut().get_mut::<Destination>(agent).unwrap().point = moved;

    run_until_arrived(&mut app, agent, 400, |_| {});
    assert!(position_of(&app, agent).distance(moved) <= 40.0);
}

#[test]
fn test_stuck_agent_opens_door_ahead() {
    let mut app = setup_app(NavConfig::default());
    app.world_mut().resource_mut::<NavWorld>().doors.add(DoorInfo {
        id: DoorId(4),
        position: Vec3::new(0.0, 60.0, 0.0),
        teleport: false,
        trapped: false,
        lock_level: 0,
        state: DoorState::Closed,
    });

    // Something keeps shoving the agent back to where it started.
    let start = Vec3::ZERO;
    app.add_systems(
        FixedUpdate,
        (move |mut query: Query<&mut WorldPosition>| {
            for mut pos in query.iter_mut() {
                pos.0 = start;
            }
        })
        .after(SimSet::Integration)
        .before(SimSet::World),
    );

    let agent = spawn_agent(&mut app, start, CellId::Interior(0));
    app.world_mut().write_message(NavigateCommand {
        entity: agent,
        destination: Vec3::new(0.0, 1000.0, 0.0),
        tolerance: 32.0,
    });

    let door_state = |app: &App| app.world().resource::<NavWorld>().doors.get(DoorId(4)).map(|door| door.state);

    let mut opened_at = None;
    for tick in 0..60 {
        app.world_mut().run_schedule(FixedUpdate);
        if door_state(&app) != Some(DoorState::Closed) {
            opened_at = Some(tick);
            break;
        }
    }

    let tick = opened_at.expect("door was never opened");
    println!("Door requested on tick {}", tick);
    // At least a second of no progress first.
    assert!(tick >= 20);
    assert_eq!(door_state(&app), Some(DoorState::Opening));

    app.world_mut().run_schedule(FixedUpdate);
    assert_eq!(door_state(&app), Some(DoorState::Open));
}

#[test]
fn test_tick_rate_follows_config() {
    let app = setup_app(NavConfig { tick_rate: 40.0, ..Default::default() });
    let timestep = app.world().resource::<Time<Fixed>>().timestep();
    assert!((timestep.as_secs_f64() - 0.025).abs() < 1e-6, "{:?}", timestep);
    assert!(timestep < Duration::from_millis(50));
}

#[test]
fn test_tick_counter_advances() {
    let mut app = setup_app(NavConfig::default());
    let before = app.world().resource::<NavTick>().0;
    for _ in 0..5 {
        app.world_mut().run_schedule(FixedUpdate);
    }
    assert_eq!(app.world().resource::<NavTick>().0, before + 5);
}

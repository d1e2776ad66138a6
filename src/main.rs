use bevy::prelude::*;
use rand::Rng;

use wayfarer::game::config::NavConfig;
use wayfarer::game::navigation::{DestinationReached, MovementIntent, NavWorld, NavigateCommand};
use wayfarer::game::pathfinding::OpenTerrain;
use wayfarer::game::pathgrid::{Cell, CellId, Pathgrid};
use wayfarer::game::simulation::{Heading, InCell, NavAgent, NavTick, SimSet, WorldPosition};
use wayfarer::game::WayfarerPlugin;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use std::fs;
use std::path::{Path, PathBuf};

const AGENT_COUNT: usize = 12;
const MAX_TICKS: usize = 4000;

fn setup_file_logging() -> std::io::Result<String> {
    let log_dir = PathBuf::from("logs");
    fs::create_dir_all(&log_dir)?;

    // Clean up old log files, keeping only the last 25
    cleanup_old_logs(&log_dir, 25);

    let now = chrono::Local::now();
    let log_filename = format!("wayfarer_{}.log", now.format("%Y%m%d_%H%M%S"));
    let log_path_str = log_dir.join(&log_filename).to_string_lossy().to_string();

    let file_appender = RollingFileAppender::new(Rotation::NEVER, &log_dir, &log_filename);

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false);

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("bevy_ecs=info,wayfarer=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    Ok(log_path_str)
}

fn cleanup_old_logs(log_dir: &Path, keep_count: usize) {
    let Ok(entries) = fs::read_dir(log_dir) else {
        return;
    };

    let mut log_files: Vec<_> = entries
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.path()
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|s| s.starts_with("wayfarer") && s.ends_with(".log"))
        })
        .collect();

    // Oldest first
    log_files.sort_by_key(|e| e.metadata().ok().and_then(|m| m.modified().ok()));

    if log_files.len() > keep_count {
        for file in log_files.iter().take(log_files.len() - keep_count) {
            let _ = fs::remove_file(file.path());
        }
    }
}

// ============================================================================
// Demo Scenario
// ============================================================================

#[derive(Resource, Default)]
struct DemoProgress {
    agents: usize,
    arrived: usize,
}

/// A wall splits the cell in two; the pathgrid leads around its north end.
///
/// ```text
///   y=3400        o---o---o
///                 |   |   |
///   y=3000        o   |   o
///                 |  wall |
///   y=0           o   |   o
///               x=1800   x=2200
/// ```
fn demo_cell(cell_size: f32) -> Cell {
    let mut points = Vec::new();
    let mut edges = Vec::new();

    // West column going north
    for step in 0..7 {
        points.push(Vec3::new(1800.0, step as f32 * 500.0, 0.0));
    }
    points.push(Vec3::new(1800.0, 3400.0, 0.0));
    points.push(Vec3::new(2000.0, 3400.0, 0.0));
    points.push(Vec3::new(2200.0, 3400.0, 0.0));
    // East column going south
    for step in (0..7).rev() {
        points.push(Vec3::new(2200.0, step as f32 * 500.0, 0.0));
    }

    for index in 1..points.len() {
        edges.push((index - 1, index));
    }

    Cell::new(CellId::Exterior(IVec2::ZERO), cell_size, Some(Pathgrid::new(points, &edges)))
}

fn setup_demo(
    mut commands: Commands,
    config: Res<NavConfig>,
    mut world: ResMut<NavWorld>,
    mut progress: ResMut<DemoProgress>,
    mut navigate: MessageWriter<NavigateCommand>,
) {
    let mut demo_world = NavWorld::default().with_rays(
        OpenTerrain::flat(0.0)
            .with_wall(Vec2::new(2000.0, -200.0), Vec2::new(2000.0, 3200.0))
            .with_sink(Vec2::new(600.0, 2800.0), Vec2::new(1400.0, 3600.0), -400.0),
    );
    demo_world.cells.insert(demo_cell(config.cell_size));
    *world = demo_world;

    let mut rng = rand::rng();
    for index in 0..AGENT_COUNT {
        let start = Vec3::new(rng.random_range(200.0..1600.0), rng.random_range(300.0..2500.0), 0.0);
        let destination = Vec3::new(rng.random_range(2400.0..3800.0), rng.random_range(300.0..2500.0), 0.0);

        let agent = NavAgent {
            speed: rng.random_range(80.0..160.0),
            flying: index == 0,
            ..default()
        };

        let entity = commands
            .spawn((
                WorldPosition(start),
                Heading::default(),
                agent,
                InCell(CellId::Exterior(IVec2::ZERO)),
                MovementIntent::default(),
            ))
            .id();

        navigate.write(NavigateCommand {
            entity,
            destination,
            tolerance: 50.0,
        });
        info!("Agent {:?} ({}) {:?} -> {:?}", entity, if agent.flying { "flying" } else { "walking" }, start, destination);
    }

    progress.agents = AGENT_COUNT;
}

fn log_arrivals(
    tick: Res<NavTick>,
    mut events: MessageReader<DestinationReached>,
    mut progress: ResMut<DemoProgress>,
) {
    for event in events.read() {
        progress.arrived += 1;
        info!(
            "[DEMO] Tick {}: {:?} arrived at {:?} ({}/{})",
            tick.0, event.entity, event.position, progress.arrived, progress.agents
        );
    }
}

fn main() {
    let log_file = match setup_file_logging() {
        Ok(path) => path,
        Err(e) => {
            eprintln!("Failed to set up file logging: {}", e);
            return;
        }
    };

    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║  Wayfarer navigation demo - Logging to file              ║");
    println!("╠══════════════════════════════════════════════════════════╣");
    println!("║  Log file: {:<45} ║", log_file);
    println!("╚══════════════════════════════════════════════════════════╝");

    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_plugins(WayfarerPlugin)
        .init_resource::<DemoProgress>()
        .add_systems(PostStartup, setup_demo)
        .add_systems(FixedUpdate, log_arrivals.after(SimSet::Navigation));

    // Startup only; ticks are driven manually below so the run is not tied to wall time.
    app.update();

    let mut ticks = 0;
    while ticks < MAX_TICKS {
        app.world_mut().run_schedule(FixedUpdate);
        ticks += 1;

        let progress = app.world().resource::<DemoProgress>();
        if progress.arrived >= progress.agents {
            break;
        }
    }

    let progress = app.world().resource::<DemoProgress>();
    if progress.arrived < progress.agents {
        warn!("[DEMO] {} of {} agents still travelling after {} ticks", progress.agents - progress.arrived, progress.agents, ticks);
    } else {
        info!("[DEMO] All {} agents arrived after {} ticks", progress.agents, ticks);
    }
}

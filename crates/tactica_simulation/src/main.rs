//! Headless skirmish TACTICA
//!
//! Две стороны по два отряда + несколько одиночек на арене с препятствиями.
//! Tuning можно переопределить JSON файлом из переменной `TACTICA_CONFIG`.

use bevy::prelude::*;
use tactica_simulation::{
    init_simulation_world, logger, spawn_squad, spawn_unit, state_name, step_world, Agent,
    AgentRegistry, Casualties, Faction, Health, NavGrid, Obstacle, Obstacles, Squad,
    TacticsConfig,
};

const SEED: u64 = 42;
const TICK: f32 = 1.0 / 60.0;
const DURATION_SECS: u32 = 120;
const NODE_RADIUS: f32 = 0.5;

fn load_config() -> TacticsConfig {
    let Ok(path) = std::env::var("TACTICA_CONFIG") else {
        return TacticsConfig::default();
    };

    let parsed = std::fs::read_to_string(&path)
        .map_err(|err| err.to_string())
        .and_then(|json| TacticsConfig::from_json_str(&json).map_err(|err| err.to_string()));

    match parsed {
        Ok(config) => {
            logger::log_info(&format!("Tactics config loaded from {}", path));
            config
        }
        Err(err) => {
            logger::log_error(&format!("Config {} ignored: {}", path, err));
            TacticsConfig::default()
        }
    }
}

fn arena_obstacles() -> Obstacles {
    Obstacles::new(vec![
        Obstacle::pillar(0.0, 0.0, 2.0),
        Obstacle::pillar(-6.0, 10.0, 1.5),
        Obstacle::pillar(6.0, -10.0, 1.5),
        Obstacle::block(-2.0, 12.0, 2.0, 16.0),
        Obstacle::block(-2.0, -16.0, 2.0, -12.0),
    ])
}

fn alive_count(world: &World, faction: Faction) -> usize {
    world
        .resource::<AgentRegistry>()
        .iter()
        .filter(|&agent| {
            world.get::<Agent>(agent).is_some_and(|a| a.faction == faction)
                && world.get::<Health>(agent).is_some_and(Health::is_alive)
        })
        .count()
}

fn report(world: &mut World, second: u32) {
    let squads = world.query::<&Squad>().iter(world).count();
    logger::log_info(&format!(
        "t={}s: TeamA {} alive, TeamB {} alive, {} squads",
        second,
        alive_count(world, Faction::TeamA),
        alive_count(world, Faction::TeamB),
        squads
    ));

    for agent in world.resource::<AgentRegistry>().snapshot() {
        logger::log(&format!("  {:?} → {}", agent, state_name(world, agent)));
    }
}

fn main() {
    logger::init_logger();
    logger::set_log_level(logger::LogLevel::Info);

    let config = load_config();
    let mut world = World::new();
    init_simulation_world(&mut world, SEED);
    world.insert_resource(config);

    let obstacles = arena_obstacles();
    let extent = Vec2::splat(config.arena_half_extent * 2.0);
    match NavGrid::build(Vec3::ZERO, extent, NODE_RADIUS, &obstacles) {
        Ok(grid) => {
            let (width, height) = grid.dimensions();
            logger::log_info(&format!("NavGrid {}x{} built", width, height));
            world.insert_resource(grid);
        }
        Err(err) => logger::log_error(&format!("NavGrid disabled: {}", err)),
    }
    world.insert_resource(obstacles);

    logger::log_info(&format!("Starting TACTICA headless skirmish (seed: {})", SEED));

    spawn_squad(&mut world, Faction::TeamA, Vec3::new(-16.0, 0.0, -6.0), 4);
    spawn_squad(&mut world, Faction::TeamA, Vec3::new(-16.0, 0.0, 8.0), 3);
    spawn_squad(&mut world, Faction::TeamB, Vec3::new(16.0, 0.0, 6.0), 4);
    spawn_squad(&mut world, Faction::TeamB, Vec3::new(16.0, 0.0, -8.0), 3);
    spawn_unit(&mut world, Faction::TeamA, Vec3::new(-8.0, 0.0, -18.0));
    spawn_unit(&mut world, Faction::TeamB, Vec3::new(8.0, 0.0, 18.0));

    let ticks_per_second = (1.0 / TICK).round() as u32;
    for tick in 0..DURATION_SECS * ticks_per_second {
        step_world(&mut world, TICK);

        if tick % (ticks_per_second * 10) == 0 {
            report(&mut world, tick / ticks_per_second);
        }

        let a = alive_count(&world, Faction::TeamA);
        let b = alive_count(&world, Faction::TeamB);
        if a == 0 || b == 0 {
            logger::log_info(&format!("Skirmish decided at t={:.1}s", tick as f32 * TICK));
            break;
        }
    }

    let casualties = world.resource::<Casualties>();
    logger::log_info(&format!(
        "Simulation complete! Losses: TeamA {}, TeamB {}",
        casualties.count(Faction::TeamA),
        casualties.count(Faction::TeamB)
    ));
}

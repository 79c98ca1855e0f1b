//! TACTICA Simulation Core
//!
//! Тактический AI отрядов на Bevy 0.16 (headless ECS):
//! - FSM на агента (лидер: Command/Attack/Flee/Heal/Fortify/Recruit,
//!   юнит: Follow/Attack/Flee/Recruit/Roam)
//! - координация отряда (shared target, доклады о контакте, фортификация)
//! - steering (seek, obstacle avoidance, flocking) поверх A* grid pathfinder'а
//!
//! Один simulation tick = exclusive system `simulation_tick`: cooldown'ы →
//! housekeeping отрядов → FSM update каждого агента в порядке регистрации.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod ai;
pub mod combat;
pub mod components;
pub mod config;
pub mod logger;
pub mod navigation;
pub mod shared;
pub mod spawn;
pub mod squad;
pub mod steering;

// Re-export базовых типов для удобства
pub use ai::{leader_brain, state_name, unit_brain, Brain, StateId};
pub use combat::{Casualties, CombatPlugin};
pub use components::*;
pub use config::{ConfigError, TacticsConfig};
pub use logger::log;
pub use navigation::{NavGrid, NavGridError};
pub use shared::{AgentRegistry, Obstacle, Obstacles, SimClock};
pub use spawn::{spawn_agent, spawn_leader, spawn_squad, spawn_unit};
pub use squad::{Squad, SquadError};

/// Fixed timestep симуляции
pub const SIMULATION_HZ: f64 = 60.0;

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 60Hz для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(SIMULATION_HZ))
            .init_resource::<SimClock>()
            .init_resource::<AgentRegistry>()
            .init_resource::<Obstacles>()
            .init_resource::<TacticsConfig>()
            .init_resource::<DeterministicRng>()
            .add_plugins(CombatPlugin)
            .add_systems(
                FixedUpdate,
                (shared::sync_sim_clock, simulation_tick).chain(),
            );
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Exclusive system: один тактический тик (время уже продвинуто в SimClock)
pub fn simulation_tick(world: &mut World) {
    let delta = world.get_resource::<SimClock>().map_or(0.0, |c| c.delta);

    combat::tick_attack_cooldowns(world, delta);
    squad::cleanup_all_squads(world);
    ai::run_tactical_ai(world);
}

/// Ресурсы симуляции в голом World (без App)
pub fn init_simulation_world(world: &mut World, seed: u64) {
    world.init_resource::<SimClock>();
    world.init_resource::<AgentRegistry>();
    world.init_resource::<Obstacles>();
    world.init_resource::<TacticsConfig>();
    world.init_resource::<Casualties>();
    world.insert_resource(DeterministicRng::new(seed));
}

/// Headless шаг: продвигает SimClock на `delta` и выполняет тик
pub fn step_world(world: &mut World, delta: f32) {
    world.get_resource_or_init::<SimClock>().advance(delta);
    simulation_tick(world);
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    logger::init_logger();
    app.add_plugins(MinimalPlugins)
        .add_plugins(SimulationPlugin)
        .insert_resource(DeterministicRng::new(seed));

    app
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}

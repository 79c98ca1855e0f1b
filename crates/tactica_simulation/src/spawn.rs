//! Spawn helpers
//!
//! Агент = entity с `Agent` (+ required components), статами из
//! `TacticsConfig.agent`, записью в AgentRegistry и запущенным FSM.
//! Leader-type всегда получает собственный отряд.

use bevy::prelude::*;

use crate::ai::{fsm, leader_brain, unit_brain, Brain, StateId};
use crate::components::{Agent, Attacker, Faction, Healer, Health, UnitType, Vision};
use crate::config::TacticsConfig;
use crate::logger;
use crate::shared::AgentRegistry;
use crate::squad;

/// Спавн агента без FSM. Смотрит в центр арены.
pub fn spawn_agent(world: &mut World, faction: Faction, unit_type: UnitType, position: Vec3) -> Entity {
    let profile = world
        .get_resource::<TacticsConfig>()
        .copied()
        .unwrap_or_default()
        .agent;

    let vision_range = match unit_type {
        UnitType::Leader => profile.vision_range * profile.leader_vision_multiplier,
        UnitType::Base => profile.vision_range,
    };

    let position = Vec3::new(position.x, 0.0, position.z);
    let mut transform = Transform::from_translation(position);
    if position.length() > f32::EPSILON {
        transform = transform.looking_to(-position.normalize(), Vec3::Y);
    }

    let mut entity = world.spawn((
        Agent::new(faction, unit_type),
        Health::new(profile.max_health),
        Attacker::from_profile(&profile),
        Vision {
            range: vision_range,
            angle: profile.vision_angle,
        },
        transform,
    ));
    // Лечат только лидеры
    if unit_type == UnitType::Leader {
        entity.insert(Healer::from_profile(&profile));
    }
    let agent = entity.id();

    world.get_resource_or_init::<AgentRegistry>().register(agent);
    agent
}

/// Лидер: собственный отряд + 6 состояний, старт в LeaderCommand
pub fn spawn_leader(world: &mut World, faction: Faction, position: Vec3) -> Entity {
    let leader = spawn_agent(world, faction, UnitType::Leader, position);
    squad::create_squad(world, leader);
    world.entity_mut(leader).insert(Brain::new(leader_brain()));
    fsm::start(world, leader, StateId::LeaderCommand);
    leader
}

/// Одиночный юнит: 5 состояний, старт в UnitFollow (Independent сразу уйдёт в Roam)
pub fn spawn_unit(world: &mut World, faction: Faction, position: Vec3) -> Entity {
    let unit = spawn_agent(world, faction, UnitType::Base, position);
    world.entity_mut(unit).insert(Brain::new(unit_brain()));
    fsm::start(world, unit, StateId::UnitFollow);
    unit
}

/// Отряд из `size` агентов: лидер в центре, члены на слотах формации.
/// Возвращает entity отряда.
pub fn spawn_squad(world: &mut World, faction: Faction, center: Vec3, size: usize) -> Option<Entity> {
    if size == 0 {
        return None;
    }

    let leader = spawn_agent(world, faction, UnitType::Leader, center);
    let squad_entity = squad::create_squad(world, leader);

    let mut members = Vec::new();
    for index in 0..size.saturating_sub(1) {
        let offset = world
            .get::<squad::Squad>(squad_entity)
            .map_or(Vec3::ZERO, |state| state.formation_offset(index));
        let member = spawn_agent(world, faction, UnitType::Base, center + offset);

        if let Err(err) = squad::try_add_member(world, squad_entity, member) {
            logger::log_warning(&format!(
                "Squad {:?}: member {:?} left independent: {}",
                squad_entity, member, err
            ));
        }
        members.push(member);
    }

    // FSM запускаем после сборки состава: Follow проверяет роль на первом тике
    world.entity_mut(leader).insert(Brain::new(leader_brain()));
    fsm::start(world, leader, StateId::LeaderCommand);
    for member in members {
        world.entity_mut(member).insert(Brain::new(unit_brain()));
        fsm::start(world, member, StateId::UnitFollow);
    }

    logger::log_info(&format!(
        "{:?} squad {:?} spawned at {:?} ({} agents)",
        faction, squad_entity, center, size
    ));
    Some(squad_entity)
}

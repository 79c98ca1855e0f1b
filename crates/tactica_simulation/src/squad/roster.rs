//! Состав отряда: создание, лидер, члены, преемственность, статистика
//!
//! Инвариант: SquadLink агента и списки Squad меняются только здесь и всегда вместе.

use bevy::prelude::*;
use thiserror::Error;

use super::components::Squad;
use crate::components::{Health, SquadLink, SquadRole};
use crate::config::TacticsConfig;
use crate::logger;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SquadError {
    #[error("squad {0:?} does not exist")]
    Missing(Entity),
    #[error("squad is full")]
    Full,
    #[error("unit {0:?} is already in the squad")]
    AlreadyMember(Entity),
    #[error("unit {0:?} leads the squad")]
    IsLeader(Entity),
    #[error("unit {0:?} belongs to another squad")]
    NotIndependent(Entity),
}

/// Создаёт отряд с `leader` во главе (настройки из TacticsConfig)
pub fn create_squad(world: &mut World, leader: Entity) -> Entity {
    let settings = world
        .get_resource::<TacticsConfig>()
        .map(|config| config.squad)
        .unwrap_or_default();

    let squad = world.spawn(Squad::new(&settings)).id();
    set_leader(world, squad, leader);
    logger::log_info(&format!("Squad {:?} formed, leader {:?}", squad, leader));
    squad
}

/// Назначает лидера. Прежний лидер становится Independent.
pub fn set_leader(world: &mut World, squad: Entity, unit: Entity) {
    // Юнит из чужого отряда сначала отцепляем
    if squad_of(world, unit).is_some_and(|current| current != squad) {
        detach(world, unit);
    }

    let Some(mut state) = world.get_mut::<Squad>(squad) else {
        return;
    };
    state.members.retain(|&m| m != unit);
    let previous = state.leader.replace(unit);

    if let Some(previous) = previous.filter(|&p| p != unit) {
        set_link(world, previous, SquadLink::independent());
    }
    set_link(
        world,
        unit,
        SquadLink {
            squad: Some(squad),
            role: SquadRole::Leader,
        },
    );
}

/// Добавляет Independent агента в отряд
pub fn try_add_member(world: &mut World, squad: Entity, unit: Entity) -> Result<(), SquadError> {
    let link = world.get::<SquadLink>(unit).copied().unwrap_or_default();
    let state = world.get::<Squad>(squad).ok_or(SquadError::Missing(squad))?;

    if state.leader == Some(unit) {
        return Err(SquadError::IsLeader(unit));
    }
    if state.members.contains(&unit) {
        return Err(SquadError::AlreadyMember(unit));
    }
    if state.is_full() {
        return Err(SquadError::Full);
    }
    if !link.is_independent() {
        return Err(SquadError::NotIndependent(unit));
    }

    if let Some(mut state) = world.get_mut::<Squad>(squad) {
        state.members.push(unit);
    }
    set_link(
        world,
        unit,
        SquadLink {
            squad: Some(squad),
            role: SquadRole::Member,
        },
    );
    logger::log(&format!("Unit {:?} joined squad {:?}", unit, squad));
    Ok(())
}

/// Убирает члена (не лидера). Опустевший отряд распускается.
pub fn remove_member(world: &mut World, squad: Entity, unit: Entity) {
    let removed = world.get_mut::<Squad>(squad).is_some_and(|mut state| {
        let before = state.members.len();
        state.members.retain(|&m| m != unit);
        state.members.len() != before
    });

    if removed {
        set_link(world, unit, SquadLink::independent());
        disband_if_empty(world, squad);
    }
}

/// Снимает лидера; первый член (если есть) становится новым лидером
pub fn remove_leader(world: &mut World, squad: Entity) {
    let Some(mut state) = world.get_mut::<Squad>(squad) else {
        return;
    };
    let Some(old_leader) = state.leader.take() else {
        return;
    };
    // Стойка принадлежит лидеру: преемник начинает без неё
    state.fortified = false;
    let successor = (!state.members.is_empty()).then(|| state.members.remove(0));

    set_link(world, old_leader, SquadLink::independent());

    match successor {
        Some(successor) => {
            if let Some(mut state) = world.get_mut::<Squad>(squad) {
                state.leader = Some(successor);
            }
            set_link(
                world,
                successor,
                SquadLink {
                    squad: Some(squad),
                    role: SquadRole::Leader,
                },
            );
            logger::log_info(&format!(
                "Squad {:?}: leadership passed {:?} → {:?}",
                squad, old_leader, successor
            ));
        }
        None => {
            disband_if_empty(world, squad);
        }
    }
}

/// Отцепляет агента от его отряда (лидер → преемственность). Агент становится Independent.
pub fn detach(world: &mut World, unit: Entity) {
    let link = world.get::<SquadLink>(unit).copied().unwrap_or_default();
    let Some(squad) = link.squad else {
        set_link(world, unit, SquadLink::independent());
        return;
    };

    let is_leader = world
        .get::<Squad>(squad)
        .is_some_and(|state| state.leader == Some(unit));

    if is_leader {
        remove_leader(world, squad);
    } else {
        remove_member(world, squad, unit);
    }
    set_link(world, unit, SquadLink::independent());
}

/// Отряд агента, если entity отряда ещё существует
pub fn squad_of(world: &World, unit: Entity) -> Option<Entity> {
    world
        .get::<SquadLink>(unit)
        .and_then(|link| link.squad)
        .filter(|&squad| world.get::<Squad>(squad).is_some())
}

/// Отряд без единого агента уничтожается. Возвращает true если распущен.
pub fn disband_if_empty(world: &mut World, squad: Entity) -> bool {
    let empty = world.get::<Squad>(squad).is_some_and(|state| state.size() == 0);
    if empty {
        world.despawn(squad);
        logger::log(&format!("Squad {:?} disbanded", squad));
    }
    empty
}

pub fn set_fortified(world: &mut World, squad: Entity, fortified: bool) {
    if let Some(mut state) = world.get_mut::<Squad>(squad) {
        state.fortified = fortified;
    }
}

fn health(world: &World, unit: Entity) -> Option<Health> {
    world.get::<Health>(unit).copied().filter(|h| h.is_alive())
}

/// Средний процент здоровья живых (лидер + члены); 0 если живых нет
pub fn average_health(world: &World, squad: Entity) -> f32 {
    let Some(state) = world.get::<Squad>(squad) else {
        return 0.0;
    };

    let (total, count) = state
        .roster()
        .filter_map(|unit| health(world, unit))
        .fold((0.0, 0usize), |(total, count), h| (total + h.percentage(), count + 1));

    if count == 0 {
        0.0
    } else {
        total / count as f32
    }
}

/// Живые лидер + члены
pub fn alive_count(world: &World, squad: Entity) -> usize {
    world.get::<Squad>(squad).map_or(0, |state| {
        state
            .roster()
            .filter(|&unit| health(world, unit).is_some())
            .count()
    })
}

/// Живые агенты отряда кроме `except`
pub fn other_alive_count(world: &World, squad: Entity, except: Entity) -> usize {
    world.get::<Squad>(squad).map_or(0, |state| {
        state
            .roster()
            .filter(|&unit| unit != except && health(world, unit).is_some())
            .count()
    })
}

/// Живые (лидер + члены) с health ≤ threshold
pub fn low_health_members(world: &World, squad: Entity, threshold: f32) -> Vec<Entity> {
    world.get::<Squad>(squad).map_or_else(Vec::new, |state| {
        state
            .roster()
            .filter(|&unit| health(world, unit).is_some_and(|h| h.percentage() <= threshold))
            .collect()
    })
}

/// Слот формации: позиция лидера + смещение по индексу члена.
/// Не член / нет лидера → собственная позиция юнита.
pub fn formation_position(world: &World, squad: Entity, unit: Entity) -> Vec3 {
    let own = world
        .get::<Transform>(unit)
        .map_or(Vec3::ZERO, |t| t.translation);

    let Some(state) = world.get::<Squad>(squad) else {
        return own;
    };
    let Some(leader_position) = state
        .leader
        .and_then(|leader| world.get::<Transform>(leader))
        .map(|t| t.translation)
    else {
        return own;
    };

    match state.member_index(unit) {
        Some(index) => leader_position + state.formation_offset(index),
        None => own,
    }
}

/// Housekeeping: мёртвый лидер → преемник, мёртвые члены удаляются, пустой отряд распускается
pub fn cleanup_squad(world: &mut World, squad: Entity) {
    let Some(state) = world.get::<Squad>(squad) else {
        return;
    };

    let leader_dead = state.leader.is_some_and(|l| health(world, l).is_none());
    let dead_members: Vec<Entity> = state
        .members
        .iter()
        .copied()
        .filter(|&m| health(world, m).is_none())
        .collect();

    if !dead_members.is_empty() {
        if let Some(mut state) = world.get_mut::<Squad>(squad) {
            state.members.retain(|m| !dead_members.contains(m));
        }
        for member in dead_members {
            set_link(world, member, SquadLink::independent());
        }
    }

    if leader_dead {
        remove_leader(world, squad);
    }

    disband_if_empty(world, squad);
}

pub fn cleanup_all_squads(world: &mut World) {
    let mut query = world.query_filtered::<Entity, With<Squad>>();
    let squads: Vec<Entity> = query.iter(world).collect();
    for squad in squads {
        cleanup_squad(world, squad);
    }
}

fn set_link(world: &mut World, unit: Entity, link: SquadLink) {
    if let Some(mut current) = world.get_mut::<SquadLink>(unit) {
        *current = link;
    }
}

//! Урон и смерть
//!
//! Смерть синхронная: отцепка от отряда (лидер → преемник) до despawn'а,
//! чтобы никто не увидел отряд со ссылкой на уничтоженного агента.

use bevy::prelude::*;

use super::response::trigger_combat_response;
use crate::components::{Agent, Faction, Health, SquadLink, SquadRole};
use crate::logger;
use crate::shared::{AgentRegistry, SimClock};
use crate::squad::{self, Squad};

/// Запись о гибели агента
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Casualty {
    pub entity: Entity,
    pub faction: Faction,
    pub killer: Option<Entity>,
    pub time: f32,
}

/// Resource: журнал потерь в порядке гибели
#[derive(Resource, Debug, Clone, Default)]
pub struct Casualties {
    pub records: Vec<Casualty>,
}

impl Casualties {
    pub fn count(&self, faction: Faction) -> usize {
        self.records.iter().filter(|c| c.faction == faction).count()
    }
}

/// Урон по члену фортифицированного отряда: round(amount × (1 − reduction))
pub fn fortified_damage(amount: u32, reduction: f32) -> u32 {
    (amount as f32 * (1.0 - reduction)).round().max(0.0) as u32
}

/// Итоговый урон с учётом фортификации (только Member, не лидер)
fn mitigated_damage(world: &World, target: Entity, amount: u32) -> u32 {
    let Some(link) = world.get::<SquadLink>(target) else {
        return amount;
    };
    if link.role != SquadRole::Member {
        return amount;
    }

    match link.squad.and_then(|s| world.get::<Squad>(s)) {
        Some(state) if state.is_fortified() => {
            fortified_damage(amount, state.fortify_damage_reduction)
        }
        _ => amount,
    }
}

/// Применяет урон. Выживший реагирует на атаку, погибший удаляется.
/// Возвращает фактически нанесённый урон.
pub fn take_damage(world: &mut World, target: Entity, amount: u32, attacker: Option<Entity>) -> u32 {
    if !world.get::<Health>(target).is_some_and(|h| h.is_alive()) {
        return 0;
    }

    let applied = mitigated_damage(world, target, amount);
    let Some(mut health) = world.get_mut::<Health>(target) else {
        return 0;
    };
    health.take_damage(applied);
    let alive = health.is_alive();

    if alive {
        trigger_combat_response(world, target);
    } else {
        kill(world, target, attacker);
    }
    applied
}

/// Смерть агента: отряд → реестр → журнал → despawn
pub fn kill(world: &mut World, agent: Entity, killer: Option<Entity>) {
    let Some(faction) = world.get::<Agent>(agent).map(|a| a.faction) else {
        return;
    };

    if let Some(mut health) = world.get_mut::<Health>(agent) {
        health.current = 0;
    }

    squad::detach(world, agent);

    if let Some(mut registry) = world.get_resource_mut::<AgentRegistry>() {
        registry.unregister(agent);
    }

    let time = world.get_resource::<SimClock>().map_or(0.0, |c| c.elapsed);
    if let Some(mut casualties) = world.get_resource_mut::<Casualties>() {
        casualties.records.push(Casualty {
            entity: agent,
            faction,
            killer,
            time,
        });
    }

    logger::log_info(&format!("💀 Agent {:?} ({:?}) killed by {:?}", agent, faction, killer));
    world.despawn(agent);
}

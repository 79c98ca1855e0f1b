//! Лечение

use bevy::prelude::*;

use crate::components::{Agent, Healer, Health, UnitType};
use crate::shared::{AgentRegistry, SimClock};

/// Лечит живого агента (clamp до max)
pub fn heal(world: &mut World, agent: Entity, amount: u32) {
    if let Some(mut health) = world.get_mut::<Health>(agent) {
        health.heal(amount);
    }
}

/// Групповое лечение лидером: все живые союзники в healing range, не чаще
/// healing interval. Возвращает число вылеченных.
pub fn heal_nearby_allies(world: &mut World, healer: Entity) -> usize {
    let now = world.get_resource::<SimClock>().map_or(0.0, |c| c.elapsed);

    let (Some(agent), Some(stats), Some(transform)) = (
        world.get::<Agent>(healer).copied(),
        world.get::<Healer>(healer).cloned(),
        world.get::<Transform>(healer).copied(),
    ) else {
        return 0;
    };
    if agent.unit_type != UnitType::Leader || !stats.is_ready(now) {
        return 0;
    }

    if let Some(mut stats) = world.get_mut::<Healer>(healer) {
        stats.last_heal = Some(now);
    }

    let amount = stats.group_heal_amount();
    let allies: Vec<Entity> = world
        .get_resource::<AgentRegistry>()
        .map(AgentRegistry::snapshot)
        .unwrap_or_default()
        .into_iter()
        .filter(|&other| other != healer)
        .filter(|&other| {
            world.get::<Agent>(other).is_some_and(|a| a.faction == agent.faction)
                && world.get::<Health>(other).is_some_and(|h| h.is_alive())
                && world
                    .get::<Transform>(other)
                    .is_some_and(|t| t.translation.distance(transform.translation) <= stats.range)
        })
        .collect();

    for &ally in &allies {
        heal(world, ally, amount);
    }
    allies.len()
}

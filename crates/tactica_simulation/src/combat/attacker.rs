//! Атака и cooldown'ы

use bevy::prelude::*;

use super::damage::take_damage;
use crate::components::{Attacker, Health};

/// Удар `attacker` по `target`. false если cooldown не истёк или цель мертва.
pub fn attack(world: &mut World, attacker: Entity, target: Entity) -> bool {
    if attacker == target {
        return false;
    }
    let Some(stats) = world.get::<Attacker>(attacker) else {
        return false;
    };
    if !stats.can_attack() {
        return false;
    }
    let damage = stats.damage;

    if !world.get::<Health>(target).is_some_and(|h| h.is_alive()) {
        return false;
    }

    if let Some(mut stats) = world.get_mut::<Attacker>(attacker) {
        stats.start_cooldown();
    }
    take_damage(world, target, damage, Some(attacker));
    true
}

/// Countdown attack cooldown'ов всех агентов
pub fn tick_attack_cooldowns(world: &mut World, delta: f32) {
    let mut query = world.query::<&mut Attacker>();
    for mut attacker in query.iter_mut(world) {
        attacker.tick(delta);
    }
}

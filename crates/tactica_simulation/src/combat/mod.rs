//! Combat module
//!
//! Правила боя поверх World:
//! - attack: удар по цели с учётом cooldown
//! - damage: фортификация, смерть (отцепка от отряда → despawn), журнал потерь
//! - response: реакция на полученный урон (контратака / доклад лидеру)
//! - healing: групповое лечение лидером

use bevy::prelude::*;

pub mod attacker;
pub mod damage;
pub mod healing;
pub mod response;

// Tests (separate files with _tests suffix)
#[cfg(test)]
mod damage_tests;

pub use attacker::{attack, tick_attack_cooldowns};
pub use damage::{fortified_damage, kill, take_damage, Casualties, Casualty};
pub use healing::{heal, heal_nearby_allies};
pub use response::trigger_combat_response;

/// Combat Plugin: журнал потерь (боевая логика вызывается из FSM тика)
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Casualties>();
    }
}

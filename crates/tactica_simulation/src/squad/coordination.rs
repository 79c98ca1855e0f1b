//! Боевая координация: доклады о контакте, shared target, приказ атаки

use bevy::prelude::*;

use super::components::Squad;
use crate::ai::fsm::{self, StateId};
use crate::components::Health;
use crate::logger;
use crate::shared::SimClock;

fn is_alive(world: &World, unit: Entity) -> bool {
    world.get::<Health>(unit).is_some_and(|h| h.is_alive())
}

/// Член отряда докладывает лидеру о враге (rate-limited report_cooldown).
///
/// Лидер вне боя (Command/Heal/Recruit) получает target и переводится в Attack;
/// лидер уже в Attack только переключает shared target на нового врага.
pub fn report_enemy_contact(world: &mut World, squad: Entity, reporter: Entity, enemy: Entity) {
    if !is_alive(world, enemy) {
        return;
    }
    let now = world.get_resource::<SimClock>().map_or(0.0, |c| c.elapsed);

    let Some(mut state) = world.get_mut::<Squad>(squad) else {
        return;
    };
    let Some(leader) = state.leader else {
        return;
    };
    if !state.can_report(now) {
        return;
    }
    state.last_report = Some(now);
    let current_target = state.target;

    match fsm::current_state(world, leader) {
        Some(StateId::LeaderCommand | StateId::LeaderHeal | StateId::LeaderRecruit) => {
            logger::log(&format!(
                "Squad {:?}: {:?} reports {:?}, leader engages",
                squad, reporter, enemy
            ));
            set_squad_target(world, squad, Some(enemy));
            fsm::force_state(world, leader, StateId::LeaderAttack);
        }
        Some(StateId::LeaderAttack) if current_target != Some(enemy) => {
            set_squad_target(world, squad, Some(enemy));
        }
        _ => {}
    }
}

/// Ставит shared target. Непустой target = приказ атаки: живые члены в
/// Follow/Recruit принудительно переходят в Attack.
pub fn set_squad_target(world: &mut World, squad: Entity, target: Option<Entity>) {
    let Some(mut state) = world.get_mut::<Squad>(squad) else {
        return;
    };
    state.target = target;
    state.in_combat = target.is_some();
    let members = state.members.clone();

    match target {
        Some(target) => {
            logger::log(&format!("Squad {:?} target set to {:?}", squad, target));
            notify_attack_order(world, &members);
        }
        None => logger::log(&format!("Squad {:?} combat ended", squad)),
    }
}

fn notify_attack_order(world: &mut World, members: &[Entity]) {
    for &member in members {
        if !is_alive(world, member) {
            continue;
        }
        if matches!(
            fsm::current_state(world, member),
            Some(StateId::UnitFollow | StateId::UnitRecruit)
        ) {
            fsm::force_state(world, member, StateId::UnitAttack);
        }
    }
}

pub fn clear_squad_target(world: &mut World, squad: Entity) {
    set_squad_target(world, squad, None);
}

/// Единственное место, где протухший target сбрасывается: мёртвая цель →
/// clear + false. Вызывать перед доверием `current_target()`.
pub fn has_valid_squad_target(world: &mut World, squad: Entity) -> bool {
    let Some(state) = world.get::<Squad>(squad) else {
        return false;
    };
    if !state.in_combat {
        return false;
    }

    let target_alive = state.target.is_some_and(|t| is_alive(world, t));
    if !target_alive {
        clear_squad_target(world, squad);
    }
    target_alive
}

/// Проверенный shared target (ленивая очистка внутри)
pub fn valid_squad_target(world: &mut World, squad: Entity) -> Option<Entity> {
    if !has_valid_squad_target(world, squad) {
        return None;
    }
    world.get::<Squad>(squad).and_then(|s| s.target)
}

/// Read-only: активен ли приказ атаки по живой цели
pub fn has_squad_attack_order(world: &World, squad: Entity) -> bool {
    world.get::<Squad>(squad).is_some_and(|state| {
        state.in_combat && state.target.is_some_and(|t| is_alive(world, t))
    })
}

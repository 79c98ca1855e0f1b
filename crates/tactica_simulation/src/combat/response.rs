//! Реакция на полученный урон

use bevy::prelude::*;

use crate::ai::fsm::{self, StateId};
use crate::ai::perception;
use crate::components::{Agent, SquadLink, SquadRole, UnitType, Vision};
use crate::squad;

/// Радиус "ответа на удар" относительно дальности зрения
const RETALIATION_RANGE_FACTOR: f32 = 1.5;

/// Выживший после удара ищет обидчика (видимого или рядом) и реагирует по роли:
/// - Leader-тип вне боя → Attack
/// - Member → доклад лидеру
/// - Independent в Follow/Recruit → Attack
pub fn trigger_combat_response(world: &mut World, victim: Entity) {
    let radius = world
        .get::<Vision>(victim)
        .map_or(0.0, |v| v.range * RETALIATION_RANGE_FACTOR);

    let threat = perception::closest_visible_enemy(world, victim)
        .map(|(enemy, _)| enemy)
        .or_else(|| perception::nearest_enemy_within(world, victim, radius));
    let Some(threat) = threat else {
        return;
    };

    let unit_type = world.get::<Agent>(victim).map(|a| a.unit_type);
    let link = world.get::<SquadLink>(victim).copied().unwrap_or_default();
    let state = fsm::current_state(world, victim);

    if unit_type == Some(UnitType::Leader) {
        if matches!(
            state,
            Some(StateId::LeaderCommand | StateId::LeaderHeal | StateId::LeaderRecruit)
        ) {
            fsm::force_state(world, victim, StateId::LeaderAttack);
        }
        return;
    }

    match link.role {
        SquadRole::Member => {
            if let Some(squad) = link.squad {
                squad::report_enemy_contact(world, squad, victim, threat);
            }
        }
        SquadRole::Independent => {
            if matches!(state, Some(StateId::UnitFollow | StateId::UnitRecruit)) {
                fsm::force_state(world, victim, StateId::UnitAttack);
            }
        }
        SquadRole::Leader => {}
    }
}

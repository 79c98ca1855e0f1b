//! Leader state set: Command (initial), Attack, Flee, Heal, Fortify, Recruit

mod attack;
mod command;
mod flee;
mod fortify;
mod heal;
mod recruit;


pub use attack::LeaderAttackState;
pub use command::{LeaderCommandState, LeaderDecision};
pub use flee::LeaderFleeState;
pub use fortify::LeaderFortifyState;
pub use heal::LeaderHealState;
pub use recruit::LeaderRecruitState;

use super::context::AiContext;
use super::fsm::StateMachine;
use crate::config::LeaderTuning;
use crate::squad;

/// Машина лидера со всеми 6 состояниями (старт — через `fsm::start`)
pub fn leader_brain() -> StateMachine {
    StateMachine::new()
        .with_state(LeaderCommandState::default())
        .with_state(LeaderAttackState::default())
        .with_state(LeaderFleeState::default())
        .with_state(LeaderHealState::default())
        .with_state(LeaderFortifyState::default())
        .with_state(LeaderRecruitState::default())
}

/// Сводка по отряду лидера для решений об отступлении
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SquadHealth {
    /// Средний процент здоровья живых (лидер включён)
    pub average: f32,
    /// Живые лидер + члены
    pub alive: usize,
    /// Живые кроме самого лидера
    pub others_alive: usize,
}

impl SquadHealth {
    pub fn of(ctx: &AiContext) -> Option<Self> {
        let squad = ctx.squad()?;
        Some(Self {
            average: squad::average_health(ctx.world, squad),
            alive: squad::alive_count(ctx.world, squad),
            others_alive: squad::other_alive_count(ctx.world, squad, ctx.agent),
        })
    }
}

/// Отступление из Attack
pub fn should_retreat(health: f32, squad: Option<SquadHealth>, tuning: &LeaderTuning) -> bool {
    match squad {
        None => health < tuning.solo_retreat_health,
        Some(squad) => {
            squad.others_alive == 0
                || squad.average < tuning.squad_retreat_average
                || (health < tuning.critical_health && squad.average < tuning.critical_squad_average)
        }
    }
}

/// Экстренное отступление из Fortify (без отряда укрепляться нечем)
pub fn should_emergency_retreat(
    health: f32,
    squad: Option<SquadHealth>,
    tuning: &LeaderTuning,
) -> bool {
    match squad {
        None => true,
        Some(squad) => {
            squad.average < tuning.fortify_emergency_squad_average
                || squad.others_alive == 0
                || (health < tuning.fortify_emergency_health && squad.alive <= 1)
        }
    }
}

/// Завершено ли лечение
pub fn is_healing_complete(health: f32, squad_average: Option<f32>, tuning: &LeaderTuning) -> bool {
    match squad_average {
        None => health >= tuning.heal_complete_solo,
        Some(average) => average >= tuning.heal_complete_squad && health >= tuning.heal_complete_squad,
    }
}

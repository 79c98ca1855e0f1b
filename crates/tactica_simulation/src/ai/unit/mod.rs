//! Unit state set: Follow (initial), Attack, Flee, Recruit, Roam

mod attack;
mod follow;
mod flee;
mod recruit;
mod roam;

#[cfg(test)]
mod unit_tests;

pub use attack::UnitAttackState;
pub use flee::{flee_duration, UnitFleeState};
pub use follow::UnitFollowState;
pub use recruit::{find_recruit_target, is_valid_recruit_target, UnitRecruitState};
pub use roam::UnitRoamState;

use super::context::AiContext;
use super::fsm::{StateMachine, StateId, Transition};
use crate::components::SquadRole;

/// Машина юнита со всеми 5 состояниями (старт — через `fsm::start`)
pub fn unit_brain() -> StateMachine {
    StateMachine::new()
        .with_state(UnitFollowState::default())
        .with_state(UnitAttackState::default())
        .with_state(UnitFleeState::default())
        .with_state(UnitRecruitState::default())
        .with_state(UnitRoamState::default())
}

/// Куда возвращаться после боя: Independent → Roam, в отряде → Follow
fn fall_back(ctx: &AiContext) -> Transition {
    match ctx.role() {
        SquadRole::Independent => Transition::To(StateId::UnitRoam),
        SquadRole::Leader | SquadRole::Member => Transition::To(StateId::UnitFollow),
    }
}

//! LeaderRecruit — подходит к Independent союзнику и принимает его в отряд

use bevy::prelude::*;

use crate::ai::context::AiContext;
use crate::ai::fsm::{AiState, StateId, Transition};
use crate::logger;
use crate::squad;

#[derive(Debug, Default)]
pub struct LeaderRecruitState {
    target: Option<Entity>,
}

impl AiState for LeaderRecruitState {
    fn id(&self) -> StateId {
        StateId::LeaderRecruit
    }

    fn enter(&mut self, ctx: &mut AiContext) -> Transition {
        self.target = ctx.find_recruitable();
        Transition::Stay
    }

    fn update(&mut self, ctx: &mut AiContext) -> Transition {
        let Some(target) = self.target else {
            return Transition::To(StateId::LeaderCommand);
        };
        let (Some(squad), Some(recruitment_range)) = (
            ctx.squad(),
            ctx.squad_state()
                .filter(|state| !state.is_full())
                .map(|state| state.recruitment_range),
        ) else {
            return Transition::To(StateId::LeaderCommand);
        };
        if !ctx.is_alive(target) || !ctx.is_independent(target) {
            return Transition::To(StateId::LeaderCommand);
        }
        let Some(target_position) = ctx.position_of(target) else {
            return Transition::To(StateId::LeaderCommand);
        };

        if ctx.position().distance(target_position) <= recruitment_range {
            match squad::try_add_member(ctx.world, squad, target) {
                Ok(()) => return Transition::To(StateId::LeaderCommand),
                Err(err) => logger::log(&format!("Recruit {:?} failed: {}", target, err)),
            }
        }

        ctx.move_to(target_position);
        Transition::Stay
    }

    fn exit(&mut self, _ctx: &mut AiContext) {
        self.target = None;
    }
}

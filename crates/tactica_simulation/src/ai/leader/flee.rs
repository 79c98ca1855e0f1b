//! LeaderFlee — отход от врагов, после 3 с без контакта → Heal

use bevy::prelude::*;

use crate::ai::context::AiContext;
use crate::ai::fsm::{AiState, StateId, Transition};
use crate::ai::tactics;

#[derive(Debug, Default)]
pub struct LeaderFleeState {
    flee_target: Vec3,
    /// Момент последнего визуального контакта (или входа в состояние)
    last_contact: f32,
}

impl AiState for LeaderFleeState {
    fn id(&self) -> StateId {
        StateId::LeaderFlee
    }

    fn enter(&mut self, ctx: &mut AiContext) -> Transition {
        let distance = ctx.leader_tuning().flee_distance;
        self.flee_target = tactics::flee_point(ctx, distance);
        self.last_contact = ctx.now();
        Transition::Stay
    }

    fn update(&mut self, ctx: &mut AiContext) -> Transition {
        let tuning = ctx.leader_tuning();
        let now = ctx.now();

        let safe = ctx.visible_enemies().is_empty();
        if safe && now > self.last_contact + tuning.safety_duration {
            return Transition::To(StateId::LeaderHeal);
        }

        if ctx.position().distance(self.flee_target) < tuning.flee_arrival_distance {
            self.flee_target = tactics::flee_point(ctx, tuning.flee_distance);
        }
        ctx.move_to(self.flee_target);

        if !ctx.visible_enemies().is_empty() {
            self.last_contact = now;
        }
        Transition::Stay
    }
}

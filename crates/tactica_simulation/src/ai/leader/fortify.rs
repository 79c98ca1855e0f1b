//! LeaderFortify — оборонительная стойка отряда на fortify_duration

use super::{should_emergency_retreat, SquadHealth};
use crate::ai::context::AiContext;
use crate::ai::fsm::{AiState, StateId, Transition};
use crate::squad;

#[derive(Debug, Default)]
pub struct LeaderFortifyState {
    started: f32,
}

impl AiState for LeaderFortifyState {
    fn id(&self) -> StateId {
        StateId::LeaderFortify
    }

    fn enter(&mut self, ctx: &mut AiContext) -> Transition {
        self.started = ctx.now();
        if let Some(squad) = ctx.squad() {
            squad::set_fortified(ctx.world, squad, true);
        }
        ctx.stop();
        Transition::Stay
    }

    fn update(&mut self, ctx: &mut AiContext) -> Transition {
        let tuning = ctx.leader_tuning();
        if should_emergency_retreat(ctx.health_percentage(), SquadHealth::of(ctx), &tuning) {
            return Transition::To(StateId::LeaderFlee);
        }

        // Из стойки можно бить, но не двигаться
        if let Some(enemy) = ctx.closest_visible_enemy() {
            if ctx.in_attack_range(enemy) && ctx.can_attack() {
                ctx.attack(enemy);
            }
        }

        if ctx.now() > self.started + tuning.fortify_duration {
            return Transition::To(StateId::LeaderAttack);
        }

        ctx.stop();
        Transition::Stay
    }

    fn exit(&mut self, ctx: &mut AiContext) {
        if let Some(squad) = ctx.squad() {
            squad::set_fortified(ctx.world, squad, false);
        }
    }
}

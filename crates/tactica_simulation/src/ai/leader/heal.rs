//! LeaderHeal — стоит на месте, лечит союзников и себя

use super::is_healing_complete;
use crate::ai::context::AiContext;
use crate::ai::fsm::{AiState, StateId, Transition};
use crate::squad;

#[derive(Debug, Default)]
pub struct LeaderHealState;

/// Self-heal за тик: rate × delta (×2 ниже порога), минимум 1 HP
pub fn self_heal_amount(rate: f32, health: f32, delta: f32, boost_threshold: f32) -> u32 {
    let rate = if health < boost_threshold { rate * 2.0 } else { rate };
    ((rate * delta).round() as u32).max(1)
}

impl AiState for LeaderHealState {
    fn id(&self) -> StateId {
        StateId::LeaderHeal
    }

    fn enter(&mut self, ctx: &mut AiContext) -> Transition {
        ctx.stop();
        Transition::Stay
    }

    fn update(&mut self, ctx: &mut AiContext) -> Transition {
        let tuning = ctx.leader_tuning();

        if !ctx.visible_enemies().is_empty() {
            return Transition::To(StateId::LeaderCommand);
        }

        let squad_average = ctx.squad().map(|s| squad::average_health(ctx.world, s));
        if is_healing_complete(ctx.health_percentage(), squad_average, &tuning) {
            return Transition::To(StateId::LeaderCommand);
        }

        ctx.stop();
        ctx.heal_nearby_allies();

        let health = ctx.health_percentage();
        if health < 1.0 {
            let amount = self_heal_amount(
                ctx.healing_rate(),
                health,
                ctx.delta(),
                tuning.self_heal_boost_threshold,
            );
            ctx.heal(amount);
        }
        Transition::Stay
    }
}

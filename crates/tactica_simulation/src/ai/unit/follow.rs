//! UnitFollow — держит слот формации, докладывает лидеру о контакте

use crate::ai::context::AiContext;
use crate::ai::fsm::{AiState, StateId, Transition};
use crate::components::SquadRole;
use crate::squad;

#[derive(Debug, Default)]
pub struct UnitFollowState {
    last_report: Option<f32>,
}

impl AiState for UnitFollowState {
    fn id(&self) -> StateId {
        StateId::UnitFollow
    }

    fn update(&mut self, ctx: &mut AiContext) -> Transition {
        let tuning = ctx.unit_tuning();
        let role = ctx.role();

        if role == SquadRole::Independent {
            return Transition::To(StateId::UnitRoam);
        }

        let own_squad = ctx.squad();
        if own_squad.is_some_and(|s| squad::has_squad_attack_order(ctx.world, s)) {
            return Transition::To(StateId::UnitAttack);
        }

        if !ctx.visible_enemies().is_empty() {
            let (Some(own_squad), SquadRole::Member) = (own_squad, role) else {
                return Transition::To(StateId::UnitAttack);
            };

            // Член отряда ждёт приказа лидера
            let now = ctx.now();
            let ready = self
                .last_report
                .map_or(true, |last| now >= last + tuning.report_cooldown);
            if ready {
                if let Some(enemy) = ctx.closest_visible_enemy() {
                    squad::report_enemy_contact(ctx.world, own_squad, ctx.agent, enemy);
                    self.last_report = Some(now);
                }
            }
            return Transition::Stay;
        }

        if ctx.health_percentage() <= tuning.flee_health_threshold {
            return Transition::To(StateId::UnitFlee);
        }

        let has_leader = ctx.squad_state().is_some_and(|s| s.leader().is_some());
        match own_squad.filter(|_| has_leader) {
            Some(own_squad) => {
                let slot = squad::formation_position(ctx.world, own_squad, ctx.agent);
                ctx.move_to(slot);
            }
            None => {
                let wander = ctx.position() + ctx.random_direction() * tuning.wander_distance;
                ctx.move_to(wander);
            }
        }
        Transition::Stay
    }
}

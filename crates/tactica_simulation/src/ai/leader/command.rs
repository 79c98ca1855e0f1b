//! LeaderCommand — патруль, вербовка, тактические решения

use bevy::prelude::*;

use crate::ai::context::AiContext;
use crate::ai::fsm::{AiState, StateId, Transition};
use crate::ai::roulette::WeightedOption;
use crate::ai::tactics;
use crate::squad;

/// Исход тактической рулетки
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LeaderDecision {
    AttackAggressive,
    #[default]
    AttackCautious,
    Retreat,
}

impl LeaderDecision {
    /// Веса рулетки от среднего здоровья отряда
    pub fn weighted_options(squad_average: f32) -> [WeightedOption<LeaderDecision>; 3] {
        let aggressive = if squad_average > 0.7 { 40.0 } else { 10.0 };
        let cautious = if squad_average > 0.4 { 30.0 } else { 20.0 };
        let retreat = if squad_average < 0.3 { 50.0 } else { 5.0 };

        [
            WeightedOption::new(LeaderDecision::AttackAggressive, aggressive),
            WeightedOption::new(LeaderDecision::AttackCautious, cautious),
            WeightedOption::new(LeaderDecision::Retreat, retreat),
        ]
    }

    pub fn next_state(self) -> StateId {
        match self {
            LeaderDecision::AttackAggressive | LeaderDecision::AttackCautious => {
                StateId::LeaderAttack
            }
            LeaderDecision::Retreat => StateId::LeaderFlee,
        }
    }
}

#[derive(Debug, Default)]
pub struct LeaderCommandState {
    last_decision: f32,
    last_patrol_update: f32,
    patrol_target: Vec3,
}

impl LeaderCommandState {
    fn tactical_decision(&mut self, ctx: &mut AiContext) -> Transition {
        let tuning = ctx.leader_tuning();
        let squad = ctx.squad();

        if !ctx.visible_enemies().is_empty() {
            let average = squad.map_or_else(
                || ctx.health_percentage(),
                |s| squad::average_health(ctx.world, s),
            );
            let decision = ctx.select(&LeaderDecision::weighted_options(average));
            return Transition::To(decision.next_state());
        }

        // Врагов не видно: заодно сбрасываем протухший target отряда
        let needs_healing = match squad {
            Some(s) => {
                squad::has_valid_squad_target(ctx.world, s);
                squad::average_health(ctx.world, s) < tuning.heal_squad_threshold
            }
            None => ctx.health_percentage() < tuning.heal_solo_threshold,
        };

        if needs_healing {
            Transition::To(StateId::LeaderHeal)
        } else {
            Transition::Stay
        }
    }
}

impl AiState for LeaderCommandState {
    fn id(&self) -> StateId {
        StateId::LeaderCommand
    }

    fn enter(&mut self, ctx: &mut AiContext) -> Transition {
        let now = ctx.now();
        self.last_decision = now;
        self.last_patrol_update = now;
        let range = ctx.leader_tuning().patrol_range;
        self.patrol_target = tactics::random_destination(ctx, range);
        Transition::Stay
    }

    fn update(&mut self, ctx: &mut AiContext) -> Transition {
        let tuning = ctx.leader_tuning();

        if ctx.find_recruitable().is_some() {
            return Transition::To(StateId::LeaderRecruit);
        }

        if ctx.health_percentage() <= tuning.flee_health_threshold {
            return Transition::To(StateId::LeaderFlee);
        }

        if !ctx.visible_enemies().is_empty() {
            return self.tactical_decision(ctx);
        }

        let now = ctx.now();
        if now > self.last_decision + tuning.decision_interval {
            self.last_decision = now;
            if let Transition::To(next) = self.tactical_decision(ctx) {
                return Transition::To(next);
            }
        }

        let arrived =
            ctx.position().distance(self.patrol_target) < tuning.patrol_arrival_distance;
        if now > self.last_patrol_update + tuning.patrol_interval || arrived {
            self.patrol_target = tactics::random_destination(ctx, tuning.patrol_range);
            self.last_patrol_update = now;
        }

        ctx.move_to(self.patrol_target);
        Transition::Stay
    }
}

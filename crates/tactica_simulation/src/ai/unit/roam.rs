//! UnitRoam — одиночка бродит по арене и ищет отряд

use bevy::prelude::*;

use crate::ai::context::AiContext;
use crate::ai::fsm::{AiState, StateId, Transition};
use crate::ai::{perception, tactics};
use crate::squad;

#[derive(Debug, Default)]
pub struct UnitRoamState {
    roam_target: Vec3,
    last_roam_update: f32,
    last_recruit_check: f32,
}

impl UnitRoamState {
    fn wander(&mut self, ctx: &mut AiContext) {
        let tuning = ctx.unit_tuning();
        let now = ctx.now();
        let arrived = ctx.position().distance(self.roam_target) < tuning.roam_arrival_distance;

        if now > self.last_roam_update + tuning.roam_interval || arrived {
            self.roam_target = tactics::random_destination(ctx, tuning.roam_range);
            self.last_roam_update = now;
        }
        ctx.move_to(self.roam_target);
    }
}

impl AiState for UnitRoamState {
    fn id(&self) -> StateId {
        StateId::UnitRoam
    }

    fn enter(&mut self, ctx: &mut AiContext) -> Transition {
        squad::detach(ctx.world, ctx.agent);

        let now = ctx.now();
        let range = ctx.unit_tuning().roam_range;
        self.roam_target = tactics::random_destination(ctx, range);
        self.last_roam_update = now;
        self.last_recruit_check = now;
        Transition::Stay
    }

    fn update(&mut self, ctx: &mut AiContext) -> Transition {
        let tuning = ctx.unit_tuning();

        // Лидер принял нас в отряд, пока мы бродили
        if !ctx.is_independent(ctx.agent) {
            return Transition::To(StateId::UnitFollow);
        }

        if ctx.health_percentage() <= tuning.roam_flee_threshold {
            return Transition::To(StateId::UnitFlee);
        }

        if !ctx.visible_enemies().is_empty() {
            return Transition::To(StateId::UnitAttack);
        }

        if !perception::any_enemies_alive(ctx.world, ctx.agent) {
            self.wander(ctx);
            return Transition::Stay;
        }

        let now = ctx.now();
        if now > self.last_recruit_check + tuning.recruit_check_interval {
            if perception::find_joinable_leader(ctx.world, ctx.agent).is_some() {
                return Transition::To(StateId::UnitRecruit);
            }
            self.last_recruit_check = now;
        }

        self.wander(ctx);
        Transition::Stay
    }
}

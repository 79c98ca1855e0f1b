//! UnitFlee — покидает отряд и бежит; может прибиться к лечащему лидеру

use bevy::prelude::*;

use crate::ai::context::AiContext;
use crate::ai::fsm::{AiState, StateId, Transition};
use crate::ai::{perception, tactics};
use crate::config::UnitTuning;
use crate::squad;

#[derive(Debug, Default)]
pub struct UnitFleeState {
    flee_target: Vec3,
    started: f32,
    duration: f32,
}

/// Длительность бегства: flee_max_duration при 0% HP → flee_min_duration при 100%
pub fn flee_duration(health: f32, tuning: &UnitTuning) -> f32 {
    let t = health.clamp(0.0, 1.0);
    let duration = tuning.flee_max_duration + (tuning.flee_min_duration - tuning.flee_max_duration) * t;
    duration.min(tuning.flee_hard_cap)
}

impl AiState for UnitFleeState {
    fn id(&self) -> StateId {
        StateId::UnitFlee
    }

    fn enter(&mut self, ctx: &mut AiContext) -> Transition {
        let tuning = ctx.unit_tuning();
        squad::detach(ctx.world, ctx.agent);

        self.started = ctx.now();
        self.duration = flee_duration(ctx.health_percentage(), &tuning);
        self.flee_target = tactics::flee_point(ctx, tuning.flee_distance);
        Transition::Stay
    }

    fn update(&mut self, ctx: &mut AiContext) -> Transition {
        let tuning = ctx.unit_tuning();

        let shelter = perception::find_healing_leader(ctx.world, ctx.agent)
            .and_then(|leader| squad::squad_of(ctx.world, leader));
        if let Some(shelter) = shelter {
            if squad::try_add_member(ctx.world, shelter, ctx.agent).is_ok() {
                return Transition::To(StateId::UnitFollow);
            }
        }

        let elapsed = ctx.now() - self.started;
        if elapsed > self.duration || elapsed > tuning.flee_hard_cap {
            return Transition::To(StateId::UnitRoam);
        }

        if ctx.position().distance(self.flee_target) < tuning.flee_arrival_distance {
            self.flee_target = tactics::flee_point(ctx, tuning.flee_distance);
        }
        ctx.move_to(self.flee_target);
        Transition::Stay
    }
}

//! UnitAttack — бьёт shared target отряда или ближайшего видимого врага

use bevy::prelude::*;

use super::fall_back;
use crate::ai::context::AiContext;
use crate::ai::fsm::{AiState, StateId, Transition};
use crate::ai::tactics::Pursuit;
use crate::squad::{self, Squad};

#[derive(Debug, Default)]
pub struct UnitAttackState {
    target: Option<Entity>,
    pursuit: Pursuit,
}

/// Shared target при активном приказе, иначе ближайший видимый враг
fn preferred_target(ctx: &AiContext) -> Option<Entity> {
    let ordered = ctx
        .squad()
        .filter(|&s| squad::has_squad_attack_order(ctx.world, s))
        .and_then(|s| ctx.world.get::<Squad>(s))
        .and_then(Squad::current_target);

    ordered.or_else(|| ctx.closest_visible_enemy())
}

impl AiState for UnitAttackState {
    fn id(&self) -> StateId {
        StateId::UnitAttack
    }

    fn enter(&mut self, ctx: &mut AiContext) -> Transition {
        self.target = preferred_target(ctx);
        if let Some(position) = self.target.and_then(|t| ctx.position_of(t)) {
            self.pursuit.refresh(ctx, position);
        }
        Transition::Stay
    }

    fn update(&mut self, ctx: &mut AiContext) -> Transition {
        let tuning = ctx.unit_tuning();
        if ctx.health_percentage() <= tuning.flee_health_threshold {
            return Transition::To(StateId::UnitFlee);
        }

        let has_orders = match ctx.squad() {
            Some(s) => squad::has_valid_squad_target(ctx.world, s),
            None => false,
        };
        if !has_orders && ctx.visible_enemies().is_empty() {
            return fall_back(ctx);
        }

        let current = self.target.filter(|&t| ctx.is_alive(t) && ctx.can_see(t));
        let Some(target) = current.or_else(|| preferred_target(ctx)) else {
            self.target = None;
            return fall_back(ctx);
        };
        self.target = Some(target);

        if ctx.in_attack_range(target) {
            if ctx.can_attack() {
                let target_position = ctx.position_of(target);
                ctx.attack(target);
                if let Some(position) = target_position {
                    let turn_rate = ctx.engage_tuning().face_turn_rate;
                    ctx.face_towards(position, turn_rate);
                }
            }
            return Transition::Stay;
        }

        self.pursuit.advance(ctx, target);
        Transition::Stay
    }

    fn exit(&mut self, _ctx: &mut AiContext) {
        self.target = None;
        self.pursuit.reset();
    }
}

//! LeaderAttack — ведёт отряд в бой, публикует shared target

use bevy::prelude::*;

use super::{should_retreat, SquadHealth};
use crate::ai::context::AiContext;
use crate::ai::fsm::{AiState, StateId, Transition};
use crate::ai::tactics::Pursuit;
use crate::squad;

#[derive(Debug, Default)]
pub struct LeaderAttackState {
    target: Option<Entity>,
    pursuit: Pursuit,
}

impl LeaderAttackState {
    /// Текущая цель, если она жива и видна; иначе ближайший видимый враг
    fn acquire_target(&mut self, ctx: &mut AiContext) -> Option<Entity> {
        if let Some(target) = self.target.filter(|&t| ctx.is_alive(t) && ctx.can_see(t)) {
            return Some(target);
        }

        self.target = ctx.closest_visible_enemy();
        if let (Some(target), Some(squad)) = (self.target, ctx.squad()) {
            squad::set_squad_target(ctx.world, squad, Some(target));
        }
        self.target
    }
}

impl AiState for LeaderAttackState {
    fn id(&self) -> StateId {
        StateId::LeaderAttack
    }

    fn enter(&mut self, ctx: &mut AiContext) -> Transition {
        self.target = ctx.closest_visible_enemy();
        if let (Some(target), Some(squad)) = (self.target, ctx.squad()) {
            squad::set_squad_target(ctx.world, squad, Some(target));
        }

        if ctx.random_value() < ctx.leader_tuning().fortify_chance {
            return Transition::To(StateId::LeaderFortify);
        }

        if let Some(position) = self.target.and_then(|t| ctx.position_of(t)) {
            self.pursuit.refresh(ctx, position);
        }
        Transition::Stay
    }

    fn update(&mut self, ctx: &mut AiContext) -> Transition {
        let tuning = ctx.leader_tuning();
        if should_retreat(ctx.health_percentage(), SquadHealth::of(ctx), &tuning) {
            return Transition::To(StateId::LeaderFlee);
        }

        let Some(target) = self.acquire_target(ctx) else {
            if let Some(squad) = ctx.squad() {
                squad::clear_squad_target(ctx.world, squad);
            }
            return Transition::To(StateId::LeaderCommand);
        };

        if ctx.in_attack_range(target) && ctx.can_attack() {
            ctx.attack(target);
            return Transition::Stay;
        }

        self.pursuit.advance(ctx, target);
        Transition::Stay
    }

    fn exit(&mut self, ctx: &mut AiContext) {
        self.target = None;
        self.pursuit.reset();
        if let Some(squad) = ctx.squad() {
            squad::clear_squad_target(ctx.world, squad);
        }
    }
}

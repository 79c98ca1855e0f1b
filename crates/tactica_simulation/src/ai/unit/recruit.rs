//! UnitRecruit — Independent ищет отряд: вступает к лидеру или (Leader-type)
//! основывает новый отряд с найденным одиночкой

use bevy::prelude::*;

use crate::ai::context::AiContext;
use crate::ai::fsm::{AiState, StateId, Transition};
use crate::ai::perception;
use crate::components::{Agent, SquadLink};
use crate::config::TacticsConfig;
use crate::logger;
use crate::squad::{self, Squad};

#[derive(Debug, Default)]
pub struct UnitRecruitState {
    target: Option<Entity>,
}

fn is_leader_type(world: &World, agent: Entity) -> bool {
    world.get::<Agent>(agent).is_some_and(Agent::is_leader_type)
}

/// Отряд, который `leader` возглавляет и в котором есть место
fn open_squad_led_by(world: &World, leader: Entity) -> Option<Entity> {
    let squad = squad::squad_of(world, leader)?;
    let state = world.get::<Squad>(squad)?;
    (state.leader() == Some(leader) && !state.is_full()).then_some(squad)
}

/// Ближайший союзник, через которого можно попасть в отряд: лидер неполного
/// отряда в его recruitment range, либо (для Leader-type) Independent одиночка.
pub fn find_recruit_target(world: &World, seeker: Entity) -> Option<Entity> {
    let origin = perception::position(world, seeker)?;
    let joinable = perception::find_joinable_leader(world, seeker);
    let founding = if is_leader_type(world, seeker) {
        let range = world
            .get_resource::<TacticsConfig>()
            .copied()
            .unwrap_or_default()
            .squad
            .recruitment_range;
        perception::find_independent_ally(world, seeker, range)
    } else {
        None
    };

    [joinable, founding]
        .into_iter()
        .flatten()
        .filter_map(|candidate| {
            perception::position(world, candidate).map(|p| (candidate, origin.distance(p)))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(candidate, _)| candidate)
}

/// Цель валидна, пока сохраняется отношение, по которому её выбрали
pub fn is_valid_recruit_target(world: &World, seeker: Entity, target: Entity) -> bool {
    if !perception::is_alive(world, target) {
        return false;
    }
    let target_independent = world
        .get::<SquadLink>(target)
        .is_some_and(SquadLink::is_independent);

    open_squad_led_by(world, target).is_some()
        || (is_leader_type(world, seeker) && target_independent)
}

impl AiState for UnitRecruitState {
    fn id(&self) -> StateId {
        StateId::UnitRecruit
    }

    fn enter(&mut self, ctx: &mut AiContext) -> Transition {
        self.target = find_recruit_target(ctx.world, ctx.agent);
        Transition::Stay
    }

    fn update(&mut self, ctx: &mut AiContext) -> Transition {
        if !ctx.is_independent(ctx.agent) {
            return Transition::To(StateId::UnitFollow);
        }
        let Some(target) = self
            .target
            .filter(|&t| is_valid_recruit_target(ctx.world, ctx.agent, t))
        else {
            return Transition::To(StateId::UnitFollow);
        };
        let Some(target_position) = ctx.position_of(target) else {
            return Transition::To(StateId::UnitFollow);
        };

        let join_distance = ctx.unit_tuning().recruit_join_distance;
        if ctx.position().distance(target_position) <= join_distance {
            if let Some(open) = open_squad_led_by(ctx.world, target) {
                if squad::try_add_member(ctx.world, open, ctx.agent).is_ok() {
                    return Transition::To(StateId::UnitFollow);
                }
            } else if is_leader_type(ctx.world, ctx.agent) {
                let founded = squad::create_squad(ctx.world, ctx.agent);
                if let Err(err) = squad::try_add_member(ctx.world, founded, target) {
                    logger::log_warning(&format!(
                        "Squad {:?}: founding member {:?} rejected: {}",
                        founded, target, err
                    ));
                }
                return Transition::To(StateId::UnitFollow);
            }
        }

        ctx.move_to(target_position);
        Transition::Stay
    }

    fn exit(&mut self, _ctx: &mut AiContext) {
        self.target = None;
    }
}

//! Восприятие: конус зрения + line-of-sight, поиск врагов и рекрутов
//!
//! Все сканы — O(n) по AgentRegistry, в порядке регистрации.

use bevy::prelude::*;

use super::fsm::{self, StateId};
use crate::components::{Agent, Health, Healer, SquadLink, Vision};
use crate::shared::{AgentRegistry, ObstacleQuery, Obstacles};
use crate::squad::{self, Squad};

/// Высота "глаз" над позицией агента для LOS
const EYE_HEIGHT: f32 = 0.5;

pub fn is_alive(world: &World, entity: Entity) -> bool {
    world.get::<Health>(entity).is_some_and(|h| h.is_alive())
}

pub fn position(world: &World, entity: Entity) -> Option<Vec3> {
    world.get::<Transform>(entity).map(|t| t.translation)
}

fn agents(world: &World) -> impl Iterator<Item = Entity> + '_ {
    world
        .get_resource::<AgentRegistry>()
        .into_iter()
        .flat_map(AgentRegistry::iter)
}

fn are_hostile(world: &World, a: Entity, b: Entity) -> bool {
    match (world.get::<Agent>(a), world.get::<Agent>(b)) {
        (Some(a), Some(b)) => a.faction.is_hostile_to(b.faction),
        _ => false,
    }
}

fn same_faction(world: &World, a: Entity, b: Entity) -> bool {
    match (world.get::<Agent>(a), world.get::<Agent>(b)) {
        (Some(a), Some(b)) => a.faction == b.faction,
        _ => false,
    }
}

/// Видит ли observer цель: живая, в радиусе, в пол-угла от взгляда, LOS свободен
pub fn can_see(world: &World, observer: Entity, target: Entity) -> bool {
    if !is_alive(world, target) {
        return false;
    }
    let (Some(transform), Some(vision), Some(target_position)) = (
        world.get::<Transform>(observer),
        world.get::<Vision>(observer),
        position(world, target),
    ) else {
        return false;
    };

    let to_target = target_position - transform.translation;
    let distance = to_target.length();
    if distance > vision.range {
        return false;
    }
    if distance <= f32::EPSILON {
        return true;
    }

    let angle = transform
        .forward()
        .as_vec3()
        .angle_between(to_target)
        .to_degrees();
    if angle > vision.half_angle() {
        return false;
    }

    let Some(obstacles) = world.get_resource::<Obstacles>() else {
        return true;
    };
    let eye = Vec3::Y * EYE_HEIGHT;
    !obstacles.linecast(transform.translation + eye, target_position + eye)
}

/// Все видимые живые враги
pub fn visible_enemies(world: &World, observer: Entity) -> Vec<Entity> {
    agents(world)
        .filter(|&other| other != observer)
        .filter(|&other| are_hostile(world, observer, other))
        .filter(|&other| can_see(world, observer, other))
        .collect()
}

/// Ближайший видимый враг и дистанция до него
pub fn closest_visible_enemy(world: &World, observer: Entity) -> Option<(Entity, f32)> {
    let origin = position(world, observer)?;
    visible_enemies(world, observer)
        .into_iter()
        .filter_map(|enemy| position(world, enemy).map(|p| (enemy, origin.distance(p))))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

/// Ближайший живой враг в радиусе, без проверки зрения (ответ на удар в спину)
pub fn nearest_enemy_within(world: &World, observer: Entity, radius: f32) -> Option<Entity> {
    let origin = position(world, observer)?;
    agents(world)
        .filter(|&other| other != observer && is_alive(world, other))
        .filter(|&other| are_hostile(world, observer, other))
        .filter_map(|other| position(world, other).map(|p| (other, origin.distance(p))))
        .filter(|&(_, distance)| distance <= radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(enemy, _)| enemy)
}

/// Есть ли вообще живые враги на арене
pub fn any_enemies_alive(world: &World, observer: Entity) -> bool {
    agents(world).any(|other| {
        other != observer && is_alive(world, other) && are_hostile(world, observer, other)
    })
}

/// Independent союзник для вербовки: отряд recruiter'а существует и не полон,
/// кандидат в пределах recruitment_range отряда.
pub fn find_recruitable(world: &World, recruiter: Entity) -> Option<Entity> {
    let squad = squad::squad_of(world, recruiter)?;
    let state = world.get::<Squad>(squad)?;
    if state.is_full() {
        return None;
    }
    let origin = position(world, recruiter)?;

    agents(world).find(|&other| {
        other != recruiter
            && is_alive(world, other)
            && same_faction(world, recruiter, other)
            && world
                .get::<SquadLink>(other)
                .is_some_and(SquadLink::is_independent)
            && position(world, other)
                .is_some_and(|p| origin.distance(p) <= state.recruitment_range)
    })
}

/// Союзный лидер с неполным отрядом, в пределах recruitment_range его отряда
pub fn find_joinable_leader(world: &World, seeker: Entity) -> Option<Entity> {
    let origin = position(world, seeker)?;

    agents(world)
        .filter(|&other| other != seeker && is_alive(world, other))
        .filter(|&other| same_faction(world, seeker, other))
        .filter_map(|other| {
            let squad = squad::squad_of(world, other)?;
            let state = world.get::<Squad>(squad)?;
            let distance = origin.distance(position(world, other)?);
            (state.leader() == Some(other) && !state.is_full() && distance <= state.recruitment_range)
                .then_some((other, distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(leader, _)| leader)
}

/// Ближайший живой Independent союзник в радиусе (основа нового отряда)
pub fn find_independent_ally(world: &World, seeker: Entity, radius: f32) -> Option<Entity> {
    let origin = position(world, seeker)?;

    agents(world)
        .filter(|&other| other != seeker && is_alive(world, other))
        .filter(|&other| same_faction(world, seeker, other))
        .filter(|&other| {
            world
                .get::<SquadLink>(other)
                .is_some_and(SquadLink::is_independent)
        })
        .filter_map(|other| position(world, other).map(|p| (other, origin.distance(p))))
        .filter(|&(_, distance)| distance <= radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(ally, _)| ally)
}

/// Союзный Leader-type в LeaderHeal, с местом в отряде, в пределах своего healing range
pub fn find_healing_leader(world: &World, seeker: Entity) -> Option<Entity> {
    let origin = position(world, seeker)?;

    agents(world).find(|&other| {
        other != seeker
            && is_alive(world, other)
            && same_faction(world, seeker, other)
            && world
                .get::<Agent>(other)
                .is_some_and(Agent::is_leader_type)
            && squad::squad_of(world, other)
                .and_then(|s| world.get::<Squad>(s))
                .is_some_and(|state| !state.is_full())
            && fsm::is_in_state(world, other, StateId::LeaderHeal)
            && match (position(world, other), world.get::<Healer>(other)) {
                (Some(p), Some(healer)) => origin.distance(p) <= healer.range,
                _ => false,
            }
    })
}

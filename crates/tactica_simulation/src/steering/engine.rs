//! Steering поверх World: snapshot агента → суммарная сила → commit
//!
//! Кэш пути на время расчёта вынимается из `Steering` (mem::take), чтобы
//! читать grid/obstacles из World без конфликтов заимствования.

use bevy::prelude::*;

use super::behaviors::{
    decelerate, integrate, obstacle_avoidance, seek, squad_flocking, Neighbour,
};
use crate::ai::perception;
use crate::components::{RouteCache, SquadLink, Steering, SteeringConfig};
use crate::navigation::NavGrid;
use crate::shared::{Obstacles, SimClock};
use crate::squad::Squad;

const MOVE_SEEK_WEIGHT: f32 = 1.0;
const MOVE_FLOCKING_WEIGHT: f32 = 0.8;
const FLEE_SEEK_WEIGHT: f32 = -1.5;
const FLEE_FLOCKING_WEIGHT: f32 = 0.5;
const AVOIDANCE_WEIGHT: f32 = 2.0;
const CLOSE_COMBAT_AVOIDANCE_WEIGHT: f32 = 3.0;

/// Снимок всего, что нужно для одного steering шага
struct SteeringFrame {
    transform: Transform,
    velocity: Vec3,
    config: SteeringConfig,
    now: f32,
    delta: f32,
}

impl SteeringFrame {
    fn capture(world: &World, agent: Entity) -> Option<Self> {
        let clock = world.get_resource::<SimClock>().copied().unwrap_or_default();
        Some(Self {
            transform: *world.get::<Transform>(agent)?,
            velocity: world.get::<Steering>(agent)?.velocity,
            config: world.get::<SteeringConfig>(agent).copied().unwrap_or_default(),
            now: clock.elapsed,
            delta: clock.delta,
        })
    }

    fn position(&self) -> Vec3 {
        self.transform.translation
    }

    /// Avoidance с учётом ближнего боя (видимый враг ближе close_combat_distance)
    fn avoidance(&self, world: &World, agent: Entity) -> Vec3 {
        let Some(obstacles) = world.get_resource::<Obstacles>() else {
            return Vec3::ZERO;
        };
        let close_combat = perception::closest_visible_enemy(world, agent)
            .is_some_and(|(_, distance)| distance <= self.config.close_combat_distance);

        let force = obstacle_avoidance(&self.transform, &self.config, close_combat, obstacles);
        if close_combat {
            force * CLOSE_COMBAT_AVOIDANCE_WEIGHT
        } else {
            force * AVOIDANCE_WEIGHT
        }
    }

    fn flocking(&self, world: &World, agent: Entity) -> Vec3 {
        let neighbours = squad_neighbours(world, agent, self.position(), self.config.flock_radius);
        squad_flocking(self.position(), self.velocity, &neighbours, &self.config)
    }

    fn commit(self, world: &mut World, agent: Entity, force: Vec3, route: Option<RouteCache>) {
        let mut transform = self.transform;
        let mut velocity = self.velocity;
        integrate(&mut transform, &mut velocity, force, self.delta, &self.config);
        write_back(world, agent, transform, velocity, route);
    }
}

/// Лидер + члены отряда в flock radius, кроме самого агента
fn squad_neighbours(world: &World, agent: Entity, position: Vec3, radius: f32) -> Vec<Neighbour> {
    let Some(squad) = world
        .get::<SquadLink>(agent)
        .and_then(|link| link.squad)
        .and_then(|s| world.get::<Squad>(s))
    else {
        return Vec::new();
    };

    squad
        .roster()
        .filter(|&other| other != agent)
        .filter_map(|other| {
            let neighbour_position = world.get::<Transform>(other)?.translation;
            let velocity = world.get::<Steering>(other)?.velocity;
            (position.distance(neighbour_position) <= radius).then_some(Neighbour {
                position: neighbour_position,
                velocity,
            })
        })
        .collect()
}

fn write_back(
    world: &mut World,
    agent: Entity,
    transform: Transform,
    velocity: Vec3,
    route: Option<RouteCache>,
) {
    if let Some(mut current) = world.get_mut::<Transform>(agent) {
        *current = transform;
    }
    if let Some(mut steering) = world.get_mut::<Steering>(agent) {
        steering.velocity = velocity;
        if let Some(route) = route {
            steering.route = route;
        }
    }
}

/// Движение к точке: дальше pathfinding_distance — через A* waypoint'ы
pub fn move_to(world: &mut World, agent: Entity, target: Vec3) {
    let Some(frame) = SteeringFrame::capture(world, agent) else {
        return;
    };
    let position = frame.position();
    let target = Vec3::new(target.x, position.y, target.z);

    let mut route = world
        .get_mut::<Steering>(agent)
        .map(|mut steering| std::mem::take(&mut steering.route))
        .unwrap_or_default();

    let world_view: &World = world;
    let seek_point = match world_view.get_resource::<NavGrid>() {
        Some(grid) if position.distance(target) > frame.config.pathfinding_distance => {
            route.next_waypoint(grid, position, target, frame.now, &frame.config)
        }
        _ => target,
    };

    let force = seek(position, frame.velocity, seek_point, &frame.config) * MOVE_SEEK_WEIGHT
        + frame.avoidance(world_view, agent)
        + frame.flocking(world_view, agent) * MOVE_FLOCKING_WEIGHT;

    frame.commit(world, agent, force, Some(route));
}

/// Бегство от точки опасности (seek с отрицательным весом)
pub fn flee(world: &mut World, agent: Entity, danger: Vec3) {
    let Some(frame) = SteeringFrame::capture(world, agent) else {
        return;
    };
    let position = frame.position();
    let danger = Vec3::new(danger.x, position.y, danger.z);

    let world_view: &World = world;
    let force = seek(position, frame.velocity, danger, &frame.config) * FLEE_SEEK_WEIGHT
        + frame.avoidance(world_view, agent)
        + frame.flocking(world_view, agent) * FLEE_FLOCKING_WEIGHT;

    frame.commit(world, agent, force, None);
}

/// Плавная остановка
pub fn stop(world: &mut World, agent: Entity) {
    let Some(frame) = SteeringFrame::capture(world, agent) else {
        return;
    };
    let mut transform = frame.transform;
    let mut velocity = frame.velocity;
    decelerate(&mut transform, &mut velocity, frame.delta);
    write_back(world, agent, transform, velocity, None);
}

/// Доворот к точке (slerp, скорость `turn_rate`)
pub fn face_towards(world: &mut World, agent: Entity, point: Vec3, turn_rate: f32) {
    let delta = world.get_resource::<SimClock>().map_or(0.0, |c| c.delta);
    let Some(mut transform) = world.get_mut::<Transform>(agent) else {
        return;
    };

    let direction = Vec3::new(
        point.x - transform.translation.x,
        0.0,
        point.z - transform.translation.z,
    );
    if direction.length() <= f32::EPSILON {
        return;
    }

    let look = Transform::IDENTITY.looking_to(direction.normalize(), Vec3::Y);
    let t = (delta * turn_rate).min(1.0);
    transform.rotation = transform.rotation.slerp(look.rotation, t);
}

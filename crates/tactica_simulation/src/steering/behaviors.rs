//! Steering примитивы
//!
//! Все силы clamp'ятся по `max_force`. Скорость живёт в плоскости XZ.

use bevy::prelude::*;

use crate::components::{RouteCache, SteeringConfig};
use crate::navigation::NavGrid;
use crate::shared::ObstacleQuery;

/// Ниже этой скорости агент считается стоящим (нет смещения и поворота)
pub const MIN_MOVING_SPEED: f32 = 0.1;
const STOP_DECAY_RATE: f32 = 3.0;

/// Сосед по отряду для flocking
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbour {
    pub position: Vec3,
    pub velocity: Vec3,
}

pub fn seek(position: Vec3, velocity: Vec3, target: Vec3, config: &SteeringConfig) -> Vec3 {
    let desired = (target - position).normalize_or_zero() * config.max_speed;
    (desired - velocity).clamp_length_max(config.max_force)
}

/// Лучи вперёд (в ближнем бою шире веер). Каждое попадание толкает вправо
/// пропорционально (radius − hit) / radius.
pub fn obstacle_avoidance(
    transform: &Transform,
    config: &SteeringConfig,
    close_combat: bool,
    obstacles: &impl ObstacleQuery,
) -> Vec3 {
    let forward = transform.forward().as_vec3();
    let right = transform.right().as_vec3();

    let mut rays = vec![forward, forward + right * 0.5, forward - right * 0.5];
    if close_combat {
        rays.push(forward + right);
        rays.push(forward - right);
    }

    let mut avoidance = Vec3::ZERO;
    for direction in rays {
        let Some(hit_distance) =
            obstacles.raycast(transform.translation, direction, config.avoidance_radius)
        else {
            continue;
        };

        let mut avoid_direction = Vec3::Y.cross(direction);
        if avoid_direction.dot(right) < 0.0 {
            avoid_direction = -avoid_direction;
        }

        let strength = (config.avoidance_radius - hit_distance) / config.avoidance_radius;
        avoidance += avoid_direction * strength * config.max_force;
    }

    avoidance
}

/// Separation + alignment + cohesion по соседям отряда (уже отфильтрованным по flock radius)
pub fn squad_flocking(
    position: Vec3,
    velocity: Vec3,
    neighbours: &[Neighbour],
    config: &SteeringConfig,
) -> Vec3 {
    if neighbours.is_empty() {
        return Vec3::ZERO;
    }

    separation(position, velocity, neighbours, config) * config.separation_weight
        + alignment(velocity, neighbours, config) * config.alignment_weight
        + cohesion(position, velocity, neighbours, config) * config.cohesion_weight
}

pub fn separation(
    position: Vec3,
    velocity: Vec3,
    neighbours: &[Neighbour],
    config: &SteeringConfig,
) -> Vec3 {
    let mut repulsion = Vec3::ZERO;
    let mut count = 0;

    for neighbour in neighbours {
        let distance = position.distance(neighbour.position);
        if distance > 0.0 && distance < config.flock_radius * 0.5 {
            repulsion += (position - neighbour.position).normalize_or_zero() / distance;
            count += 1;
        }
    }

    if count == 0 {
        return Vec3::ZERO;
    }

    let average = repulsion / count as f32;
    (average.normalize_or_zero() * config.max_speed - velocity).clamp_length_max(config.max_force)
}

pub fn alignment(velocity: Vec3, neighbours: &[Neighbour], config: &SteeringConfig) -> Vec3 {
    if neighbours.is_empty() {
        return Vec3::ZERO;
    }

    let average = neighbours.iter().map(|n| n.velocity).sum::<Vec3>() / neighbours.len() as f32;
    (average.normalize_or_zero() * config.max_speed - velocity).clamp_length_max(config.max_force)
}

pub fn cohesion(
    position: Vec3,
    velocity: Vec3,
    neighbours: &[Neighbour],
    config: &SteeringConfig,
) -> Vec3 {
    if neighbours.is_empty() {
        return Vec3::ZERO;
    }

    let centroid = neighbours.iter().map(|n| n.position).sum::<Vec3>() / neighbours.len() as f32;
    seek(position, velocity, centroid, config)
}

/// Euler шаг: force → velocity (clamp max_speed) → горизонтальное смещение + slerp поворот
pub fn integrate(
    transform: &mut Transform,
    velocity: &mut Vec3,
    force: Vec3,
    delta: f32,
    config: &SteeringConfig,
) {
    *velocity = (*velocity + force * delta).clamp_length_max(config.max_speed);
    velocity.y = 0.0;

    if velocity.length() <= MIN_MOVING_SPEED {
        return;
    }

    let horizontal = Vec3::new(velocity.x, 0.0, velocity.z);
    transform.translation += horizontal * delta;

    if horizontal.length() > MIN_MOVING_SPEED {
        let look = Transform::IDENTITY.looking_to(horizontal.normalize(), Vec3::Y);
        let t = (delta * config.rotation_speed).min(1.0);
        transform.rotation = transform.rotation.slerp(look.rotation, t);
    }
}

/// Плавная остановка: velocity экспоненциально → 0, остаточное смещение применяется
pub fn decelerate(transform: &mut Transform, velocity: &mut Vec3, delta: f32) {
    *velocity = velocity.lerp(Vec3::ZERO, (delta * STOP_DECAY_RATE).min(1.0));

    if velocity.length() > MIN_MOVING_SPEED {
        transform.translation += Vec3::new(velocity.x, 0.0, velocity.z) * delta;
    }
}

impl RouteCache {
    /// Следующий waypoint к `target`. Путь пересчитывается если его нет, цель
    /// сместилась > drift tolerance или истёк refresh interval. Пустой путь → сам target.
    pub fn next_waypoint(
        &mut self,
        grid: &NavGrid,
        position: Vec3,
        target: Vec3,
        now: f32,
        config: &SteeringConfig,
    ) -> Vec3 {
        let stale = self.path.is_empty()
            || self.last_target.distance(target) > config.target_drift_tolerance
            || self
                .last_update
                .map_or(true, |last| now > last + config.path_refresh_interval);

        if stale {
            self.path = grid.find_path(position, target);
            self.index = 0;
            self.last_update = Some(now);
            self.last_target = target;
        }

        let Some(&current) = self.path.get(self.index) else {
            return target;
        };

        if position.distance(current) < config.waypoint_arrival_distance
            && self.index + 1 < self.path.len()
        {
            self.index += 1;
        }

        self.path.get(self.index).copied().unwrap_or(target)
    }
}

//! Movement компоненты: steering state и параметры движения

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Параметры steering движка (per-agent)
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(default)]
pub struct SteeringConfig {
    pub max_speed: f32,
    pub max_force: f32,
    pub rotation_speed: f32,
    pub avoidance_radius: f32,
    pub flock_radius: f32,
    pub separation_weight: f32,
    pub alignment_weight: f32,
    pub cohesion_weight: f32,
    /// Дальше этой дистанции moveTo идёт по A* waypoint'ам
    pub pathfinding_distance: f32,
    pub waypoint_arrival_distance: f32,
    pub path_refresh_interval: f32,
    /// Цель сместилась дальше → пересчитать путь
    pub target_drift_tolerance: f32,
    /// Видимый враг ближе → ближний бой (больше лучей, сильнее avoidance)
    pub close_combat_distance: f32,
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            max_speed: 5.0,
            max_force: 3.0,
            rotation_speed: 5.0,
            avoidance_radius: 2.0,
            flock_radius: 5.0,
            separation_weight: 1.5,
            alignment_weight: 1.0,
            cohesion_weight: 1.0,
            pathfinding_distance: 10.0,
            waypoint_arrival_distance: 1.5,
            path_refresh_interval: 1.0,
            target_drift_tolerance: 2.0,
            close_combat_distance: 8.0,
        }
    }
}

/// Кэш пути moveTo (waypoint follower)
#[derive(Debug, Clone, Default)]
pub struct RouteCache {
    pub path: Vec<Vec3>,
    pub index: usize,
    pub last_update: Option<f32>,
    pub last_target: Vec3,
}

impl RouteCache {
    pub fn clear(&mut self) {
        self.path.clear();
        self.index = 0;
        self.last_update = None;
    }
}

/// Steering state: текущая скорость (y = 0) + кэш пути
#[derive(Component, Debug, Clone, Default)]
pub struct Steering {
    pub velocity: Vec3,
    pub route: RouteCache,
}

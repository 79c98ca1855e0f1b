//! Статическая геометрия препятствий
//!
//! Препятствия — вертикальные колонны бесконечной высоты: вся геометрия
//! считается в плоскости XZ, координата y игнорируется.

use bevy::prelude::*;

/// Запросы к геометрии (grid walkability, LOS, avoidance rays, path smoothing)
pub trait ObstacleQuery {
    /// Пересекает ли сфера хоть одно препятствие
    fn check_sphere(&self, point: Vec3, radius: f32) -> bool;

    /// Дистанция до ближайшего попадания луча (направление нормализуется)
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<f32>;

    /// Пересекает ли отрезок препятствие
    fn linecast(&self, from: Vec3, to: Vec3) -> bool {
        let delta = to - from;
        let distance = Vec2::new(delta.x, delta.z).length();
        if distance <= f32::EPSILON {
            return self.check_sphere(from, 0.0);
        }
        self.raycast(from, delta, distance).is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Obstacle {
    /// Круглая колонна
    Pillar { center: Vec2, radius: f32 },
    /// Axis-aligned блок (min/max в XZ)
    Block { min: Vec2, max: Vec2 },
}

impl Obstacle {
    pub fn pillar(x: f32, z: f32, radius: f32) -> Self {
        Self::Pillar {
            center: Vec2::new(x, z),
            radius,
        }
    }

    pub fn block(min_x: f32, min_z: f32, max_x: f32, max_z: f32) -> Self {
        Self::Block {
            min: Vec2::new(min_x.min(max_x), min_z.min(max_z)),
            max: Vec2::new(min_x.max(max_x), min_z.max(max_z)),
        }
    }

    fn overlaps_circle(&self, point: Vec2, radius: f32) -> bool {
        match self {
            Obstacle::Pillar { center, radius: r } => point.distance(*center) <= r + radius,
            Obstacle::Block { min, max } => {
                let closest = point.clamp(*min, *max);
                point.distance(closest) <= radius
            }
        }
    }

    /// Ray vs shape, `direction` уже нормализован
    fn ray_hit(&self, origin: Vec2, direction: Vec2, max_distance: f32) -> Option<f32> {
        match self {
            Obstacle::Pillar { center, radius } => {
                let offset = origin - *center;
                let c = offset.length_squared() - radius * radius;
                if c <= 0.0 {
                    return Some(0.0);
                }
                let b = offset.dot(direction);
                if b > 0.0 {
                    return None;
                }
                let discriminant = b * b - c;
                if discriminant < 0.0 {
                    return None;
                }
                let t = -b - discriminant.sqrt();
                (t <= max_distance).then_some(t.max(0.0))
            }
            Obstacle::Block { min, max } => {
                let mut t_min = 0.0_f32;
                let mut t_max = max_distance;

                for axis in 0..2 {
                    let (o, d, lo, hi) = (origin[axis], direction[axis], min[axis], max[axis]);
                    if d.abs() < 1e-6 {
                        if o < lo || o > hi {
                            return None;
                        }
                        continue;
                    }
                    let t1 = (lo - o) / d;
                    let t2 = (hi - o) / d;
                    t_min = t_min.max(t1.min(t2));
                    t_max = t_max.min(t1.max(t2));
                    if t_min > t_max {
                        return None;
                    }
                }

                Some(t_min)
            }
        }
    }
}

/// Resource: все препятствия арены
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct Obstacles {
    shapes: Vec<Obstacle>,
}

impl Obstacles {
    pub fn new(shapes: Vec<Obstacle>) -> Self {
        Self { shapes }
    }

    pub fn add(&mut self, obstacle: Obstacle) {
        self.shapes.push(obstacle);
    }

    pub fn shapes(&self) -> &[Obstacle] {
        &self.shapes
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

fn flat(v: Vec3) -> Vec2 {
    Vec2::new(v.x, v.z)
}

impl ObstacleQuery for Obstacles {
    fn check_sphere(&self, point: Vec3, radius: f32) -> bool {
        let point = flat(point);
        self.shapes.iter().any(|s| s.overlaps_circle(point, radius))
    }

    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<f32> {
        let direction = flat(direction).normalize_or_zero();
        if direction == Vec2::ZERO {
            return None;
        }
        let origin = flat(origin);

        self.shapes
            .iter()
            .filter_map(|s| s.ray_hit(origin, direction, max_distance))
            .min_by(|a, b| a.total_cmp(b))
    }
}

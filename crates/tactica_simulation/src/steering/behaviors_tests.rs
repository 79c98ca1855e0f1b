//! Tests for steering primitives.

#[cfg(test)]
mod tests {
    use super::super::behaviors::*;
    use crate::components::{RouteCache, SteeringConfig};
    use crate::navigation::NavGrid;
    use crate::shared::{Obstacle, Obstacles};
    use bevy::prelude::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-3
    }

    fn facing_x() -> Transform {
        Transform::from_translation(Vec3::ZERO).looking_to(Vec3::X, Vec3::Y)
    }

    #[test]
    fn test_seek_is_clamped_to_max_force() {
        let config = SteeringConfig::default();
        let force = seek(Vec3::ZERO, Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), &config);
        assert!(approx(force, Vec3::new(3.0, 0.0, 0.0)));

        // Уже летим с нужной скоростью — сила нулевая
        let force = seek(Vec3::ZERO, Vec3::new(5.0, 0.0, 0.0), Vec3::new(10.0, 0.0, 0.0), &config);
        assert!(approx(force, Vec3::ZERO));
    }

    #[test]
    fn test_integrate_moves_and_turns() {
        let config = SteeringConfig::default();
        let mut transform = Transform::default();
        let mut velocity = Vec3::ZERO;

        integrate(&mut transform, &mut velocity, Vec3::new(3.0, 0.0, 0.0), 1.0, &config);

        assert!(approx(velocity, Vec3::new(3.0, 0.0, 0.0)));
        assert!(approx(transform.translation, Vec3::new(3.0, 0.0, 0.0)));
        // delta × rotation_speed ≥ 1 → поворот завершён
        assert!(approx(transform.forward().as_vec3(), Vec3::X));
    }

    #[test]
    fn test_integrate_clamps_speed_and_ignores_vertical() {
        let config = SteeringConfig::default();
        let mut transform = Transform::default();
        let mut velocity = Vec3::new(4.0, 0.0, 0.0);

        integrate(&mut transform, &mut velocity, Vec3::new(10.0, 7.0, 0.0), 1.0, &config);

        assert_eq!(velocity.y, 0.0);
        assert!(velocity.length() <= config.max_speed + 1e-4);
        assert_eq!(transform.translation.y, 0.0);
    }

    #[test]
    fn test_integrate_below_threshold_does_not_move() {
        let config = SteeringConfig::default();
        let mut transform = Transform::default();
        let mut velocity = Vec3::ZERO;

        integrate(&mut transform, &mut velocity, Vec3::new(0.05, 0.0, 0.0), 1.0, &config);

        assert_eq!(transform.translation, Vec3::ZERO);
        assert_eq!(transform.rotation, Quat::IDENTITY);
    }

    #[test]
    fn test_decelerate_is_gradual() {
        let mut transform = Transform::default();
        let mut velocity = Vec3::new(4.0, 0.0, 0.0);

        decelerate(&mut transform, &mut velocity, 0.1);

        assert!(approx(velocity, Vec3::new(2.8, 0.0, 0.0)));
        assert!(approx(transform.translation, Vec3::new(0.28, 0.0, 0.0)));

        // Остаточная скорость ниже порога — смещения нет
        let mut slow = Vec3::new(0.1, 0.0, 0.0);
        let before = transform.translation;
        decelerate(&mut transform, &mut slow, 0.1);
        assert_eq!(transform.translation, before);
    }

    #[test]
    fn test_obstacle_avoidance_pushes_right() {
        let config = SteeringConfig::default();
        let obstacles = Obstacles::new(vec![Obstacle::pillar(1.5, 0.0, 0.5)]);
        let transform = facing_x();

        let force = obstacle_avoidance(&transform, &config, false, &obstacles);

        // Луч вперёд бьёт на дистанции 1 → (2 − 1) / 2 × max_force вправо
        let right = transform.right().as_vec3();
        assert!(approx(force, right * 1.5));
    }

    #[test]
    fn test_obstacle_avoidance_clear_path() {
        let config = SteeringConfig::default();
        let obstacles = Obstacles::new(vec![Obstacle::pillar(-5.0, 0.0, 0.5)]);

        let force = obstacle_avoidance(&facing_x(), &config, true, &obstacles);
        assert_eq!(force, Vec3::ZERO);
    }

    #[test]
    fn test_separation_repels_close_neighbour() {
        let config = SteeringConfig::default();
        let neighbours = [Neighbour {
            position: Vec3::new(1.0, 0.0, 0.0),
            velocity: Vec3::ZERO,
        }];

        let force = separation(Vec3::ZERO, Vec3::ZERO, &neighbours, &config);
        assert!(approx(force, Vec3::new(-3.0, 0.0, 0.0)));
    }

    #[test]
    fn test_cohesion_and_alignment() {
        let config = SteeringConfig::default();
        let neighbours = [
            Neighbour {
                position: Vec3::new(4.0, 0.0, 2.0),
                velocity: Vec3::new(0.0, 0.0, 2.0),
            },
            Neighbour {
                position: Vec3::new(4.0, 0.0, -2.0),
                velocity: Vec3::new(0.0, 0.0, 4.0),
            },
        ];

        let cohesion = cohesion(Vec3::ZERO, Vec3::ZERO, &neighbours, &config);
        assert!(approx(cohesion, Vec3::new(3.0, 0.0, 0.0)));

        let alignment = alignment(Vec3::ZERO, &neighbours, &config);
        assert!(approx(alignment, Vec3::new(0.0, 0.0, 3.0)));

        assert_eq!(squad_flocking(Vec3::ZERO, Vec3::ZERO, &[], &config), Vec3::ZERO);
    }

    #[test]
    fn test_route_cache_follows_and_refreshes() {
        let config = SteeringConfig::default();
        let grid = NavGrid::build(Vec3::ZERO, Vec2::new(10.0, 10.0), 0.5, &Obstacles::default())
            .expect("grid");
        let start = Vec3::new(-4.5, 0.0, 0.5);
        let target = Vec3::new(4.5, 0.0, 0.5);

        let mut route = RouteCache::default();
        let waypoint = route.next_waypoint(&grid, start, target, 0.0, &config);

        // Путь [(-3.5, 0.5), (4.5, 0.5)]: первый waypoint ближе 1.5 → сразу следующий
        assert_eq!(route.path.len(), 2);
        assert_eq!(route.index, 1);
        assert_eq!(waypoint, target);

        // Индекс не уходит за последний waypoint
        let again = route.next_waypoint(&grid, target, target, 0.5, &config);
        assert_eq!(route.index, 1);
        assert_eq!(again, target);

        // Цель сместилась > 2 → пересчёт
        let moved = Vec3::new(4.5, 0.0, -3.5);
        route.next_waypoint(&grid, start, moved, 0.6, &config);
        assert_eq!(route.last_target, moved);
        assert_eq!(route.last_update, Some(0.6));
    }

    #[test]
    fn test_route_cache_falls_back_to_target() {
        let config = SteeringConfig::default();
        let obstacles = Obstacles::new(vec![Obstacle::pillar(4.5, 0.5, 0.3)]);
        let grid = NavGrid::build(Vec3::ZERO, Vec2::new(10.0, 10.0), 0.5, &obstacles).expect("grid");

        let target = Vec3::new(4.5, 0.0, 0.5);
        let mut route = RouteCache::default();
        let waypoint = route.next_waypoint(&grid, Vec3::new(-4.5, 0.0, 0.5), target, 0.0, &config);

        assert!(route.path.is_empty());
        assert_eq!(waypoint, target);
    }
}

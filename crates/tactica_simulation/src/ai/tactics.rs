//! Общая тактика состояний: подход к цели в бою, точки бегства и патруля

use bevy::prelude::*;

use super::context::AiContext;

/// Подход к цели на stand-off дистанцию (Leader/Unit Attack).
///
/// Ближе `direct_approach_distance` — прямой steering к точке на optimal
/// дистанции от цели; дальше — собственный A* путь состояния, пересчёт не
/// чаще `path_refresh_interval`.
#[derive(Debug, Default, Clone)]
pub struct Pursuit {
    path: Vec<Vec3>,
    index: usize,
    last_update: Option<f32>,
}

impl Pursuit {
    pub fn reset(&mut self) {
        self.path.clear();
        self.index = 0;
    }

    pub fn path(&self) -> &[Vec3] {
        &self.path
    }

    /// Пересчёт пути, если прошло больше refresh interval
    pub fn refresh(&mut self, ctx: &AiContext, target: Vec3) {
        let now = ctx.now();
        let interval = ctx.engage_tuning().path_refresh_interval;
        if self.last_update.is_some_and(|last| now <= last + interval) {
            return;
        }

        self.path = ctx.find_path(ctx.position(), target);
        self.index = 0;
        self.last_update = Some(now);
    }

    pub fn advance(&mut self, ctx: &mut AiContext, target: Entity) {
        let Some(target_position) = ctx.position_of(target) else {
            return;
        };
        let engage = ctx.engage_tuning();
        let position = ctx.position();
        let distance = position.distance(target_position);

        if distance <= engage.direct_approach_distance {
            let direction = (target_position - position).normalize_or_zero();
            let optimal = ctx.optimal_distance();

            if distance > optimal + engage.stand_off_tolerance {
                ctx.move_to(target_position - direction * optimal);
            } else if distance < optimal - engage.stand_off_tolerance {
                ctx.move_to(position - direction * engage.back_off_step);
            }
            // В окне stand-off просто держим позицию
            return;
        }

        self.refresh(ctx, target_position);

        if self.path.is_empty() {
            ctx.move_to(target_position);
            return;
        }

        if let Some(&waypoint) = self.path.get(self.index) {
            if position.distance(waypoint) < engage.waypoint_arrival_distance {
                self.index += 1;
            }
        }
        if let Some(&waypoint) = self.path.get(self.index) {
            ctx.move_to(waypoint);
        }
    }
}

/// Точка в `distance` от средней позиции видимых врагов (нет врагов → случайное
/// направление), прижатая к арене
pub fn flee_point(ctx: &mut AiContext, distance: f32) -> Vec3 {
    let position = ctx.position();
    let enemy_positions: Vec<Vec3> = ctx
        .visible_enemies()
        .into_iter()
        .filter_map(|enemy| ctx.position_of(enemy))
        .collect();

    let away = if enemy_positions.is_empty() {
        Vec3::ZERO
    } else {
        let average = enemy_positions.iter().copied().sum::<Vec3>() / enemy_positions.len() as f32;
        Vec3::new(position.x - average.x, 0.0, position.z - average.z).normalize_or_zero()
    };

    let direction = if away == Vec3::ZERO {
        ctx.random_direction()
    } else {
        away
    };
    ctx.clamp_to_arena(position + direction * distance)
}

/// Случайная точка на дистанции `range` (патруль лидера, roam)
pub fn random_destination(ctx: &mut AiContext, range: f32) -> Vec3 {
    let position = ctx.position();
    let direction = ctx.random_direction();
    ctx.clamp_to_arena(position + direction * range)
}

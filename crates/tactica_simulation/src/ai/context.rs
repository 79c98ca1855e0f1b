//! AiContext — доступ состояния FSM к миру от лица одного агента

use bevy::prelude::*;
use rand::Rng;
use std::f32::consts::TAU;

use super::fsm::{Brain, StateId};
use super::perception;
use super::roulette::{self, WeightedOption};
use crate::combat;
use crate::components::{Agent, Attacker, Healer, Health, SquadLink, SquadRole, UnitType};
use crate::config::{EngageTuning, LeaderTuning, TacticsConfig, UnitTuning};
use crate::navigation::NavGrid;
use crate::shared::SimClock;
use crate::squad::{self, Squad};
use crate::steering;
use crate::DeterministicRng;

pub struct AiContext<'w> {
    pub world: &'w mut World,
    pub agent: Entity,
}

impl<'w> AiContext<'w> {
    pub fn new(world: &'w mut World, agent: Entity) -> Self {
        Self { world, agent }
    }

    // === Время / конфиг ===

    pub fn now(&self) -> f32 {
        self.world.get_resource::<SimClock>().map_or(0.0, |c| c.elapsed)
    }

    pub fn delta(&self) -> f32 {
        self.world.get_resource::<SimClock>().map_or(0.0, |c| c.delta)
    }

    pub fn config(&self) -> TacticsConfig {
        self.world
            .get_resource::<TacticsConfig>()
            .copied()
            .unwrap_or_default()
    }

    pub fn leader_tuning(&self) -> LeaderTuning {
        self.config().leader
    }

    pub fn unit_tuning(&self) -> UnitTuning {
        self.config().unit
    }

    pub fn engage_tuning(&self) -> EngageTuning {
        self.config().engage
    }

    // === Сам агент ===

    pub fn position(&self) -> Vec3 {
        self.position_of(self.agent).unwrap_or(Vec3::ZERO)
    }

    pub fn position_of(&self, entity: Entity) -> Option<Vec3> {
        perception::position(self.world, entity)
    }

    pub fn health_percentage(&self) -> f32 {
        self.world
            .get::<Health>(self.agent)
            .map_or(0.0, Health::percentage)
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        perception::is_alive(self.world, entity)
    }

    pub fn unit_type(&self) -> UnitType {
        self.world
            .get::<Agent>(self.agent)
            .map_or(UnitType::Base, |a| a.unit_type)
    }

    pub fn role(&self) -> SquadRole {
        self.world
            .get::<SquadLink>(self.agent)
            .map_or(SquadRole::Independent, |link| link.role)
    }

    pub fn is_independent(&self, entity: Entity) -> bool {
        self.world
            .get::<SquadLink>(entity)
            .is_some_and(SquadLink::is_independent)
    }

    /// Отряд агента (только если entity отряда ещё жива)
    pub fn squad(&self) -> Option<Entity> {
        squad::squad_of(self.world, self.agent)
    }

    pub fn squad_state(&self) -> Option<&Squad> {
        self.squad().and_then(|s| self.world.get::<Squad>(s))
    }

    // === Восприятие ===

    pub fn visible_enemies(&self) -> Vec<Entity> {
        perception::visible_enemies(self.world, self.agent)
    }

    pub fn closest_visible_enemy(&self) -> Option<Entity> {
        perception::closest_visible_enemy(self.world, self.agent).map(|(enemy, _)| enemy)
    }

    pub fn can_see(&self, target: Entity) -> bool {
        perception::can_see(self.world, self.agent, target)
    }

    pub fn find_recruitable(&self) -> Option<Entity> {
        perception::find_recruitable(self.world, self.agent)
    }

    pub fn distance_to(&self, target: Entity) -> Option<f32> {
        self.position_of(target).map(|p| self.position().distance(p))
    }

    // === Бой ===

    pub fn in_attack_range(&self, target: Entity) -> bool {
        let range = self
            .world
            .get::<Attacker>(self.agent)
            .map_or(0.0, |a| a.range);
        self.distance_to(target).is_some_and(|d| d <= range)
    }

    pub fn can_attack(&self) -> bool {
        self.world
            .get::<Attacker>(self.agent)
            .is_some_and(Attacker::can_attack)
    }

    pub fn optimal_distance(&self) -> f32 {
        self.world
            .get::<Attacker>(self.agent)
            .map_or(0.0, |a| a.optimal_distance)
    }

    pub fn attack(&mut self, target: Entity) -> bool {
        combat::attack(self.world, self.agent, target)
    }

    // === Лечение ===

    pub fn healing_rate(&self) -> f32 {
        self.world.get::<Healer>(self.agent).map_or(0.0, |h| h.rate)
    }

    pub fn heal(&mut self, amount: u32) {
        combat::heal(self.world, self.agent, amount);
    }

    pub fn heal_nearby_allies(&mut self) -> usize {
        combat::heal_nearby_allies(self.world, self.agent)
    }

    // === Движение ===

    pub fn move_to(&mut self, target: Vec3) {
        steering::move_to(self.world, self.agent, target);
    }

    pub fn flee_from(&mut self, danger: Vec3) {
        steering::flee(self.world, self.agent, danger);
    }

    pub fn stop(&mut self) {
        steering::stop(self.world, self.agent);
    }

    pub fn face_towards(&mut self, point: Vec3, turn_rate: f32) {
        steering::face_towards(self.world, self.agent, point, turn_rate);
    }

    /// A* путь по grid'у; без grid'а — пустой (вызывающий идёт напрямую)
    pub fn find_path(&self, from: Vec3, to: Vec3) -> Vec<Vec3> {
        self.world
            .get_resource::<NavGrid>()
            .map_or_else(Vec::new, |grid| grid.find_path(from, to))
    }

    /// Прижимает точку к игровой зоне: grid pathfinder'а, иначе ±arena_half_extent
    pub fn clamp_to_arena(&self, point: Vec3) -> Vec3 {
        if let Some(grid) = self.world.get_resource::<NavGrid>() {
            return grid.clamp_to_grid(point);
        }
        let half = self.config().arena_half_extent;
        Vec3::new(point.x.clamp(-half, half), point.y, point.z.clamp(-half, half))
    }

    // === Random ===

    /// Равномерно в [0, 1)
    pub fn random_value(&mut self) -> f32 {
        match self.world.get_resource_mut::<DeterministicRng>() {
            Some(mut rng) => rng.rng.gen::<f32>(),
            None => 0.0,
        }
    }

    /// Случайное горизонтальное направление единичной длины
    pub fn random_direction(&mut self) -> Vec3 {
        let angle = self.random_value() * TAU;
        Vec3::new(angle.cos(), 0.0, angle.sin())
    }

    /// Weighted roulette на общем RNG симуляции
    pub fn select<T: Clone + Default>(&mut self, options: &[WeightedOption<T>]) -> T {
        match self.world.get_resource_mut::<DeterministicRng>() {
            Some(mut rng) => roulette::select_option(options, &mut rng.rng),
            None => roulette::select_with(options, 0.0),
        }
    }

    // === FSM bookkeeping ===

    pub(crate) fn record_state(&mut self, id: StateId) {
        if let Some(mut brain) = self.world.get_mut::<Brain>(self.agent) {
            brain.set_current(id);
        }
    }

    pub(crate) fn take_pending(&mut self) -> Option<StateId> {
        self.world
            .get_mut::<Brain>(self.agent)
            .and_then(|mut brain| brain.take_pending())
    }
}

//! Базовые компоненты агентов: Agent, Faction, UnitType, Health

use bevy::prelude::*;

use super::{Attacker, SquadLink, Steering, SteeringConfig, Vision};

/// Сторона конфликта
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub enum Faction {
    #[default]
    TeamA,
    TeamB,
}

impl Faction {
    pub fn is_hostile_to(self, other: Faction) -> bool {
        self != other
    }
}

/// Тип агента. Leader получает лидерский FSM и собственный отряд.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub enum UnitType {
    Leader,
    #[default]
    Base,
}

/// Агент тактической симуляции
///
/// Автоматически добавляет боевые/навигационные компоненты через Required Components.
/// `Healer` только у Leader-type, его вешает spawn.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
#[require(Health, Attacker, Vision, SquadLink, Steering, SteeringConfig, Transform)]
pub struct Agent {
    pub faction: Faction,
    pub unit_type: UnitType,
}

impl Agent {
    pub fn new(faction: Faction, unit_type: UnitType) -> Self {
        Self { faction, unit_type }
    }

    pub fn is_leader_type(&self) -> bool {
        self.unit_type == UnitType::Leader
    }
}

/// Здоровье агента
///
/// Инвариант: 0 ≤ current ≤ max, alive ⇔ current > 0
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: u32,
    pub max: u32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100)
    }
}

impl Health {
    pub fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    /// current / max в [0, 1]
    pub fn percentage(&self) -> f32 {
        if self.max == 0 {
            return 0.0;
        }
        self.current as f32 / self.max as f32
    }

    pub fn take_damage(&mut self, amount: u32) {
        self.current = self.current.saturating_sub(amount);
    }

    /// Мёртвых не лечим
    pub fn heal(&mut self, amount: u32) {
        if !self.is_alive() {
            return;
        }
        self.current = self.current.saturating_add(amount).min(self.max);
    }
}

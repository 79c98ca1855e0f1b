//! Боевые компоненты: Attacker, Vision, Healer

use bevy::prelude::*;

use crate::config::AgentProfile;

/// Характеристики атаки агента
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Attacker {
    pub damage: u32,

    /// Дистанция удара
    pub range: f32,

    /// Cooldown между атаками (секунды)
    pub cooldown: f32,

    /// Текущий cooldown таймер (уменьшается до 0)
    pub cooldown_timer: f32,

    /// Stand-off дистанция в ближнем бою
    pub optimal_distance: f32,
}

impl Default for Attacker {
    fn default() -> Self {
        Self::from_profile(&AgentProfile::default())
    }
}

impl Attacker {
    pub fn from_profile(profile: &AgentProfile) -> Self {
        Self {
            damage: profile.damage,
            range: profile.attack_range,
            cooldown: profile.attack_cooldown,
            cooldown_timer: 0.0,
            optimal_distance: profile.optimal_combat_distance,
        }
    }

    pub fn can_attack(&self) -> bool {
        self.cooldown_timer <= 0.0
    }

    pub fn start_cooldown(&mut self) {
        self.cooldown_timer = self.cooldown;
    }

    pub fn tick(&mut self, delta: f32) {
        if self.cooldown_timer > 0.0 {
            self.cooldown_timer = (self.cooldown_timer - delta).max(0.0);
        }
    }
}

/// Конус зрения
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Vision {
    pub range: f32,
    /// Полный угол (градусы)
    pub angle: f32,
}

impl Default for Vision {
    fn default() -> Self {
        let profile = AgentProfile::default();
        Self {
            range: profile.vision_range,
            angle: profile.vision_angle,
        }
    }
}

impl Vision {
    pub fn half_angle(&self) -> f32 {
        self.angle * 0.5
    }
}

/// Способность лечить союзников (используется лидером в Heal state)
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Healer {
    pub range: f32,
    pub rate: f32,
    /// Минимальный интервал между групповыми лечениями
    pub interval: f32,
    pub last_heal: Option<f32>,
}

impl Default for Healer {
    fn default() -> Self {
        Self::from_profile(&AgentProfile::default())
    }
}

impl Healer {
    pub fn from_profile(profile: &AgentProfile) -> Self {
        Self {
            range: profile.healing_range,
            rate: profile.healing_rate,
            interval: profile.healing_interval,
            last_heal: None,
        }
    }

    pub fn is_ready(&self, now: f32) -> bool {
        self.last_heal.map_or(true, |last| now - last >= self.interval)
    }

    /// Лечение за один групповой тик: round(rate × 0.5), минимум 1
    pub fn group_heal_amount(&self) -> u32 {
        ((self.rate * 0.5).round() as u32).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attacker_cooldown() {
        let mut attacker = Attacker::default();
        assert!(attacker.can_attack());

        attacker.start_cooldown();
        assert!(!attacker.can_attack());
        assert_eq!(attacker.cooldown_timer, 1.5);

        attacker.tick(1.0);
        assert!(!attacker.can_attack());

        attacker.tick(1.0);
        assert!(attacker.can_attack());
        assert_eq!(attacker.cooldown_timer, 0.0);
    }

    #[test]
    fn test_healer_rate_limit() {
        let mut healer = Healer::default();
        assert!(healer.is_ready(0.0));

        healer.last_heal = Some(10.0);
        assert!(!healer.is_ready(10.5));
        assert!(healer.is_ready(11.0));
    }

    #[test]
    fn test_group_heal_amount_minimum_one() {
        let mut healer = Healer::default();
        assert_eq!(healer.group_heal_amount(), 5);

        healer.rate = 0.4;
        assert_eq!(healer.group_heal_amount(), 1);
    }
}

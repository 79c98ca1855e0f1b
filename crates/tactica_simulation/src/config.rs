//! Tuning конфиг тактического AI
//!
//! Все пороги решений собраны здесь (serde, partial override из JSON).
//! Дефолты = боевой баланс.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid tactics config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Корневой конфиг (resource)
#[derive(Resource, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TacticsConfig {
    pub squad: SquadSettings,
    pub agent: AgentProfile,
    pub leader: LeaderTuning,
    pub unit: UnitTuning,
    pub engage: EngageTuning,
    /// Полуразмер арены, если pathfinder grid не построен
    pub arena_half_extent: f32,
}

impl Default for TacticsConfig {
    fn default() -> Self {
        Self {
            squad: SquadSettings::default(),
            agent: AgentProfile::default(),
            leader: LeaderTuning::default(),
            unit: UnitTuning::default(),
            engage: EngageTuning::default(),
            arena_half_extent: 25.0,
        }
    }
}

impl TacticsConfig {
    /// Парсит JSON override (отсутствующие поля = дефолты)
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SquadSettings {
    pub max_size: usize,
    pub recruitment_range: f32,
    pub cohesion_range: f32,
    pub fortify_damage_reduction: f32,
    pub report_cooldown: f32,
}

impl Default for SquadSettings {
    fn default() -> Self {
        Self {
            max_size: 4,
            recruitment_range: 10.0,
            cohesion_range: 5.0,
            fortify_damage_reduction: 0.3,
            report_cooldown: 2.0,
        }
    }
}

/// Стартовые статы агента (spawn)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentProfile {
    pub max_health: u32,
    pub damage: u32,
    pub attack_range: f32,
    pub attack_cooldown: f32,
    pub optimal_combat_distance: f32,
    pub vision_range: f32,
    /// Полный угол обзора в градусах
    pub vision_angle: f32,
    pub leader_vision_multiplier: f32,
    pub healing_range: f32,
    pub healing_rate: f32,
    pub healing_interval: f32,
}

impl Default for AgentProfile {
    fn default() -> Self {
        Self {
            max_health: 100,
            damage: 15,
            attack_range: 4.0,
            attack_cooldown: 1.5,
            optimal_combat_distance: 1.5,
            vision_range: 8.0,
            vision_angle: 90.0,
            leader_vision_multiplier: 1.5,
            healing_range: 6.0,
            healing_rate: 10.0,
            healing_interval: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaderTuning {
    /// Command: health <= threshold → Flee
    pub flee_health_threshold: f32,
    pub decision_interval: f32,
    pub patrol_interval: f32,
    pub patrol_range: f32,
    pub patrol_arrival_distance: f32,
    /// Attack enter: шанс уйти в Fortify
    pub fortify_chance: f32,
    /// Retreat без отряда: health < threshold
    pub solo_retreat_health: f32,
    /// Retreat: squad avg < threshold
    pub squad_retreat_average: f32,
    /// Retreat: health < critical && squad avg < critical_squad_average
    pub critical_health: f32,
    pub critical_squad_average: f32,
    pub flee_distance: f32,
    pub flee_arrival_distance: f32,
    pub safety_duration: f32,
    /// Command → Heal: squad avg < threshold
    pub heal_squad_threshold: f32,
    /// Command → Heal без отряда: health < threshold
    pub heal_solo_threshold: f32,
    pub heal_complete_squad: f32,
    pub heal_complete_solo: f32,
    /// Self-heal ×2 ниже этого порога
    pub self_heal_boost_threshold: f32,
    pub fortify_duration: f32,
    pub fortify_emergency_squad_average: f32,
    pub fortify_emergency_health: f32,
}

impl Default for LeaderTuning {
    fn default() -> Self {
        Self {
            flee_health_threshold: 0.15,
            decision_interval: 1.0,
            patrol_interval: 5.0,
            patrol_range: 15.0,
            patrol_arrival_distance: 3.0,
            fortify_chance: 0.3,
            solo_retreat_health: 0.25,
            squad_retreat_average: 0.20,
            critical_health: 0.15,
            critical_squad_average: 0.35,
            flee_distance: 15.0,
            flee_arrival_distance: 3.0,
            safety_duration: 3.0,
            heal_squad_threshold: 0.8,
            heal_solo_threshold: 0.6,
            heal_complete_squad: 0.9,
            heal_complete_solo: 0.95,
            self_heal_boost_threshold: 0.3,
            fortify_duration: 2.0,
            fortify_emergency_squad_average: 0.15,
            fortify_emergency_health: 0.10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitTuning {
    /// Follow / Attack: health <= threshold → Flee
    pub flee_health_threshold: f32,
    /// Roam: health <= threshold → Flee
    pub roam_flee_threshold: f32,
    pub report_cooldown: f32,
    pub wander_distance: f32,
    pub flee_distance: f32,
    pub flee_arrival_distance: f32,
    /// Длительность бегства при 0% HP
    pub flee_max_duration: f32,
    /// Длительность бегства при 100% HP
    pub flee_min_duration: f32,
    pub flee_hard_cap: f32,
    pub recruit_join_distance: f32,
    pub roam_range: f32,
    pub roam_interval: f32,
    pub roam_arrival_distance: f32,
    pub recruit_check_interval: f32,
}

impl Default for UnitTuning {
    fn default() -> Self {
        Self {
            flee_health_threshold: 0.25,
            roam_flee_threshold: 0.2,
            report_cooldown: 1.0,
            wander_distance: 5.0,
            flee_distance: 12.0,
            flee_arrival_distance: 3.0,
            flee_max_duration: 8.0,
            flee_min_duration: 3.0,
            flee_hard_cap: 15.0,
            recruit_join_distance: 3.0,
            roam_range: 20.0,
            roam_interval: 3.0,
            roam_arrival_distance: 3.0,
            recruit_check_interval: 2.0,
        }
    }
}

/// Подход к цели в бою (общий для Leader/Unit Attack)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngageTuning {
    /// Ближе этого — прямой stand-off, дальше — A* путь
    pub direct_approach_distance: f32,
    pub stand_off_tolerance: f32,
    pub back_off_step: f32,
    pub path_refresh_interval: f32,
    pub waypoint_arrival_distance: f32,
    pub face_turn_rate: f32,
}

impl Default for EngageTuning {
    fn default() -> Self {
        Self {
            direct_approach_distance: 8.0,
            stand_off_tolerance: 0.5,
            back_off_step: 0.5,
            path_refresh_interval: 0.5,
            waypoint_arrival_distance: 1.0,
            face_turn_rate: 5.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_balance() {
        let config = TacticsConfig::default();
        assert_eq!(config.squad.max_size, 4);
        assert_eq!(config.squad.recruitment_range, 10.0);
        assert_eq!(config.leader.fortify_chance, 0.3);
        assert_eq!(config.unit.flee_health_threshold, 0.25);
        assert_eq!(config.arena_half_extent, 25.0);
    }

    #[test]
    fn test_partial_json_override() {
        let config =
            TacticsConfig::from_json_str(r#"{ "squad": { "max_size": 6 }, "arena_half_extent": 40.0 }"#)
                .expect("valid json");

        assert_eq!(config.squad.max_size, 6);
        // Остальные поля squad — дефолтные
        assert_eq!(config.squad.cohesion_range, 5.0);
        assert_eq!(config.arena_half_extent, 40.0);
        assert_eq!(config.leader, LeaderTuning::default());
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(TacticsConfig::from_json_str("{ squad: ").is_err());
    }
}

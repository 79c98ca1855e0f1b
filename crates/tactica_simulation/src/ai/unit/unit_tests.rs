//! Tests for unit states: flee timing, roaming and joining squads.

#[cfg(test)]
mod tests {
    use super::super::{find_recruit_target, flee_duration, is_valid_recruit_target};
    use crate::ai::fsm::{self, Brain, StateId};
    use crate::ai::unit_brain;
    use crate::components::{Faction, Health, SquadLink, SquadRole, UnitType};
    use crate::config::{TacticsConfig, UnitTuning};
    use crate::init_simulation_world;
    use crate::shared::SimClock;
    use crate::spawn::{spawn_agent, spawn_leader, spawn_unit};
    use crate::squad::{self, Squad};
    use bevy::prelude::*;

    fn world() -> World {
        let mut world = World::new();
        init_simulation_world(&mut world, 5);
        world
    }

    fn advance(world: &mut World, seconds: f32) {
        world.resource_mut::<SimClock>().advance(seconds);
    }

    fn role(world: &World, agent: Entity) -> SquadRole {
        world.get::<SquadLink>(agent).expect("link").role
    }

    #[test]
    fn test_flee_duration_scales_with_health() {
        let tuning = UnitTuning::default();
        assert!((flee_duration(0.0, &tuning) - 8.0).abs() < 1e-5);
        assert!((flee_duration(1.0, &tuning) - 3.0).abs() < 1e-5);
        assert!((flee_duration(0.5, &tuning) - 5.5).abs() < 1e-5);

        let slow = UnitTuning {
            flee_max_duration: 30.0,
            ..tuning
        };
        assert_eq!(flee_duration(0.0, &slow), slow.flee_hard_cap);
    }

    /// Independent в Attack с врагом прямо перед собой (в attack range)
    fn engaged_unit(world: &mut World, health: u32) -> Entity {
        let unit = spawn_unit(world, Faction::TeamA, Vec3::ZERO);
        spawn_agent(world, Faction::TeamB, UnitType::Base, Vec3::new(0.0, 0.0, -3.0));
        world.get_mut::<Health>(unit).expect("health").current = health;
        fsm::force_state(world, unit, StateId::UnitAttack);
        unit
    }

    #[test]
    fn test_attack_flee_boundary_is_inclusive() {
        let mut world = world();
        let unit = engaged_unit(&mut world, 25);
        fsm::tick_agent(&mut world, unit);
        assert!(fsm::is_in_state(&world, unit, StateId::UnitFlee));

        let mut world = self::world();
        let unit = engaged_unit(&mut world, 26);
        fsm::tick_agent(&mut world, unit);
        assert!(fsm::is_in_state(&world, unit, StateId::UnitAttack));
    }

    #[test]
    fn test_follow_redirects_independent_to_roam() {
        let mut world = world();
        let unit = spawn_unit(&mut world, Faction::TeamA, Vec3::new(5.0, 0.0, 5.0));
        assert!(fsm::is_in_state(&world, unit, StateId::UnitFollow));

        fsm::tick_agent(&mut world, unit);
        assert!(fsm::is_in_state(&world, unit, StateId::UnitRoam));
    }

    #[test]
    fn test_roaming_unit_follows_after_being_recruited() {
        let mut world = world();
        let unit = spawn_unit(&mut world, Faction::TeamA, Vec3::new(5.0, 0.0, 5.0));
        fsm::tick_agent(&mut world, unit);
        assert!(fsm::is_in_state(&world, unit, StateId::UnitRoam));

        let leader = spawn_leader(&mut world, Faction::TeamA, Vec3::new(6.0, 0.0, 6.0));
        let squad_entity = squad::squad_of(&world, leader).expect("squad");
        squad::try_add_member(&mut world, squad_entity, unit).expect("recruited");

        fsm::tick_agent(&mut world, unit);
        assert!(fsm::is_in_state(&world, unit, StateId::UnitFollow));
        assert_eq!(role(&world, unit), SquadRole::Member);
    }

    #[test]
    fn test_recruit_target_validity() {
        let mut world = world();
        let leader = spawn_leader(&mut world, Faction::TeamA, Vec3::ZERO);
        let seeker = spawn_agent(&mut world, Faction::TeamA, UnitType::Base, Vec3::new(4.0, 0.0, 0.0));
        let loner = spawn_agent(&mut world, Faction::TeamA, UnitType::Base, Vec3::new(5.0, 0.0, 0.0));
        spawn_agent(&mut world, Faction::TeamB, UnitType::Leader, Vec3::new(3.0, 0.0, 0.0));

        assert_eq!(find_recruit_target(&world, seeker), Some(leader));
        assert!(is_valid_recruit_target(&world, seeker, leader));
        // Base юнит отряд с одиночкой не основывает
        assert!(!is_valid_recruit_target(&world, seeker, loner));

        // Полный отряд больше не цель
        let squad_entity = squad::squad_of(&world, leader).expect("squad");
        for x in [-1.0, -2.0, -3.0] {
            let filler = spawn_agent(&mut world, Faction::TeamA, UnitType::Base, Vec3::new(x, 0.0, 0.0));
            squad::try_add_member(&mut world, squad_entity, filler).expect("joins");
        }
        assert!(world.get::<Squad>(squad_entity).expect("squad").is_full());
        assert!(!is_valid_recruit_target(&world, seeker, leader));
    }

    #[test]
    fn test_recruit_joins_open_squad() {
        let mut world = world();
        let leader = spawn_leader(&mut world, Faction::TeamA, Vec3::new(10.0, 0.0, 0.0));
        let unit = spawn_unit(&mut world, Faction::TeamA, Vec3::new(8.0, 0.0, 0.0));

        fsm::force_state(&mut world, unit, StateId::UnitRecruit);
        fsm::tick_agent(&mut world, unit);

        assert!(fsm::is_in_state(&world, unit, StateId::UnitFollow));
        assert_eq!(role(&world, unit), SquadRole::Member);
        assert_eq!(squad::squad_of(&world, unit), squad::squad_of(&world, leader));
    }

    #[test]
    fn test_leader_type_founds_squad_with_independent() {
        let mut world = world();
        let founder = spawn_agent(&mut world, Faction::TeamA, UnitType::Leader, Vec3::ZERO);
        world.entity_mut(founder).insert(Brain::new(unit_brain()));
        let loner = spawn_agent(&mut world, Faction::TeamA, UnitType::Base, Vec3::new(2.0, 0.0, 0.0));

        assert_eq!(find_recruit_target(&world, founder), Some(loner));
        fsm::start(&mut world, founder, StateId::UnitRecruit);
        fsm::tick_agent(&mut world, founder);

        assert!(fsm::is_in_state(&world, founder, StateId::UnitFollow));
        assert_eq!(role(&world, founder), SquadRole::Leader);
        assert_eq!(role(&world, loner), SquadRole::Member);
        assert_eq!(squad::squad_of(&world, loner), squad::squad_of(&world, founder));
    }

    #[test]
    fn test_flee_ends_in_roam_after_duration() {
        let mut world = world();
        let unit = spawn_unit(&mut world, Faction::TeamA, Vec3::new(5.0, 0.0, 5.0));
        // 100% HP → 3 секунды бегства
        fsm::force_state(&mut world, unit, StateId::UnitFlee);

        advance(&mut world, 2.0);
        fsm::tick_agent(&mut world, unit);
        assert!(fsm::is_in_state(&world, unit, StateId::UnitFlee));

        advance(&mut world, 1.5);
        fsm::tick_agent(&mut world, unit);
        assert!(fsm::is_in_state(&world, unit, StateId::UnitRoam));
        assert_eq!(role(&world, unit), SquadRole::Independent);
    }

    #[test]
    fn test_flee_is_capped_by_hard_limit() {
        let mut world = world();
        {
            let mut config = world.resource_mut::<TacticsConfig>();
            config.unit.flee_min_duration = 30.0;
            config.unit.flee_max_duration = 30.0;
        }
        let unit = spawn_unit(&mut world, Faction::TeamA, Vec3::new(5.0, 0.0, 5.0));
        fsm::force_state(&mut world, unit, StateId::UnitFlee);

        advance(&mut world, 14.0);
        fsm::tick_agent(&mut world, unit);
        assert!(fsm::is_in_state(&world, unit, StateId::UnitFlee));

        advance(&mut world, 1.5);
        fsm::tick_agent(&mut world, unit);
        assert!(fsm::is_in_state(&world, unit, StateId::UnitRoam));
    }

    #[test]
    fn test_fleeing_unit_shelters_with_healing_leader() {
        let mut world = world();
        let leader = spawn_leader(&mut world, Faction::TeamA, Vec3::ZERO);
        fsm::force_state(&mut world, leader, StateId::LeaderHeal);
        let unit = spawn_unit(&mut world, Faction::TeamA, Vec3::new(3.0, 0.0, 0.0));

        fsm::force_state(&mut world, unit, StateId::UnitFlee);
        fsm::tick_agent(&mut world, unit);

        assert!(fsm::is_in_state(&world, unit, StateId::UnitFollow));
        assert_eq!(squad::squad_of(&world, unit), squad::squad_of(&world, leader));
    }
}

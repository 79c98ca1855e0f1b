//! Tests for damage, death, attack cooldowns, healing and combat response.

#[cfg(test)]
mod tests {
    use crate::ai::{fsm, StateId};
    use crate::combat::{attack, heal_nearby_allies, take_damage, tick_attack_cooldowns, Casualties};
    use crate::combat::fortified_damage;
    use crate::components::{Faction, Healer, Health, SquadLink, SquadRole, UnitType};
    use crate::shared::{AgentRegistry, SimClock};
    use crate::spawn::{spawn_agent, spawn_leader, spawn_unit};
    use crate::squad::{self, Squad};
    use crate::init_simulation_world;
    use bevy::prelude::*;

    fn world() -> World {
        let mut world = World::new();
        init_simulation_world(&mut world, 7);
        world
    }

    /// Лидер + один член, оба с 200 HP
    fn fortified_pair(world: &mut World) -> (Entity, Entity, Entity) {
        let leader = spawn_agent(world, Faction::TeamA, UnitType::Leader, Vec3::ZERO);
        let member = spawn_agent(world, Faction::TeamA, UnitType::Base, Vec3::new(2.0, 0.0, 0.0));
        let squad_entity = squad::create_squad(world, leader);
        squad::try_add_member(world, squad_entity, member).expect("member joins");

        for agent in [leader, member] {
            *world.get_mut::<Health>(agent).expect("health") = Health::new(200);
        }
        squad::set_fortified(world, squad_entity, true);
        (squad_entity, leader, member)
    }

    #[test]
    fn test_fortified_damage_rounding() {
        assert_eq!(fortified_damage(100, 0.3), 70);
        assert_eq!(fortified_damage(15, 0.3), 11); // 10.5 → 11
        assert_eq!(fortified_damage(15, 0.0), 15);
    }

    #[test]
    fn test_fortified_member_takes_reduced_damage() {
        let mut world = world();
        let (_, leader, member) = fortified_pair(&mut world);

        assert_eq!(take_damage(&mut world, member, 100, None), 70);
        assert_eq!(world.get::<Health>(member).expect("health").current, 130);

        // Лидер фортификацией не защищён
        assert_eq!(take_damage(&mut world, leader, 100, None), 100);
        assert_eq!(world.get::<Health>(leader).expect("health").current, 100);
    }

    #[test]
    fn test_unfortified_member_takes_full_damage() {
        let mut world = world();
        let (squad_entity, _, member) = fortified_pair(&mut world);
        squad::set_fortified(&mut world, squad_entity, false);

        assert_eq!(take_damage(&mut world, member, 100, None), 100);
    }

    #[test]
    fn test_death_detaches_and_despawns() {
        let mut world = world();
        let (squad_entity, leader, member) = fortified_pair(&mut world);
        let killer = spawn_agent(&mut world, Faction::TeamB, UnitType::Base, Vec3::new(9.0, 0.0, 9.0));

        take_damage(&mut world, member, 1000, Some(killer));

        assert!(world.get_entity(member).is_err());
        assert!(!world.resource::<AgentRegistry>().contains(member));
        let state = world.get::<Squad>(squad_entity).expect("squad survives");
        assert_eq!(state.size(), 1);
        assert_eq!(state.leader(), Some(leader));

        let casualties = world.resource::<Casualties>();
        assert_eq!(casualties.count(Faction::TeamA), 1);
        assert_eq!(casualties.records[0].killer, Some(killer));
    }

    #[test]
    fn test_leader_death_promotes_member() {
        let mut world = world();
        let (squad_entity, leader, member) = fortified_pair(&mut world);

        take_damage(&mut world, leader, 1000, None);

        let state = world.get::<Squad>(squad_entity).expect("squad survives");
        assert_eq!(state.leader(), Some(member));
        assert!(state.members().is_empty());
        // Стойка ушла вместе с лидером
        assert!(!state.is_fortified());
        assert_eq!(
            world.get::<SquadLink>(member).expect("link").role,
            SquadRole::Leader
        );
    }

    #[test]
    fn test_last_agent_death_disbands_squad() {
        let mut world = world();
        let leader = spawn_agent(&mut world, Faction::TeamA, UnitType::Leader, Vec3::ZERO);
        let squad_entity = squad::create_squad(&mut world, leader);

        take_damage(&mut world, leader, 1000, None);

        assert!(world.get::<Squad>(squad_entity).is_none());
    }

    #[test]
    fn test_damage_to_dead_is_ignored() {
        let mut world = world();
        let agent = spawn_agent(&mut world, Faction::TeamA, UnitType::Base, Vec3::ZERO);
        world.get_mut::<Health>(agent).expect("health").current = 0;

        assert_eq!(take_damage(&mut world, agent, 10, None), 0);
    }

    #[test]
    fn test_attack_respects_cooldown() {
        let mut world = world();
        let attacker = spawn_agent(&mut world, Faction::TeamA, UnitType::Base, Vec3::ZERO);
        let target = spawn_agent(&mut world, Faction::TeamB, UnitType::Base, Vec3::new(0.0, 0.0, -2.0));

        assert!(attack(&mut world, attacker, target));
        assert_eq!(world.get::<Health>(target).expect("health").current, 85);
        assert!(!attack(&mut world, attacker, target));

        tick_attack_cooldowns(&mut world, 1.0);
        assert!(!attack(&mut world, attacker, target));
        tick_attack_cooldowns(&mut world, 0.5);
        assert!(attack(&mut world, attacker, target));
        assert_eq!(world.get::<Health>(target).expect("health").current, 70);

        assert!(!attack(&mut world, attacker, attacker));
    }

    #[test]
    fn test_heal_nearby_allies_is_rate_limited() {
        let mut world = world();
        let leader = spawn_agent(&mut world, Faction::TeamA, UnitType::Leader, Vec3::ZERO);
        let near = spawn_agent(&mut world, Faction::TeamA, UnitType::Base, Vec3::new(3.0, 0.0, 0.0));
        let far = spawn_agent(&mut world, Faction::TeamA, UnitType::Base, Vec3::new(20.0, 0.0, 0.0));
        let enemy = spawn_agent(&mut world, Faction::TeamB, UnitType::Base, Vec3::new(0.0, 0.0, 3.0));
        for agent in [near, far, enemy] {
            world.get_mut::<Health>(agent).expect("health").current = 50;
        }

        assert_eq!(heal_nearby_allies(&mut world, leader), 1);
        assert_eq!(world.get::<Health>(near).expect("health").current, 55);
        assert_eq!(world.get::<Health>(far).expect("health").current, 50);
        assert_eq!(world.get::<Health>(enemy).expect("health").current, 50);

        // Тот же момент времени — interval не прошёл
        assert_eq!(heal_nearby_allies(&mut world, leader), 0);

        world.resource_mut::<SimClock>().advance(1.0);
        assert_eq!(heal_nearby_allies(&mut world, leader), 1);

        // Base юнит не лечит
        assert_eq!(heal_nearby_allies(&mut world, near), 0);
    }

    #[test]
    fn test_only_leaders_carry_healer() {
        let mut world = world();
        let leader = spawn_agent(&mut world, Faction::TeamA, UnitType::Leader, Vec3::ZERO);
        let base = spawn_agent(&mut world, Faction::TeamA, UnitType::Base, Vec3::new(2.0, 0.0, 0.0));
        let unit = spawn_unit(&mut world, Faction::TeamB, Vec3::new(-2.0, 0.0, 0.0));

        assert!(world.get::<Healer>(leader).is_some());
        assert!(world.get::<Healer>(base).is_none());
        assert!(world.get::<Healer>(unit).is_none());
    }

    #[test]
    fn test_independent_retaliates_when_hit() {
        let mut world = world();
        // spawn в (0,0,0) смотрит в -Z, враг прямо перед ним
        let unit = spawn_unit(&mut world, Faction::TeamA, Vec3::ZERO);
        let enemy = spawn_agent(&mut world, Faction::TeamB, UnitType::Base, Vec3::new(0.0, 0.0, -3.0));
        assert!(fsm::is_in_state(&world, unit, StateId::UnitFollow));

        take_damage(&mut world, unit, 10, Some(enemy));

        assert!(fsm::is_in_state(&world, unit, StateId::UnitAttack));
    }

    #[test]
    fn test_leader_engages_when_hit() {
        let mut world = world();
        let leader = spawn_leader(&mut world, Faction::TeamA, Vec3::ZERO);
        // Враг за спиной, но в радиусе ответа (vision × 1.5)
        let enemy = spawn_agent(&mut world, Faction::TeamB, UnitType::Base, Vec3::new(0.0, 0.0, 10.0));
        assert!(fsm::is_in_state(&world, leader, StateId::LeaderCommand));

        take_damage(&mut world, leader, 10, Some(enemy));

        let state = fsm::current_state(&world, leader);
        assert!(matches!(
            state,
            Some(StateId::LeaderAttack | StateId::LeaderFortify)
        ));
    }
}

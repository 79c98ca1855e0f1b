//! Squad component

use bevy::prelude::*;

use crate::config::SquadSettings;

/// Отряд: лидер + упорядоченный список членов (порядок = слот формации)
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Squad {
    pub max_size: usize,
    pub recruitment_range: f32,
    pub cohesion_range: f32,
    pub fortify_damage_reduction: f32,
    pub report_cooldown: f32,

    pub(crate) leader: Option<Entity>,
    pub(crate) members: Vec<Entity>,
    pub(crate) fortified: bool,
    pub(crate) target: Option<Entity>,
    pub(crate) in_combat: bool,
    pub(crate) last_report: Option<f32>,
}

impl Default for Squad {
    fn default() -> Self {
        Self::new(&SquadSettings::default())
    }
}

impl Squad {
    pub fn new(settings: &SquadSettings) -> Self {
        Self {
            max_size: settings.max_size,
            recruitment_range: settings.recruitment_range,
            cohesion_range: settings.cohesion_range,
            fortify_damage_reduction: settings.fortify_damage_reduction,
            report_cooldown: settings.report_cooldown,
            leader: None,
            members: Vec::new(),
            fortified: false,
            target: None,
            in_combat: false,
            last_report: None,
        }
    }

    pub fn leader(&self) -> Option<Entity> {
        self.leader
    }

    /// Snapshot членов (без лидера)
    pub fn members(&self) -> Vec<Entity> {
        self.members.clone()
    }

    /// Лидер + члены
    pub fn roster(&self) -> impl Iterator<Item = Entity> + '_ {
        self.leader.into_iter().chain(self.members.iter().copied())
    }

    pub fn size(&self) -> usize {
        self.members.len() + usize::from(self.leader.is_some())
    }

    pub fn is_full(&self) -> bool {
        self.size() >= self.max_size
    }

    pub fn contains(&self, unit: Entity) -> bool {
        self.leader == Some(unit) || self.members.contains(&unit)
    }

    pub fn member_index(&self, unit: Entity) -> Option<usize> {
        self.members.iter().position(|&m| m == unit)
    }

    pub fn is_fortified(&self) -> bool {
        self.fortified
    }

    pub fn is_in_combat(&self) -> bool {
        self.in_combat
    }

    /// Сырой shared target. Живость не проверяется: сначала `has_valid_squad_target`.
    pub fn current_target(&self) -> Option<Entity> {
        self.target
    }

    /// Смещение слота формации: i·90° по кругу радиуса cohesion_range
    pub fn formation_offset(&self, index: usize) -> Vec3 {
        let angle = (index as f32 * 90.0).to_radians();
        Vec3::new(angle.cos(), 0.0, angle.sin()) * self.cohesion_range
    }

    pub fn can_report(&self, now: f32) -> bool {
        self.last_report
            .map_or(true, |last| now >= last + self.report_cooldown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_counts_leader() {
        let mut world = World::new();
        let leader = world.spawn_empty().id();
        let member = world.spawn_empty().id();

        let mut squad = Squad::default();
        assert_eq!(squad.size(), 0);

        squad.leader = Some(leader);
        squad.members.push(member);
        assert_eq!(squad.size(), 2);
        assert!(squad.contains(leader));
        assert_eq!(squad.roster().collect::<Vec<_>>(), vec![leader, member]);
        assert!(!squad.is_full());
    }

    #[test]
    fn test_formation_offsets() {
        let squad = Squad::default();
        let first = squad.formation_offset(0);
        let second = squad.formation_offset(1);

        assert!((first - Vec3::new(5.0, 0.0, 0.0)).length() < 1e-4);
        assert!((second - Vec3::new(0.0, 0.0, 5.0)).length() < 1e-4);
    }

    #[test]
    fn test_report_cooldown() {
        let mut squad = Squad::default();
        assert!(squad.can_report(0.0));

        squad.last_report = Some(3.0);
        assert!(!squad.can_report(4.0));
        assert!(squad.can_report(5.0));
    }
}

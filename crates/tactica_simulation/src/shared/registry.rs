//! Реестр агентов
//!
//! Порядок регистрации = порядок обновления FSM и сканирования (детерминизм).

use bevy::prelude::*;

#[derive(Resource, Debug, Clone, Default)]
pub struct AgentRegistry {
    agents: Vec<Entity>,
}

impl AgentRegistry {
    pub fn register(&mut self, agent: Entity) {
        if !self.agents.contains(&agent) {
            self.agents.push(agent);
        }
    }

    pub fn unregister(&mut self, agent: Entity) {
        self.agents.retain(|&e| e != agent);
    }

    pub fn contains(&self, agent: Entity) -> bool {
        self.agents.contains(&agent)
    }

    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.agents.iter().copied()
    }

    pub fn snapshot(&self) -> Vec<Entity> {
        self.agents.clone()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_keeps_order_and_uniqueness() {
        let mut world = World::new();
        let a = world.spawn_empty().id();
        let b = world.spawn_empty().id();

        let mut registry = AgentRegistry::default();
        registry.register(a);
        registry.register(b);
        registry.register(a);

        assert_eq!(registry.snapshot(), vec![a, b]);

        registry.unregister(a);
        assert_eq!(registry.snapshot(), vec![b]);
        assert!(!registry.contains(a));
    }
}

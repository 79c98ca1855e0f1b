//! Принадлежность агента к отряду

use bevy::prelude::*;

/// Роль в отряде
///
/// Инвариант: Independent ⇔ агент не упомянут ни в одном Squad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub enum SquadRole {
    Leader,
    Member,
    #[default]
    Independent,
}

/// Ссылка агента на отряд (weak: squad entity может исчезнуть)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct SquadLink {
    pub squad: Option<Entity>,
    pub role: SquadRole,
}

impl SquadLink {
    pub fn independent() -> Self {
        Self::default()
    }

    pub fn is_independent(&self) -> bool {
        self.role == SquadRole::Independent
    }
}

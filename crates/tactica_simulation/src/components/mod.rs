//! ECS Components для агентов
//!
//! Организация по доменам:
//! - actor: фракция, тип юнита, здоровье
//! - combat: атака, зрение, лечение
//! - squad: принадлежность к отряду (SquadLink, SquadRole)
//! - movement: steering state и параметры движения

pub mod actor;
pub mod combat;
pub mod movement;
pub mod squad;

// Re-exports для удобного импорта
pub use actor::*;
pub use combat::*;
pub use movement::*;
pub use squad::*;

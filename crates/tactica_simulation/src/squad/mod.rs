//! Squad domain — состав отряда, преемственность лидера, координация боя
//!
//! Отряд = отдельная entity с компонентом `Squad`. Агенты ссылаются на неё
//! через `SquadLink`; все изменения состава идут через функции roster'а,
//! чтобы роль агента и список отряда не расходились.

pub mod components;
pub mod coordination;
pub mod roster;


pub use components::Squad;
pub use coordination::*;
pub use roster::*;

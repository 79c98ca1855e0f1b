//! Shared domain — мировые коллабораторы, общие для всех подсистем
//!
//! - obstacles: статическая геометрия препятствий (ObstacleQuery)
//! - registry: упорядоченный список живых агентов
//! - clock: simulation время (elapsed/delta)

pub mod clock;
pub mod obstacles;
pub mod registry;

pub use clock::*;
pub use obstacles::*;
pub use registry::*;

//! Steering domain — desired destination → per-tick position/rotation update
//!
//! behaviors: чистые steering примитивы (seek, avoidance, flocking, integrate)
//! engine: moveTo / flee / stop поверх World (snapshot → force → commit)

pub mod behaviors;
pub mod engine;

// Tests (separate files with _tests suffix)
#[cfg(test)]
mod behaviors_tests;

pub use behaviors::*;
pub use engine::{face_towards, flee, move_to, stop};

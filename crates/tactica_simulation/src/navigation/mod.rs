//! Navigation domain — статический walkability grid + A*
//!
//! Grid строится один раз из геометрии препятствий и не мутируется в рантайме.
//! Пустой путь = "пути нет" (не ошибка).

pub mod grid;


pub use grid::{GridNode, NavGrid, NavGridError, PathSearch};

//! Tactical AI module
//!
//! FSM на агента (`Brain`), наборы состояний лидера и юнита, восприятие,
//! weighted roulette для тактических решений.
//!
//! Порядок внутри тика: каждый агент из AgentRegistry по очереди выполняет
//! update активного состояния (`run_tactical_ai`). Кросс-агентные приказы
//! (shared target отряда, доклад о контакте) применяются к чужим машинам
//! сразу, к собственной — после её update.

pub mod context;
pub mod fsm;
pub mod leader;
pub mod perception;
pub mod roulette;
pub mod tactics;
pub mod unit;

// Tests (separate files with _tests suffix)
#[cfg(test)]
mod fsm_tests;

pub use context::AiContext;
pub use fsm::{
    current_state, force_state, is_in_state, run_tactical_ai, state_name, AiState, Brain,
    StateId, StateMachine, Transition,
};
pub use leader::leader_brain;
pub use roulette::{select_option, WeightedOption};
pub use unit::unit_brain;

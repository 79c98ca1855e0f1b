//! Generic FSM: набор состояний на агента, ровно одно активное
//!
//! Состояния создаются один раз при spawn и живут всю жизнь агента.
//! `Brain` хранит машину; на время update машина вынимается из компонента,
//! поэтому принудительные переходы извне (приказы отряда) во время
//! собственного update агента откладываются в `pending` и применяются сразу
//! после него.

use bevy::prelude::*;
use std::collections::HashMap;
use std::fmt;

use super::context::AiContext;
use crate::logger;
use crate::shared::AgentRegistry;

/// Защита от бесконечной цепочки enter → changeState → enter
const MAX_CHAINED_TRANSITIONS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateId {
    LeaderCommand,
    LeaderAttack,
    LeaderFlee,
    LeaderHeal,
    LeaderFortify,
    LeaderRecruit,
    UnitFollow,
    UnitAttack,
    UnitFlee,
    UnitRecruit,
    UnitRoam,
}

impl StateId {
    /// Имя для диагностики
    pub fn name(self) -> &'static str {
        match self {
            StateId::LeaderCommand => "LeaderCommand",
            StateId::LeaderAttack => "LeaderAttack",
            StateId::LeaderFlee => "LeaderFlee",
            StateId::LeaderHeal => "LeaderHeal",
            StateId::LeaderFortify => "LeaderFortify",
            StateId::LeaderRecruit => "LeaderRecruit",
            StateId::UnitFollow => "UnitFollow",
            StateId::UnitAttack => "UnitAttack",
            StateId::UnitFlee => "UnitFlee",
            StateId::UnitRecruit => "UnitRecruit",
            StateId::UnitRoam => "UnitRoam",
        }
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Результат enter/update: остаться или перейти
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Stay,
    To(StateId),
}

pub trait AiState: Send + Sync + 'static {
    fn id(&self) -> StateId;

    fn enter(&mut self, _ctx: &mut AiContext) -> Transition {
        Transition::Stay
    }

    fn update(&mut self, ctx: &mut AiContext) -> Transition;

    fn exit(&mut self, _ctx: &mut AiContext) {}
}

#[derive(Default)]
pub struct StateMachine {
    states: HashMap<StateId, Box<dyn AiState>>,
    current: Option<StateId>,
}

impl fmt::Debug for StateMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut registered: Vec<&'static str> = self.states.keys().map(|id| id.name()).collect();
        registered.sort_unstable();
        f.debug_struct("StateMachine")
            .field("current", &self.current)
            .field("registered", &registered)
            .finish()
    }
}

impl StateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(mut self, state: impl AiState) -> Self {
        self.add_state(Box::new(state));
        self
    }

    pub fn add_state(&mut self, state: Box<dyn AiState>) {
        self.states.insert(state.id(), state);
    }

    pub fn has_state(&self, id: StateId) -> bool {
        self.states.contains_key(&id)
    }

    pub fn current(&self) -> Option<StateId> {
        self.current
    }

    pub fn is_in_state(&self, id: StateId) -> bool {
        self.current == Some(id)
    }

    /// exit текущего → enter нового. Незарегистрированный target = no-op (false).
    /// Переход, запрошенный из enter, применяется сразу же (цепочкой).
    pub fn change_state(&mut self, id: StateId, ctx: &mut AiContext) -> bool {
        let mut next = Some(id);
        let mut changed = false;
        let mut hops = 0;

        while let Some(id) = next.take() {
            if !self.has_state(id) {
                break;
            }

            if let Some(state) = self.current.and_then(|cur| self.states.get_mut(&cur)) {
                state.exit(ctx);
            }

            let previous = self.current.replace(id);
            ctx.record_state(id);
            changed = true;
            logger::log(&format!(
                "FSM {:?}: {} → {}",
                ctx.agent,
                previous.map_or("None", StateId::name),
                id
            ));

            let requested = match self.states.get_mut(&id) {
                Some(state) => state.enter(ctx),
                None => Transition::Stay,
            };

            if let Transition::To(following) = requested {
                hops += 1;
                if hops > MAX_CHAINED_TRANSITIONS {
                    logger::log_warning(&format!(
                        "FSM {:?}: transition chain too long, stopped at {}",
                        ctx.agent, id
                    ));
                    break;
                }
                next = Some(following);
            }
        }

        changed
    }

    /// Один тик активного состояния. Отложенные внешние переходы применяются
    /// раньше собственного перехода состояния (они запрошены раньше по времени).
    pub fn update(&mut self, ctx: &mut AiContext) {
        let transition = match self.current.and_then(|cur| self.states.get_mut(&cur)) {
            Some(state) => state.update(ctx),
            None => Transition::Stay,
        };

        self.apply_pending(ctx);

        if let Transition::To(next) = transition {
            self.change_state(next, ctx);
        }

        self.apply_pending(ctx);
    }

    fn apply_pending(&mut self, ctx: &mut AiContext) {
        let mut guard = 0;
        while let Some(id) = ctx.take_pending() {
            self.change_state(id, ctx);
            guard += 1;
            if guard > MAX_CHAINED_TRANSITIONS {
                break;
            }
        }
    }
}

/// Component: FSM агента
#[derive(Component, Debug, Default)]
pub struct Brain {
    machine: Option<StateMachine>,
    current: Option<StateId>,
    /// Отложенный force_state. Один слот: применяется последний запрос за update.
    pending: Option<StateId>,
}

impl Brain {
    pub fn new(machine: StateMachine) -> Self {
        Self {
            current: machine.current(),
            machine: Some(machine),
            pending: None,
        }
    }

    pub fn current(&self) -> Option<StateId> {
        self.current
    }

    pub fn state_name(&self) -> &'static str {
        self.current.map_or("None", StateId::name)
    }

    pub(crate) fn set_current(&mut self, id: StateId) {
        self.current = Some(id);
    }

    pub(crate) fn take_pending(&mut self) -> Option<StateId> {
        self.pending.take()
    }
}

pub fn current_state(world: &World, agent: Entity) -> Option<StateId> {
    world.get::<Brain>(agent).and_then(Brain::current)
}

pub fn is_in_state(world: &World, agent: Entity, id: StateId) -> bool {
    current_state(world, agent) == Some(id)
}

/// Имя активного состояния ("None" если нет FSM)
pub fn state_name(world: &World, agent: Entity) -> &'static str {
    world.get::<Brain>(agent).map_or("None", Brain::state_name)
}

/// Принудительный переход (приказ извне или стартовое состояние).
/// Если машина агента сейчас исполняется, переход откладывается; повторный
/// запрос в том же update заменяет предыдущий.
pub fn force_state(world: &mut World, agent: Entity, id: StateId) -> bool {
    let Some(mut brain) = world.get_mut::<Brain>(agent) else {
        return false;
    };

    let Some(mut machine) = brain.machine.take() else {
        brain.pending = Some(id);
        return true;
    };

    let mut ctx = AiContext::new(world, agent);
    let changed = machine.change_state(id, &mut ctx);
    machine.apply_pending(&mut ctx);
    restore(world, agent, machine);
    changed
}

/// Стартовое состояние после регистрации всех состояний
pub fn start(world: &mut World, agent: Entity, initial: StateId) -> bool {
    force_state(world, agent, initial)
}

/// Один тик FSM агента
pub fn tick_agent(world: &mut World, agent: Entity) {
    let Some(mut machine) = world
        .get_mut::<Brain>(agent)
        .and_then(|mut brain| brain.machine.take())
    else {
        return;
    };

    let mut ctx = AiContext::new(world, agent);
    machine.update(&mut ctx);
    restore(world, agent, machine);
}

fn restore(world: &mut World, agent: Entity, machine: StateMachine) {
    // Агент мог погибнуть во время собственного тика — тогда машина просто дропается
    if let Some(mut brain) = world.get_mut::<Brain>(agent) {
        brain.current = machine.current();
        brain.machine = Some(machine);
    }
}

/// Exclusive system: FSM update каждого агента в порядке регистрации
pub fn run_tactical_ai(world: &mut World) {
    let Some(agents) = world.get_resource::<AgentRegistry>().map(AgentRegistry::snapshot) else {
        return;
    };
    for agent in agents {
        tick_agent(world, agent);
    }
}

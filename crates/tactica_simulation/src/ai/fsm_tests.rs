//! Tests for the generic FSM.

#[cfg(test)]
mod tests {
    use super::super::context::AiContext;
    use super::super::fsm::{self, AiState, Brain, StateId, StateMachine, Transition};
    use bevy::prelude::*;

    /// Журнал enter/update/exit в порядке вызова
    #[derive(Resource, Default)]
    struct Trace(Vec<String>);

    fn trace(ctx: &mut AiContext, event: &str, id: StateId) {
        ctx.world
            .get_resource_or_init::<Trace>()
            .0
            .push(format!("{} {}", event, id));
    }

    #[derive(Default)]
    struct Recorder {
        id: Option<StateId>,
        enter_to: Option<StateId>,
        update_to: Option<StateId>,
        force_on_update: Option<StateId>,
        force_again_on_update: Option<StateId>,
    }

    impl Recorder {
        fn new(id: StateId) -> Self {
            Self {
                id: Some(id),
                ..Default::default()
            }
        }
    }

    impl AiState for Recorder {
        fn id(&self) -> StateId {
            self.id.unwrap_or(StateId::UnitFollow)
        }

        fn enter(&mut self, ctx: &mut AiContext) -> Transition {
            trace(ctx, "enter", self.id());
            self.enter_to.map_or(Transition::Stay, Transition::To)
        }

        fn update(&mut self, ctx: &mut AiContext) -> Transition {
            trace(ctx, "update", self.id());
            for forced in [self.force_on_update, self.force_again_on_update].into_iter().flatten() {
                fsm::force_state(ctx.world, ctx.agent, forced);
            }
            self.update_to.map_or(Transition::Stay, Transition::To)
        }

        fn exit(&mut self, ctx: &mut AiContext) {
            trace(ctx, "exit", self.id());
        }
    }

    fn events(world: &World) -> Vec<String> {
        world
            .get_resource::<Trace>()
            .map(|t| t.0.clone())
            .unwrap_or_default()
    }

    #[test]
    fn test_unregistered_state_is_noop() {
        let mut world = World::new();
        let agent = world.spawn_empty().id();
        let mut machine = StateMachine::new().with_state(Recorder::new(StateId::UnitFollow));

        let mut ctx = AiContext::new(&mut world, agent);
        assert!(!machine.change_state(StateId::UnitRoam, &mut ctx));
        assert_eq!(machine.current(), None);

        assert!(machine.change_state(StateId::UnitFollow, &mut ctx));
        assert!(!machine.change_state(StateId::UnitRoam, &mut ctx));
        assert!(machine.is_in_state(StateId::UnitFollow));
    }

    #[test]
    fn test_exit_runs_before_enter() {
        let mut world = World::new();
        let agent = world.spawn_empty().id();
        let mut machine = StateMachine::new()
            .with_state(Recorder::new(StateId::UnitFollow))
            .with_state(Recorder::new(StateId::UnitRoam));

        let mut ctx = AiContext::new(&mut world, agent);
        machine.change_state(StateId::UnitFollow, &mut ctx);
        machine.change_state(StateId::UnitRoam, &mut ctx);

        assert_eq!(
            events(&world),
            vec!["enter UnitFollow", "exit UnitFollow", "enter UnitRoam"]
        );
    }

    #[test]
    fn test_enter_can_chain_transition() {
        let mut world = World::new();
        let agent = world.spawn_empty().id();
        let mut machine = StateMachine::new()
            .with_state(Recorder {
                enter_to: Some(StateId::LeaderFortify),
                ..Recorder::new(StateId::LeaderAttack)
            })
            .with_state(Recorder::new(StateId::LeaderFortify));

        let mut ctx = AiContext::new(&mut world, agent);
        assert!(machine.change_state(StateId::LeaderAttack, &mut ctx));

        assert!(machine.is_in_state(StateId::LeaderFortify));
        assert_eq!(
            events(&world),
            vec!["enter LeaderAttack", "exit LeaderAttack", "enter LeaderFortify"]
        );
    }

    #[test]
    fn test_transition_cycle_is_bounded() {
        let mut world = World::new();
        let agent = world.spawn_empty().id();
        let mut machine = StateMachine::new()
            .with_state(Recorder {
                enter_to: Some(StateId::UnitRoam),
                ..Recorder::new(StateId::UnitFollow)
            })
            .with_state(Recorder {
                enter_to: Some(StateId::UnitFollow),
                ..Recorder::new(StateId::UnitRoam)
            });

        let mut ctx = AiContext::new(&mut world, agent);
        assert!(machine.change_state(StateId::UnitFollow, &mut ctx));
        assert!(machine.current().is_some());
    }

    #[test]
    fn test_update_transition_applies() {
        let mut world = World::new();
        let machine = StateMachine::new()
            .with_state(Recorder {
                update_to: Some(StateId::UnitAttack),
                ..Recorder::new(StateId::UnitFollow)
            })
            .with_state(Recorder::new(StateId::UnitAttack));
        let agent = world.spawn(Brain::new(machine)).id();

        assert!(fsm::start(&mut world, agent, StateId::UnitFollow));
        assert_eq!(fsm::state_name(&world, agent), "UnitFollow");

        fsm::tick_agent(&mut world, agent);
        assert!(fsm::is_in_state(&world, agent, StateId::UnitAttack));
        assert_eq!(
            events(&world),
            vec![
                "enter UnitFollow",
                "update UnitFollow",
                "exit UnitFollow",
                "enter UnitAttack"
            ]
        );
    }

    #[test]
    fn test_force_during_own_update_is_deferred() {
        let mut world = World::new();
        let machine = StateMachine::new()
            .with_state(Recorder {
                force_on_update: Some(StateId::UnitFlee),
                ..Recorder::new(StateId::UnitFollow)
            })
            .with_state(Recorder::new(StateId::UnitFlee));
        let agent = world.spawn(Brain::new(machine)).id();
        fsm::start(&mut world, agent, StateId::UnitFollow);

        fsm::tick_agent(&mut world, agent);

        assert!(fsm::is_in_state(&world, agent, StateId::UnitFlee));
        // exit выполняется уже после update, не внутри него
        assert_eq!(
            events(&world),
            vec![
                "enter UnitFollow",
                "update UnitFollow",
                "exit UnitFollow",
                "enter UnitFlee"
            ]
        );
    }

    #[test]
    fn test_latest_deferred_force_wins() {
        let mut world = World::new();
        let machine = StateMachine::new()
            .with_state(Recorder {
                force_on_update: Some(StateId::UnitFlee),
                force_again_on_update: Some(StateId::UnitRoam),
                ..Recorder::new(StateId::UnitFollow)
            })
            .with_state(Recorder::new(StateId::UnitFlee))
            .with_state(Recorder::new(StateId::UnitRoam));
        let agent = world.spawn(Brain::new(machine)).id();
        fsm::start(&mut world, agent, StateId::UnitFollow);

        fsm::tick_agent(&mut world, agent);

        assert!(fsm::is_in_state(&world, agent, StateId::UnitRoam));
        assert_eq!(
            events(&world),
            vec![
                "enter UnitFollow",
                "update UnitFollow",
                "exit UnitFollow",
                "enter UnitRoam"
            ]
        );
    }

    #[test]
    fn test_tactical_ai_without_registry_is_noop() {
        let mut world = World::new();
        let machine = StateMachine::new().with_state(Recorder::new(StateId::UnitFollow));
        let agent = world.spawn(Brain::new(machine)).id();
        fsm::start(&mut world, agent, StateId::UnitFollow);

        fsm::run_tactical_ai(&mut world);

        assert_eq!(events(&world), vec!["enter UnitFollow"]);
    }

    #[test]
    fn test_state_name_without_brain() {
        let mut world = World::new();
        let agent = world.spawn_empty().id();

        assert_eq!(fsm::state_name(&world, agent), "None");
        assert_eq!(fsm::current_state(&world, agent), None);
        assert!(!fsm::force_state(&mut world, agent, StateId::UnitFollow));
        assert_eq!(Brain::default().state_name(), "None");
    }
}

//! Hierarchical state machine engine
//!
//! Dispatch offers an event to the active leaf first, then to each ancestor
//! up to `Top`. The first state that consumes the event stops the walk; an
//! event nobody consumes is dropped.
//!
//! A transition requested by a handler is applied after the handler returns:
//! the target is resolved to a leaf, states that are not shared with the new
//! leaf are exited innermost first, then the new states are entered (enter,
//! then start) outermost first. Common ancestors see neither.

use tracing::{debug, error, info};

use crate::command::Effect;
use crate::event::ProductEvent;
use crate::model::StateId;
use crate::states::{behaviour, resolve_leaf, Environment, StateContext};

/// Record of everything one dispatch did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// State that consumed the event, `None` when it was dropped
    pub handled_by: Option<StateId>,
    /// States exited, innermost first
    pub exited: Vec<StateId>,
    /// States entered, outermost first
    pub entered: Vec<StateId>,
    /// Effects pushed by the handler and lifecycle hooks, in order
    pub effects: Vec<Effect>,
}

impl DispatchOutcome {
    pub fn transitioned(&self) -> bool {
        !self.exited.is_empty() || !self.entered.is_empty()
    }
}

/// The product state machine
///
/// Owns only the active leaf. Readiness and audio levels are passed in per
/// dispatch through an [`Environment`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductStateMachine {
    active: StateId,
    started: bool,
}

impl Default for ProductStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl ProductStateMachine {
    pub fn new() -> Self {
        Self {
            active: StateId::INITIAL,
            started: false,
        }
    }

    /// Currently active leaf
    pub fn active(&self) -> StateId {
        self.active
    }

    /// Path from `Top` to the active leaf
    pub fn active_path(&self) -> Vec<StateId> {
        self.active.path()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Whether `state` is the active leaf or one of its ancestors
    pub fn is_in(&self, state: StateId) -> bool {
        state.contains(self.active)
    }

    /// Enter the initial state, running enter and start hooks from `Top` down
    ///
    /// Calling this more than once has no effect.
    pub fn start(&mut self, env: Environment<'_>) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::default();
        if self.started {
            return outcome;
        }
        self.started = true;

        let mut ctx = StateContext::new(env);
        for state in self.active.path() {
            run_entry(state, &mut ctx);
            outcome.entered.push(state);
        }
        if let Some(target) = ctx.take_pending() {
            error!(%target, "Transition requested from a lifecycle hook ignored");
        }
        info!(state = %self.active, "State machine started");
        outcome.effects = ctx.into_effects();
        outcome
    }

    /// Offer an event to the active leaf and its ancestors
    pub fn dispatch(&mut self, event: ProductEvent, env: Environment<'_>) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::default();
        let mut ctx = StateContext::new(env);

        let mut current = Some(self.active);
        while let Some(state) = current {
            if behaviour(state).handle(&mut ctx, event) {
                outcome.handled_by = Some(state);
                break;
            }
            current = state.parent();
        }

        match outcome.handled_by {
            Some(state) => debug!(%event, handled_by = %state, "Event handled"),
            None => debug!(%event, active = %self.active, "Event dropped"),
        }

        if let Some(target) = ctx.take_pending() {
            self.transition(target, &mut ctx, &mut outcome);
        }
        outcome.effects = ctx.into_effects();
        outcome
    }

    /// Move to `target` as if a handler had requested it
    ///
    /// Test harnesses use this to place the machine in a given state.
    pub fn change_state(&mut self, target: StateId, env: Environment<'_>) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::default();
        let mut ctx = StateContext::new(env);
        self.transition(target, &mut ctx, &mut outcome);
        outcome.effects = ctx.into_effects();
        outcome
    }

    fn transition(
        &mut self,
        target: StateId,
        ctx: &mut StateContext<'_>,
        outcome: &mut DispatchOutcome,
    ) {
        let leaf = resolve_leaf(target, ctx.flags());
        if leaf == self.active {
            debug!(state = %leaf, "Already in target state");
            return;
        }

        let from = self.active.path();
        let to = leaf.path();
        let shared = from
            .iter()
            .zip(to.iter())
            .take_while(|(a, b)| a == b)
            .count();

        for &state in from[shared..].iter().rev() {
            debug!(%state, "exit");
            behaviour(state).exit(ctx);
            outcome.exited.push(state);
        }
        for &state in &to[shared..] {
            run_entry(state, ctx);
            outcome.entered.push(state);
        }

        info!(from = %self.active, to = %leaf, requested = %target, "State change");
        self.active = leaf;

        if let Some(target) = ctx.take_pending() {
            error!(%target, "Transition requested from a lifecycle hook ignored");
        }
    }
}

fn run_entry(state: StateId, ctx: &mut StateContext<'_>) {
    let behaviour = behaviour(state);
    debug!(%state, "enter");
    behaviour.enter(ctx);
    debug!(%state, "start");
    behaviour.start(ctx);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{ProductCommand, SystemState};
    use crate::event::TimerKind;
    use crate::readiness::ReadinessFlags;
    use crate::settings::{AudioLevels, CoreSettings};

    fn env<'a>(flags: &'a ReadinessFlags, settings: &'a CoreSettings) -> Environment<'a> {
        Environment {
            flags,
            audio: AudioLevels::default(),
            settings,
        }
    }

    #[test]
    fn test_start_enters_top_and_booting() {
        let flags = ReadinessFlags::new();
        let settings = CoreSettings::default();
        let mut machine = ProductStateMachine::new();

        let outcome = machine.start(env(&flags, &settings));
        assert_eq!(outcome.entered, vec![StateId::Top, StateId::Booting]);
        assert!(machine.is_started());
        assert!(machine.start(env(&flags, &settings)).entered.is_empty());
    }

    #[test]
    fn test_transition_exits_and_enters_unshared_states() {
        let mut flags = ReadinessFlags::new();
        flags.network_configured = true;
        let settings = CoreSettings::default();
        let mut machine = ProductStateMachine::new();
        machine.start(env(&flags, &settings));

        let outcome = machine.change_state(StateId::Playable, env(&flags, &settings));
        assert_eq!(outcome.exited, vec![StateId::Booting]);
        assert_eq!(
            outcome.entered,
            vec![
                StateId::On,
                StateId::Playable,
                StateId::NetworkStandby,
                StateId::NetworkStandbyConfigured
            ]
        );
        assert_eq!(
            outcome.effects,
            vec![Effect::Command(ProductCommand::SetSystemState(
                SystemState::Standby
            ))]
        );

        let outcome = machine.change_state(StateId::PlayingActive, env(&flags, &settings));
        assert_eq!(
            outcome.exited,
            vec![StateId::NetworkStandbyConfigured, StateId::NetworkStandby, StateId::Playable]
        );
        assert_eq!(outcome.entered, vec![StateId::Playing, StateId::PlayingActive]);
        assert_eq!(
            outcome.effects,
            vec![
                Effect::Command(ProductCommand::SetSystemState(SystemState::On)),
                Effect::StartTimer(TimerKind::PlayingUserInactivity),
            ]
        );
    }

    #[test]
    fn test_same_state_is_noop() {
        let flags = ReadinessFlags::new();
        let settings = CoreSettings::default();
        let mut machine = ProductStateMachine::new();
        machine.start(env(&flags, &settings));

        let outcome = machine.change_state(StateId::Booting, env(&flags, &settings));
        assert!(!outcome.transitioned());
        assert!(outcome.effects.is_empty());
    }

    #[test]
    fn test_unhandled_event_is_dropped() {
        let flags = ReadinessFlags::new();
        let settings = CoreSettings::default();
        let mut machine = ProductStateMachine::new();
        machine.start(env(&flags, &settings));

        let outcome = machine.dispatch(ProductEvent::VoiceState(true), env(&flags, &settings));
        assert_eq!(outcome.handled_by, None);
        assert_eq!(machine.active(), StateId::Booting);
    }

    #[test]
    fn test_event_bubbles_to_ancestor() {
        let flags = ReadinessFlags::new();
        let settings = CoreSettings::default();
        let mut machine = ProductStateMachine::new();
        machine.start(env(&flags, &settings));
        machine.change_state(StateId::NetworkStandbyUnconfigured, env(&flags, &settings));

        let outcome = machine.dispatch(ProductEvent::PowerState, env(&flags, &settings));
        assert_eq!(outcome.handled_by, Some(StateId::Playable));
        assert_eq!(machine.active(), StateId::PlayingInactive);
        assert!(machine.is_in(StateId::Playing));
        assert!(machine.is_in(StateId::On));
    }
}

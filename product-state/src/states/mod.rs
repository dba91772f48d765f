//! Per-state behaviour
//!
//! Every node of the tree is a unit struct implementing [`ProductState`].
//! Handlers default to "not handled", so a state only overrides the events it
//! cares about; anything it leaves alone bubbles to its superstate.
//!
//! Handlers never touch the outside world. They read the readiness flags and
//! audio levels through [`StateContext`], push [`Effect`]s, and request at
//! most one transition with [`StateContext::change_state`]. The machine
//! applies the transition after the handler returns.

mod booting;
mod idle;
mod network_standby;
mod on;
mod playing;
mod top;

use tracing::warn;

use crate::command::{Effect, ProductCommand};
use crate::event::{ProductEvent, TimerKind};
use crate::message::PlaybackRequest;
use crate::model::{KeyAction, SlotId, StateId};
use crate::readiness::ReadinessFlags;
use crate::settings::{AudioLevels, CoreSettings};

/// Read-only view of the core passed to the machine for one dispatch
#[derive(Debug, Clone, Copy)]
pub struct Environment<'a> {
    pub flags: &'a ReadinessFlags,
    pub audio: AudioLevels,
    pub settings: &'a CoreSettings,
}

/// What a handler or lifecycle hook can see and do
pub struct StateContext<'a> {
    env: Environment<'a>,
    effects: Vec<Effect>,
    pending: Option<StateId>,
}

impl<'a> StateContext<'a> {
    pub(crate) fn new(env: Environment<'a>) -> Self {
        Self {
            env,
            effects: Vec::new(),
            pending: None,
        }
    }

    pub fn flags(&self) -> &ReadinessFlags {
        self.env.flags
    }

    pub fn audio(&self) -> AudioLevels {
        self.env.audio
    }

    pub fn settings(&self) -> &CoreSettings {
        self.env.settings
    }

    /// Request a transition once the current handler returns
    ///
    /// A later request in the same handler replaces an earlier one.
    pub fn change_state(&mut self, target: StateId) {
        if let Some(previous) = self.pending.replace(target) {
            warn!(%previous, %target, "Transition request replaced");
        }
    }

    pub fn command(&mut self, command: ProductCommand) {
        self.effects.push(Effect::Command(command));
    }

    /// Start a timer, replacing any pending timer of the same kind
    pub fn start_timer(&mut self, kind: TimerKind) {
        self.effects.push(Effect::StartTimer(kind));
    }

    pub fn cancel_timer(&mut self, kind: TimerKind) {
        self.effects.push(Effect::CancelTimer(kind));
    }

    pub(crate) fn take_pending(&mut self) -> Option<StateId> {
        self.pending.take()
    }

    pub(crate) fn into_effects(self) -> Vec<Effect> {
        self.effects
    }

    /// Network connected and voice configured
    pub(crate) fn voice_ready(&self) -> bool {
        self.env.flags.network_connected && self.env.flags.is_voice_configured()
    }
}

/// Behaviour of one node in the state tree
///
/// Each `handle_*` method returns `true` when the state consumed the event.
#[allow(unused_variables)]
pub trait ProductState: Sync {
    fn id(&self) -> StateId;

    fn enter(&self, ctx: &mut StateContext<'_>) {}

    fn start(&self, ctx: &mut StateContext<'_>) {}

    fn exit(&self, ctx: &mut StateContext<'_>) {}

    fn handle_lpm_state(&self, ctx: &mut StateContext<'_>, connected: bool) -> bool {
        false
    }

    fn handle_caps_state(&self, ctx: &mut StateContext<'_>, initialized: bool) -> bool {
        false
    }

    fn handle_audio_path_state(&self, ctx: &mut StateContext<'_>, connected: bool) -> bool {
        false
    }

    fn handle_sts_sources_init(&self, ctx: &mut StateContext<'_>) -> bool {
        false
    }

    fn handle_source_slot_selected(&self, ctx: &mut StateContext<'_>, slot: SlotId) -> bool {
        false
    }

    fn handle_network_state(
        &self,
        ctx: &mut StateContext<'_>,
        configured: bool,
        connected: bool,
    ) -> bool {
        false
    }

    fn handle_voice_state(&self, ctx: &mut StateContext<'_>, configured: bool) -> bool {
        false
    }

    fn handle_key_action(&self, ctx: &mut StateContext<'_>, action: KeyAction) -> bool {
        false
    }

    fn handle_power_state(&self, ctx: &mut StateContext<'_>) -> bool {
        false
    }

    fn handle_autowake_status(&self, ctx: &mut StateContext<'_>, active: bool) -> bool {
        false
    }

    fn handle_software_update_state(&self, ctx: &mut StateContext<'_>, required: bool) -> bool {
        false
    }

    fn handle_setup_state(&self, ctx: &mut StateContext<'_>, required: bool) -> bool {
        false
    }

    fn handle_playback_request(
        &self,
        ctx: &mut StateContext<'_>,
        request: PlaybackRequest,
    ) -> bool {
        false
    }

    fn handle_inactivity_timeout(&self, ctx: &mut StateContext<'_>, kind: TimerKind) -> bool {
        false
    }

    /// Route an event to the matching handler
    fn handle(&self, ctx: &mut StateContext<'_>, event: ProductEvent) -> bool {
        match event {
            ProductEvent::LpmState(connected) => self.handle_lpm_state(ctx, connected),
            ProductEvent::CapsState(initialized) => self.handle_caps_state(ctx, initialized),
            ProductEvent::AudioPathState(connected) => self.handle_audio_path_state(ctx, connected),
            ProductEvent::StsSourcesInit => self.handle_sts_sources_init(ctx),
            ProductEvent::SourceSlotSelected(slot) => self.handle_source_slot_selected(ctx, slot),
            ProductEvent::NetworkState {
                configured,
                connected,
            } => self.handle_network_state(ctx, configured, connected),
            ProductEvent::VoiceState(configured) => self.handle_voice_state(ctx, configured),
            ProductEvent::KeyAction(action) => self.handle_key_action(ctx, action),
            ProductEvent::PowerState => self.handle_power_state(ctx),
            ProductEvent::AutowakeStatus(active) => self.handle_autowake_status(ctx, active),
            ProductEvent::SoftwareUpdateState(required) => {
                self.handle_software_update_state(ctx, required)
            }
            ProductEvent::SetupState(required) => self.handle_setup_state(ctx, required),
            ProductEvent::PlaybackRequest(request) => self.handle_playback_request(ctx, request),
            ProductEvent::InactivityTimeout(kind) => self.handle_inactivity_timeout(ctx, kind),
        }
    }
}

/// Behaviour object for a state id
pub fn behaviour(id: StateId) -> &'static dyn ProductState {
    match id {
        StateId::Top => &top::Top,
        StateId::Setup => &top::Setup,
        StateId::Booting => &booting::Booting,
        StateId::UpdatingSoftware => &booting::UpdatingSoftware,
        StateId::Off => &top::Off,
        StateId::On => &on::On,
        StateId::Playable => &on::Playable,
        StateId::NetworkStandby => &network_standby::NetworkStandby,
        StateId::NetworkStandbyConfigured => &network_standby::NetworkStandbyConfigured,
        StateId::NetworkStandbyUnconfigured => &network_standby::NetworkStandbyUnconfigured,
        StateId::Idle => &idle::Idle,
        StateId::IdleVoiceConfigured => &idle::IdleVoiceConfigured,
        StateId::IdleVoiceUnconfigured => &idle::IdleVoiceUnconfigured,
        StateId::Playing => &playing::Playing,
        StateId::PlayingActive => &playing::PlayingActive,
        StateId::PlayingInactive => &playing::PlayingInactive,
    }
}

/// Resolve a transition target to the leaf that becomes active
///
/// # Panics
///
/// Panics when asked to resolve `Top`, which is never a valid target.
pub fn resolve_leaf(target: StateId, flags: &ReadinessFlags) -> StateId {
    let voice_ready = flags.network_connected && flags.is_voice_configured();
    match target {
        StateId::Top => panic!("Top is not a valid transition target"),
        StateId::On | StateId::Playable | StateId::NetworkStandby => {
            if flags.network_configured {
                StateId::NetworkStandbyConfigured
            } else {
                StateId::NetworkStandbyUnconfigured
            }
        }
        StateId::Idle => {
            if voice_ready {
                StateId::IdleVoiceConfigured
            } else {
                StateId::IdleVoiceUnconfigured
            }
        }
        StateId::Playing => StateId::PlayingInactive,
        leaf => leaf,
    }
}

/// Where playback stops to when it ends
pub fn non_playing_target(flags: &ReadinessFlags) -> StateId {
    if flags.network_configured || flags.auto_wake_enabled {
        StateId::Idle
    } else {
        StateId::NetworkStandbyUnconfigured
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_behaviour_ids_match() {
        for id in StateId::ALL {
            assert_eq!(behaviour(id).id(), id);
        }
    }

    #[test]
    fn test_resolve_leaf_is_always_a_leaf() {
        let mut flags = ReadinessFlags::new();
        for id in StateId::ALL.into_iter().filter(|id| *id != StateId::Top) {
            assert!(resolve_leaf(id, &flags).is_leaf());
            flags.network_configured = !flags.network_configured;
            assert!(resolve_leaf(id, &flags).is_leaf());
        }
    }

    #[test]
    fn test_resolve_on_follows_network() {
        let mut flags = ReadinessFlags::new();
        assert_eq!(
            resolve_leaf(StateId::On, &flags),
            StateId::NetworkStandbyUnconfigured
        );
        flags.network_configured = true;
        assert_eq!(
            resolve_leaf(StateId::Playable, &flags),
            StateId::NetworkStandbyConfigured
        );
    }

    #[test]
    fn test_non_playing_target() {
        let mut flags = ReadinessFlags::new();
        assert_eq!(non_playing_target(&flags), StateId::NetworkStandbyUnconfigured);
        flags.auto_wake_enabled = true;
        assert_eq!(non_playing_target(&flags), StateId::Idle);
    }

    #[test]
    #[should_panic(expected = "Top is not a valid transition target")]
    fn test_top_is_not_a_target() {
        resolve_leaf(StateId::Top, &ReadinessFlags::new());
    }
}

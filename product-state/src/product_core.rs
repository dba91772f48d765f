//! The product core: normalizer, readiness and machine behind one entry point
//!
//! [`ProductCore`] is meant to be owned by a single task. Each call to
//! [`ProductCore::handle_message`] runs to completion: flags are updated,
//! core-level side effects are emitted, then the event is dispatched.
//! Nothing here fails; malformed input is logged and dropped.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::command::{Effect, ProductCommand, RadioBand};
use crate::decoder::{decode_raw, normalize};
use crate::event::{ProductEvent, TimerKind};
use crate::machine::{DispatchOutcome, ProductStateMachine};
use crate::message::{CollaboratorEvent, ProductMessage};
use crate::model::{SlotId, StateId};
use crate::readiness::{Flag, ReadinessFlags};
use crate::settings::{AudioLevels, CoreSettings};
use crate::states::Environment;

/// Everything that happened while handling one message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandleOutcome {
    /// Flags whose value changed
    pub changed: Vec<(Flag, bool)>,
    /// Dispatch record, `None` when no event reached the machine
    pub dispatch: Option<DispatchOutcome>,
    /// Core-level effects followed by the machine's effects
    pub effects: Vec<Effect>,
}

impl HandleOutcome {
    pub fn commands(&self) -> impl Iterator<Item = &ProductCommand> {
        self.effects.iter().filter_map(|effect| match effect {
            Effect::Command(command) => Some(command),
            _ => None,
        })
    }
}

/// Point-in-time copy of the core state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreSnapshot {
    pub state: StateId,
    pub active_path: Vec<StateId>,
    pub flags: ReadinessFlags,
    pub audio: AudioLevels,
    pub selected_slot: Option<SlotId>,
    pub processed: u64,
}

#[derive(Debug, Clone)]
pub struct ProductCore {
    flags: ReadinessFlags,
    machine: ProductStateMachine,
    audio: AudioLevels,
    radio_band: Option<RadioBand>,
    selected_slot: Option<SlotId>,
    settings: CoreSettings,
    processed: u64,
}

impl Default for ProductCore {
    fn default() -> Self {
        Self::new(CoreSettings::default())
    }
}

impl ProductCore {
    pub fn new(settings: CoreSettings) -> Self {
        Self {
            flags: ReadinessFlags::new(),
            machine: ProductStateMachine::new(),
            audio: AudioLevels::default(),
            radio_band: None,
            selected_slot: None,
            settings,
            processed: 0,
        }
    }

    /// Enter the initial state
    pub fn start(&mut self) -> Vec<Effect> {
        let env = Environment {
            flags: &self.flags,
            audio: self.audio,
            settings: &self.settings,
        };
        self.machine.start(env).effects
    }

    pub fn flags(&self) -> &ReadinessFlags {
        &self.flags
    }

    pub fn is_started(&self) -> bool {
        self.machine.is_started()
    }

    pub fn active_state(&self) -> StateId {
        self.machine.active()
    }

    pub fn audio(&self) -> AudioLevels {
        self.audio
    }

    pub fn selected_slot(&self) -> Option<SlotId> {
        self.selected_slot
    }

    pub fn settings(&self) -> &CoreSettings {
        &self.settings
    }

    /// Number of inbound items handled so far, malformed ones included
    pub fn processed(&self) -> u64 {
        self.processed
    }

    pub fn snapshot(&self) -> CoreSnapshot {
        CoreSnapshot {
            state: self.machine.active(),
            active_path: self.machine.active_path(),
            flags: self.flags,
            audio: self.audio,
            selected_slot: self.selected_slot,
            processed: self.processed,
        }
    }

    /// Decode and handle a raw collaborator notification
    pub fn handle_raw(&mut self, raw: &CollaboratorEvent) -> HandleOutcome {
        match decode_raw(raw) {
            Some(message) => self.handle_message(message),
            None => {
                self.processed += 1;
                HandleOutcome::default()
            }
        }
    }

    /// Handle a normalized message
    pub fn handle_message(&mut self, message: ProductMessage) -> HandleOutcome {
        self.processed += 1;
        let mut effects = Vec::new();
        if !self.machine.is_started() {
            warn!(kind = message.kind(), "Message handled before start, starting now");
            effects = self.start();
        }
        debug!(kind = message.kind(), ?message, "Handling message");

        let normalized = normalize(&mut self.flags, &message);
        for (flag, value) in &normalized.changed {
            debug!(%flag, value, "Readiness changed");
        }

        let mut outcome = HandleOutcome {
            changed: normalized.changed,
            dispatch: None,
            effects,
        };
        self.apply_core_effects(&message, &mut outcome.effects);

        if let Some(event) = normalized.event {
            let dispatch = self.dispatch(event);
            outcome.effects.extend(dispatch.effects.iter().cloned());
            outcome.dispatch = Some(dispatch);
        }
        outcome
    }

    /// Handle a fired timer
    pub fn handle_timer(&mut self, kind: TimerKind) -> HandleOutcome {
        self.processed += 1;
        let mut effects = Vec::new();
        if !self.machine.is_started() {
            warn!(?kind, "Timer handled before start, starting now");
            effects = self.start();
        }
        debug!(?kind, "Timer expired");
        let dispatch = self.dispatch(ProductEvent::InactivityTimeout(kind));
        effects.extend(dispatch.effects.iter().cloned());
        HandleOutcome {
            changed: Vec::new(),
            effects,
            dispatch: Some(dispatch),
        }
    }

    fn dispatch(&mut self, event: ProductEvent) -> DispatchOutcome {
        let env = Environment {
            flags: &self.flags,
            audio: self.audio,
            settings: &self.settings,
        };
        let outcome = self.machine.dispatch(event, env);
        self.track_audio(&outcome.effects);
        outcome
    }

    /// Side effects owned by the core rather than by any state
    fn apply_core_effects(&mut self, message: &ProductMessage, effects: &mut Vec<Effect>) {
        match *message {
            ProductMessage::WirelessStatus { frequency_khz, .. } => {
                let band = RadioBand::from_frequency_khz(frequency_khz);
                if self.radio_band != Some(band) {
                    info!(frequency_khz, ?band, "Wireless band changed");
                    self.radio_band = Some(band);
                    effects.push(Effect::Command(ProductCommand::RequestWifiRadioStatus {
                        frequency_khz,
                        band,
                    }));
                }
            }
            ProductMessage::AutowakeStatus { active } => {
                effects.push(Effect::Command(ProductCommand::SendAutowakeStatus(active)));
            }
            ProductMessage::SelectSourceSlot { slot } => {
                self.selected_slot = Some(slot);
            }
            ProductMessage::VolumeStatus { level, muted } => {
                self.audio = AudioLevels {
                    volume: Some(level),
                    muted,
                };
            }
            _ => {}
        }
    }

    /// Keep the expected audio level in step with the commands just issued
    fn track_audio(&mut self, effects: &[Effect]) {
        for effect in effects {
            match effect {
                Effect::Command(ProductCommand::SetVolume(level)) => {
                    self.audio.volume = Some(*level)
                }
                Effect::Command(ProductCommand::SetMute(muted)) => self.audio.muted = *muted,
                _ => {}
            }
        }
    }

    /// Move the machine directly to `target`
    ///
    /// A test seam; production code reaches states only through messages.
    pub fn force_state(&mut self, target: StateId) -> DispatchOutcome {
        if !self.machine.is_started() {
            self.start();
        }
        let env = Environment {
            flags: &self.flags,
            audio: self.audio,
            settings: &self.settings,
        };
        self.machine.change_state(target, env)
    }
}

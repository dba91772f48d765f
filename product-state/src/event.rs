//! Events dispatched through the state hierarchy

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::message::PlaybackRequest;
use crate::model::{KeyAction, SlotId};

/// Inactivity timers owned by individual states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimerKind {
    /// Running while in `NetworkStandbyUnconfigured`
    NoNetworkConfigured,
    /// Running while in `IdleVoiceUnconfigured` with autowake off
    VoiceUnconfigured,
    /// Running while in `PlayingActive`, restarted by key presses
    PlayingUserInactivity,
    /// Running while in `PlayingInactive`
    PlayingNoAudio,
}

impl TimerKind {
    pub const ALL: [TimerKind; 4] = [
        TimerKind::NoNetworkConfigured,
        TimerKind::VoiceUnconfigured,
        TimerKind::PlayingUserInactivity,
        TimerKind::PlayingNoAudio,
    ];
}

/// A typed event offered to the active leaf and then its ancestors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductEvent {
    LpmState(bool),
    CapsState(bool),
    AudioPathState(bool),
    StsSourcesInit,
    SourceSlotSelected(SlotId),
    NetworkState { configured: bool, connected: bool },
    VoiceState(bool),
    KeyAction(KeyAction),
    PowerState,
    AutowakeStatus(bool),
    SoftwareUpdateState(bool),
    SetupState(bool),
    PlaybackRequest(PlaybackRequest),
    InactivityTimeout(TimerKind),
}

impl ProductEvent {
    /// Whether this event reports a subsystem readiness change
    pub fn is_readiness(&self) -> bool {
        matches!(
            self,
            ProductEvent::LpmState(_)
                | ProductEvent::CapsState(_)
                | ProductEvent::AudioPathState(_)
                | ProductEvent::StsSourcesInit
                | ProductEvent::AutowakeStatus(_)
        )
    }
}

impl fmt::Display for ProductEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductEvent::LpmState(up) => write!(f, "LpmState({})", up),
            ProductEvent::CapsState(up) => write!(f, "CapsState({})", up),
            ProductEvent::AudioPathState(up) => write!(f, "AudioPathState({})", up),
            ProductEvent::StsSourcesInit => write!(f, "StsSourcesInit"),
            ProductEvent::SourceSlotSelected(slot) => write!(f, "SourceSlotSelected({})", slot),
            ProductEvent::NetworkState { configured, connected } => {
                write!(f, "NetworkState(configured={}, connected={})", configured, connected)
            }
            ProductEvent::VoiceState(configured) => write!(f, "VoiceState({})", configured),
            ProductEvent::KeyAction(action) => write!(f, "KeyAction({})", action),
            ProductEvent::PowerState => write!(f, "PowerState"),
            ProductEvent::AutowakeStatus(active) => write!(f, "AutowakeStatus({})", active),
            ProductEvent::SoftwareUpdateState(required) => {
                write!(f, "SoftwareUpdateState({})", required)
            }
            ProductEvent::SetupState(required) => write!(f, "SetupState({})", required),
            ProductEvent::PlaybackRequest(request) => write!(f, "PlaybackRequest({:?})", request),
            ProductEvent::InactivityTimeout(kind) => write!(f, "InactivityTimeout({:?})", kind),
        }
    }
}

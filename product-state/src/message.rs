//! Inbound messages
//!
//! Two layers:
//! - [`CollaboratorEvent`]: what a collaborator callback hands over. Fields
//!   mirror the wire format, so any of them may be absent.
//! - [`ProductMessage`]: the normalized, fully-typed message the core
//!   consumes exactly once.
//!
//! The decoder module turns the former into the latter.

use serde::{Deserialize, Serialize};

use crate::model::{KeyAction, SlotId};

/// Kind of network link reported by the network manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NetworkType {
    #[default]
    Unknown,
    Wired,
    Wireless,
}

/// Playback state requested by the content service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackRequest {
    Start,
    Play,
    Pause,
    Stop,
}

/// Normalized message consumed by the core task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductMessage {
    LpmStatus { connected: bool },
    CapsStatus { initialized: bool },
    AudioPathStatus { connected: bool },
    SelectSourceStatus { initialized: bool },
    SelectSourceSlot { slot: SlotId },
    NetworkStatus {
        configured: bool,
        connected: bool,
        network_type: NetworkType,
    },
    WirelessStatus { configured: bool, frequency_khz: u32 },
    VoiceStatus {
        microphone_enabled: bool,
        account_configured: bool,
    },
    KeyData { action: KeyAction },
    Power(bool),
    AutowakeStatus { active: bool },
    SoftwareUpdateStatus { required: bool },
    SetupStatus { required: bool },
    PlaybackRequest(PlaybackRequest),
    VolumeStatus { level: u8, muted: bool },
}

impl ProductMessage {
    /// Short name of the variant, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            ProductMessage::LpmStatus { .. } => "LpmStatus",
            ProductMessage::CapsStatus { .. } => "CapsStatus",
            ProductMessage::AudioPathStatus { .. } => "AudioPathStatus",
            ProductMessage::SelectSourceStatus { .. } => "SelectSourceStatus",
            ProductMessage::SelectSourceSlot { .. } => "SelectSourceSlot",
            ProductMessage::NetworkStatus { .. } => "NetworkStatus",
            ProductMessage::WirelessStatus { .. } => "WirelessStatus",
            ProductMessage::VoiceStatus { .. } => "VoiceStatus",
            ProductMessage::KeyData { .. } => "KeyData",
            ProductMessage::Power(_) => "Power",
            ProductMessage::AutowakeStatus { .. } => "AutowakeStatus",
            ProductMessage::SoftwareUpdateStatus { .. } => "SoftwareUpdateStatus",
            ProductMessage::SetupStatus { .. } => "SetupStatus",
            ProductMessage::PlaybackRequest(_) => "PlaybackRequest",
            ProductMessage::VolumeStatus { .. } => "VolumeStatus",
        }
    }
}

/// Where a raw key event originated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyOrigin {
    Console,
    Capsense,
    Ir,
    Rf,
    Cec,
    Network,
    Tap,
}

/// Press phase of a raw key event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyState {
    Pressed,
    Released,
}

/// Raw notification as delivered by a collaborator callback
///
/// Every payload field is optional because the wire format allows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollaboratorEvent {
    Lpm { connected: Option<bool> },
    Caps { initialized: Option<bool> },
    AudioPath { connected: Option<bool> },
    SourcesInitialized,
    SourceSlotSelected { slot: Option<u32> },
    Network {
        configured: Option<bool>,
        connected: Option<bool>,
        network_type: Option<NetworkType>,
    },
    Wireless {
        configured: Option<bool>,
        frequency_khz: Option<u32>,
    },
    Voice {
        microphone_enabled: Option<bool>,
        account_configured: Option<bool>,
    },
    Key {
        origin: Option<KeyOrigin>,
        state: Option<KeyState>,
        id: Option<u32>,
        action: Option<u32>,
    },
    PowerButton,
    Autowake { active: Option<bool> },
    SoftwareUpdate { required: Option<bool> },
    Setup { required: Option<bool> },
    Playback { request: Option<PlaybackRequest> },
    Volume { level: Option<u8>, muted: Option<bool> },
}

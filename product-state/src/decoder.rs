//! Event normalizer - converts collaborator notifications into typed events
//!
//! Normalization happens in two steps:
//! 1. [`decode_raw`] turns a [`CollaboratorEvent`] with optional fields into
//!    a [`ProductMessage`], substituting defaults for absent booleans and
//!    dropping events that lack an identifying field.
//! 2. [`normalize`] applies the flag updates a message implies to the
//!    [`ReadinessFlags`] and returns the [`ProductEvent`] to dispatch, if any.
//!
//! Flags are always updated before the event reaches the state machine, so
//! handlers and entry hooks observe post-update readiness.

use tracing::{debug, warn};

use crate::event::ProductEvent;
use crate::message::{CollaboratorEvent, KeyOrigin, KeyState, ProductMessage};
use crate::model::{KeyAction, SlotId};
use crate::readiness::{Flag, ReadinessFlags};

/// Flag updates performed for one message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Normalized {
    /// Flags whose value actually changed, with their new value
    pub changed: Vec<(Flag, bool)>,
    /// Event to dispatch into the state machine
    pub event: Option<ProductEvent>,
}

/// Decode a raw collaborator notification
///
/// Returns `None` when the notification is malformed. Nothing is mutated in
/// that case.
pub fn decode_raw(event: &CollaboratorEvent) -> Option<ProductMessage> {
    match event {
        CollaboratorEvent::Lpm { connected } => Some(ProductMessage::LpmStatus {
            connected: connected.unwrap_or(false),
        }),
        CollaboratorEvent::Caps { initialized } => Some(ProductMessage::CapsStatus {
            initialized: initialized.unwrap_or(false),
        }),
        CollaboratorEvent::AudioPath { connected } => Some(ProductMessage::AudioPathStatus {
            connected: connected.unwrap_or(false),
        }),
        CollaboratorEvent::SourcesInitialized => {
            Some(ProductMessage::SelectSourceStatus { initialized: true })
        }
        CollaboratorEvent::SourceSlotSelected { slot } => decode_slot_selected(*slot),
        CollaboratorEvent::Network {
            configured,
            connected,
            network_type,
        } => Some(ProductMessage::NetworkStatus {
            configured: configured.unwrap_or(false),
            connected: connected.unwrap_or(false),
            network_type: network_type.unwrap_or_default(),
        }),
        CollaboratorEvent::Wireless {
            configured,
            frequency_khz,
        } => decode_wireless(*configured, *frequency_khz),
        CollaboratorEvent::Voice {
            microphone_enabled,
            account_configured,
        } => Some(ProductMessage::VoiceStatus {
            microphone_enabled: microphone_enabled.unwrap_or(false),
            account_configured: account_configured.unwrap_or(false),
        }),
        CollaboratorEvent::Key {
            origin,
            state,
            id,
            action,
        } => decode_key(*origin, *state, *id, *action),
        CollaboratorEvent::PowerButton => Some(ProductMessage::Power(true)),
        CollaboratorEvent::Autowake { active } => Some(ProductMessage::AutowakeStatus {
            active: active.unwrap_or(false),
        }),
        CollaboratorEvent::SoftwareUpdate { required } => {
            Some(ProductMessage::SoftwareUpdateStatus {
                required: required.unwrap_or(false),
            })
        }
        CollaboratorEvent::Setup { required } => Some(ProductMessage::SetupStatus {
            required: required.unwrap_or(false),
        }),
        CollaboratorEvent::Playback { request } => match request {
            Some(request) => Some(ProductMessage::PlaybackRequest(*request)),
            None => {
                warn!("Dropping playback notification without a request");
                None
            }
        },
        CollaboratorEvent::Volume { level, muted } => match level {
            Some(level) => Some(ProductMessage::VolumeStatus {
                level: (*level).min(100),
                muted: muted.unwrap_or(false),
            }),
            None => {
                warn!("Dropping volume notification without a level");
                None
            }
        },
    }
}

fn decode_slot_selected(slot: Option<u32>) -> Option<ProductMessage> {
    match slot {
        Some(slot) => Some(ProductMessage::SelectSourceSlot {
            slot: SlotId::new(slot),
        }),
        None => {
            warn!("Dropping slot selection without a slot id");
            None
        }
    }
}

fn decode_wireless(configured: Option<bool>, frequency_khz: Option<u32>) -> Option<ProductMessage> {
    match frequency_khz {
        Some(frequency_khz) => Some(ProductMessage::WirelessStatus {
            configured: configured.unwrap_or(false),
            frequency_khz,
        }),
        None => {
            warn!("Dropping wireless status with an unknown frequency");
            None
        }
    }
}

fn decode_key(
    origin: Option<KeyOrigin>,
    state: Option<KeyState>,
    id: Option<u32>,
    action: Option<u32>,
) -> Option<ProductMessage> {
    let (Some(origin), Some(state), Some(id)) = (origin, state, id) else {
        warn!(
            ?origin,
            ?state,
            ?id,
            "Dropping key event missing origin, state or id"
        );
        return None;
    };

    let Some(code) = action else {
        warn!(?origin, ?state, id, "Dropping key event without an action");
        return None;
    };

    match KeyAction::try_from(code) {
        Ok(action) => {
            debug!(?origin, ?state, id, %action, "Decoded key event");
            Some(ProductMessage::KeyData { action })
        }
        Err(err) => {
            warn!(?origin, ?state, id, "Dropping key event: {}", err);
            None
        }
    }
}

fn set(flags: &mut ReadinessFlags, flag: Flag, value: bool, out: &mut Normalized) {
    if flags.update_flag(flag, value) {
        out.changed.push((flag, value));
    }
}

/// Apply a message's flag updates and produce the event to dispatch
pub fn normalize(flags: &mut ReadinessFlags, message: &ProductMessage) -> Normalized {
    let mut out = Normalized::default();

    let event = match *message {
        ProductMessage::LpmStatus { connected } => {
            set(flags, Flag::LpmConnected, connected, &mut out);
            Some(ProductEvent::LpmState(connected))
        }
        ProductMessage::CapsStatus { initialized } => {
            set(flags, Flag::CapsInitialized, initialized, &mut out);
            Some(ProductEvent::CapsState(initialized))
        }
        ProductMessage::AudioPathStatus { connected } => {
            set(flags, Flag::AudioPathConnected, connected, &mut out);
            Some(ProductEvent::AudioPathState(connected))
        }
        ProductMessage::SelectSourceStatus { initialized } => {
            set(flags, Flag::StsInitialized, initialized, &mut out);
            // Only completion is meaningful to the states
            initialized.then_some(ProductEvent::StsSourcesInit)
        }
        ProductMessage::SelectSourceSlot { slot } => Some(ProductEvent::SourceSlotSelected(slot)),
        ProductMessage::NetworkStatus {
            configured,
            connected,
            ..
        } => {
            set(flags, Flag::NetworkConfigured, configured, &mut out);
            set(flags, Flag::NetworkConnected, connected, &mut out);
            Some(ProductEvent::NetworkState {
                configured,
                connected,
            })
        }
        ProductMessage::WirelessStatus { configured, .. } => {
            set(flags, Flag::NetworkConfigured, configured, &mut out);
            Some(ProductEvent::NetworkState {
                configured,
                connected: flags.network_connected,
            })
        }
        ProductMessage::VoiceStatus {
            microphone_enabled,
            account_configured,
        } => {
            set(flags, Flag::MicrophoneEnabled, microphone_enabled, &mut out);
            set(flags, Flag::AccountConfigured, account_configured, &mut out);
            Some(ProductEvent::VoiceState(flags.is_voice_configured()))
        }
        ProductMessage::KeyData {
            action: KeyAction::Power,
        } => Some(ProductEvent::PowerState),
        ProductMessage::KeyData { action } => Some(ProductEvent::KeyAction(action)),
        ProductMessage::Power(true) => Some(ProductEvent::PowerState),
        ProductMessage::Power(false) => {
            debug!("Ignoring power release");
            None
        }
        ProductMessage::AutowakeStatus { active } => {
            set(flags, Flag::AutoWakeEnabled, active, &mut out);
            Some(ProductEvent::AutowakeStatus(active))
        }
        ProductMessage::SoftwareUpdateStatus { required } => {
            set(flags, Flag::SoftwareUpdateRequired, required, &mut out);
            Some(ProductEvent::SoftwareUpdateState(required))
        }
        ProductMessage::SetupStatus { required } => {
            set(flags, Flag::SetupRequired, required, &mut out);
            Some(ProductEvent::SetupState(required))
        }
        ProductMessage::PlaybackRequest(request) => Some(ProductEvent::PlaybackRequest(request)),
        // Audio levels are tracked by the core, not the machine
        ProductMessage::VolumeStatus { .. } => None,
    };

    out.event = event;
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{NetworkType, PlaybackRequest};

    fn key(action: Option<u32>) -> CollaboratorEvent {
        CollaboratorEvent::Key {
            origin: Some(KeyOrigin::Console),
            state: Some(KeyState::Pressed),
            id: Some(7),
            action,
        }
    }

    #[test]
    fn test_absent_booleans_default_to_false() {
        assert_eq!(
            decode_raw(&CollaboratorEvent::Autowake { active: None }),
            Some(ProductMessage::AutowakeStatus { active: false })
        );
        assert_eq!(
            decode_raw(&CollaboratorEvent::Network {
                configured: Some(true),
                connected: None,
                network_type: None,
            }),
            Some(ProductMessage::NetworkStatus {
                configured: true,
                connected: false,
                network_type: NetworkType::Unknown,
            })
        );
    }

    #[test]
    fn test_key_missing_identity_is_dropped() {
        let missing_origin = CollaboratorEvent::Key {
            origin: None,
            state: Some(KeyState::Pressed),
            id: Some(1),
            action: Some(9),
        };
        let missing_state = CollaboratorEvent::Key {
            origin: Some(KeyOrigin::Ir),
            state: None,
            id: Some(1),
            action: Some(9),
        };
        let missing_id = CollaboratorEvent::Key {
            origin: Some(KeyOrigin::Ir),
            state: Some(KeyState::Released),
            id: None,
            action: Some(9),
        };
        assert_eq!(decode_raw(&missing_origin), None);
        assert_eq!(decode_raw(&missing_state), None);
        assert_eq!(decode_raw(&missing_id), None);
    }

    #[test]
    fn test_key_action_codes() {
        assert_eq!(decode_raw(&key(None)), None);
        assert_eq!(decode_raw(&key(Some(0))), None);
        assert_eq!(decode_raw(&key(Some(999))), None);
        assert_eq!(
            decode_raw(&key(Some(9))),
            Some(ProductMessage::KeyData {
                action: KeyAction::VolumeUp
            })
        );
    }

    #[test]
    fn test_wireless_without_frequency_is_dropped() {
        let event = CollaboratorEvent::Wireless {
            configured: Some(true),
            frequency_khz: None,
        };
        assert_eq!(decode_raw(&event), None);
    }

    #[test]
    fn test_power_key_becomes_power_event() {
        let mut flags = ReadinessFlags::new();
        let normalized = normalize(
            &mut flags,
            &ProductMessage::KeyData {
                action: KeyAction::Power,
            },
        );
        assert_eq!(normalized.event, Some(ProductEvent::PowerState));
        assert!(normalized.changed.is_empty());
    }

    #[test]
    fn test_power_release_is_not_dispatched() {
        let mut flags = ReadinessFlags::new();
        assert_eq!(normalize(&mut flags, &ProductMessage::Power(false)).event, None);
    }

    #[test]
    fn test_flags_update_before_event() {
        let mut flags = ReadinessFlags::new();
        let normalized = normalize(
            &mut flags,
            &ProductMessage::VoiceStatus {
                microphone_enabled: true,
                account_configured: true,
            },
        );
        assert_eq!(normalized.event, Some(ProductEvent::VoiceState(true)));
        assert_eq!(
            normalized.changed,
            vec![(Flag::MicrophoneEnabled, true), (Flag::AccountConfigured, true)]
        );
    }

    #[test]
    fn test_wireless_sets_network_configured() {
        let mut flags = ReadinessFlags::new();
        let normalized = normalize(
            &mut flags,
            &ProductMessage::WirelessStatus {
                configured: true,
                frequency_khz: 5000,
            },
        );
        assert!(flags.network_configured);
        assert_eq!(
            normalized.event,
            Some(ProductEvent::NetworkState {
                configured: true,
                connected: false
            })
        );
    }

    #[test]
    fn test_sources_not_initialized_is_not_dispatched() {
        let mut flags = ReadinessFlags::new();
        let normalized = normalize(
            &mut flags,
            &ProductMessage::SelectSourceStatus { initialized: false },
        );
        assert_eq!(normalized.event, None);
        assert!(!flags.sts_initialized);
    }

    #[test]
    fn test_playback_and_volume() {
        assert_eq!(
            decode_raw(&CollaboratorEvent::Playback {
                request: Some(PlaybackRequest::Pause)
            }),
            Some(ProductMessage::PlaybackRequest(PlaybackRequest::Pause))
        );
        assert_eq!(
            decode_raw(&CollaboratorEvent::Volume {
                level: Some(150),
                muted: None
            }),
            Some(ProductMessage::VolumeStatus {
                level: 100,
                muted: false
            })
        );
    }
}

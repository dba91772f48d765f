//! Table-driven transition tests
//!
//! Each case places a booted core in a starting state with given readiness,
//! feeds one message and checks where the machine ends up.

use rstest::rstest;

use product_state::{
    CollaboratorEvent, Effect, KeyAction, KeyOrigin, KeyState, NetworkType, PlaybackRequest,
    ProductCommand, ProductCore, ProductMessage, SlotId, SourceSelection, StateId, SystemState,
    TimerKind, TransportAction,
};

// ============================================================================
// Test Helpers
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
struct Readiness {
    network_configured: bool,
    network_connected: bool,
    voice: bool,
    autowake: bool,
}

const NONE: Readiness = Readiness {
    network_configured: false,
    network_connected: false,
    voice: false,
    autowake: false,
};

const NETWORK: Readiness = Readiness {
    network_configured: true,
    network_connected: true,
    voice: false,
    autowake: false,
};

const FULL: Readiness = Readiness {
    network_configured: true,
    network_connected: true,
    voice: true,
    autowake: false,
};

fn booted_core() -> ProductCore {
    let mut core = ProductCore::default();
    core.start();
    core.handle_message(ProductMessage::LpmStatus { connected: true });
    core.handle_message(ProductMessage::CapsStatus { initialized: true });
    core.handle_message(ProductMessage::AudioPathStatus { connected: true });
    core.handle_message(ProductMessage::SelectSourceStatus { initialized: true });
    core
}

/// Booted core with the given readiness, forced into `state`
fn core_in(state: StateId, readiness: Readiness) -> ProductCore {
    let mut core = booted_core();
    core.handle_message(ProductMessage::VoiceStatus {
        microphone_enabled: readiness.voice,
        account_configured: readiness.voice,
    });
    core.handle_message(ProductMessage::NetworkStatus {
        configured: readiness.network_configured,
        connected: readiness.network_connected,
        network_type: NetworkType::Wireless,
    });
    if readiness.autowake {
        core.handle_message(ProductMessage::AutowakeStatus { active: true });
    }
    core.force_state(state);
    assert_eq!(core.active_state(), state, "setup failed to reach {}", state);
    core
}

fn key(action: KeyAction) -> ProductMessage {
    ProductMessage::KeyData { action }
}

fn network(configured: bool, connected: bool) -> ProductMessage {
    ProductMessage::NetworkStatus {
        configured,
        connected,
        network_type: NetworkType::Wireless,
    }
}

// ============================================================================
// Transitions
// ============================================================================

#[rstest]
// Off
#[case::off_power(StateId::Off, NETWORK, ProductMessage::Power(true), StateId::NetworkStandbyConfigured)]
#[case::off_power_key(StateId::Off, NONE, key(KeyAction::Power), StateId::NetworkStandbyUnconfigured)]
#[case::off_lpm_lost(StateId::Off, NONE, ProductMessage::LpmStatus { connected: false }, StateId::Booting)]
// Network standby siblings
#[case::nsc_unconfigured(StateId::NetworkStandbyConfigured, NETWORK, network(false, false), StateId::NetworkStandbyUnconfigured)]
#[case::nsu_configured(StateId::NetworkStandbyUnconfigured, NONE, network(true, false), StateId::NetworkStandbyConfigured)]
#[case::nsc_voice_ready(StateId::NetworkStandbyConfigured, NETWORK, ProductMessage::VoiceStatus { microphone_enabled: true, account_configured: true }, StateId::IdleVoiceConfigured)]
#[case::nsu_autowake(StateId::NetworkStandbyUnconfigured, NONE, ProductMessage::AutowakeStatus { active: true }, StateId::IdleVoiceUnconfigured)]
#[case::nsc_autowake_voice(StateId::NetworkStandbyConfigured, FULL, ProductMessage::AutowakeStatus { active: true }, StateId::IdleVoiceConfigured)]
// Idle siblings
#[case::ivc_voice_lost(StateId::IdleVoiceConfigured, FULL, ProductMessage::VoiceStatus { microphone_enabled: false, account_configured: true }, StateId::IdleVoiceUnconfigured)]
#[case::ivu_voice_ready(StateId::IdleVoiceUnconfigured, NETWORK, ProductMessage::VoiceStatus { microphone_enabled: true, account_configured: true }, StateId::IdleVoiceConfigured)]
#[case::ivc_network_lost(StateId::IdleVoiceConfigured, FULL, network(false, false), StateId::NetworkStandbyUnconfigured)]
#[case::ivc_disconnected(StateId::IdleVoiceConfigured, FULL, network(true, false), StateId::IdleVoiceUnconfigured)]
#[case::ivu_network_lost(StateId::IdleVoiceUnconfigured, NETWORK, network(false, false), StateId::NetworkStandbyUnconfigured)]
// Playable
#[case::playable_power(StateId::NetworkStandbyConfigured, NETWORK, ProductMessage::Power(true), StateId::PlayingInactive)]
#[case::playable_start(StateId::IdleVoiceUnconfigured, NETWORK, ProductMessage::PlaybackRequest(PlaybackRequest::Start), StateId::PlayingActive)]
#[case::playable_source_key(StateId::NetworkStandbyUnconfigured, NONE, key(KeyAction::Source), StateId::PlayingActive)]
#[case::playable_preset_key(StateId::IdleVoiceConfigured, FULL, key(KeyAction::Preset4), StateId::PlayingActive)]
// Playing
#[case::active_pause(StateId::PlayingActive, NETWORK, ProductMessage::PlaybackRequest(PlaybackRequest::Pause), StateId::PlayingInactive)]
#[case::active_stop(StateId::PlayingActive, NETWORK, ProductMessage::PlaybackRequest(PlaybackRequest::Stop), StateId::PlayingInactive)]
#[case::inactive_start(StateId::PlayingInactive, NETWORK, ProductMessage::PlaybackRequest(PlaybackRequest::Start), StateId::PlayingActive)]
#[case::playing_power_unconfigured(StateId::PlayingActive, NONE, ProductMessage::Power(true), StateId::NetworkStandbyUnconfigured)]
#[case::playing_power_configured(StateId::PlayingInactive, NETWORK, ProductMessage::Power(true), StateId::IdleVoiceUnconfigured)]
#[case::playing_power_voice(StateId::PlayingActive, FULL, ProductMessage::Power(true), StateId::IdleVoiceConfigured)]
// Regressions
#[case::on_lpm_lost(StateId::PlayingActive, NETWORK, ProductMessage::LpmStatus { connected: false }, StateId::Booting)]
#[case::on_caps_lost(StateId::IdleVoiceConfigured, FULL, ProductMessage::CapsStatus { initialized: false }, StateId::Booting)]
#[case::on_audio_lost(StateId::NetworkStandbyConfigured, NETWORK, ProductMessage::AudioPathStatus { connected: false }, StateId::Booting)]
#[case::updating_tolerates_lpm(StateId::UpdatingSoftware, NONE, ProductMessage::LpmStatus { connected: false }, StateId::UpdatingSoftware)]
#[case::on_update_required(StateId::IdleVoiceConfigured, FULL, ProductMessage::SoftwareUpdateStatus { required: true }, StateId::UpdatingSoftware)]
// Setup
#[case::setup_done(StateId::Setup, NETWORK, ProductMessage::SetupStatus { required: false }, StateId::NetworkStandbyConfigured)]
#[case::setup_power(StateId::Setup, NONE, ProductMessage::Power(true), StateId::Setup)]
#[case::ap_setup_key(StateId::NetworkStandbyConfigured, NETWORK, key(KeyAction::ApSetup), StateId::Setup)]
// Informational only
#[case::slot_selected(StateId::IdleVoiceConfigured, FULL, ProductMessage::SelectSourceSlot { slot: SlotId::new(2) }, StateId::IdleVoiceConfigured)]
#[case::booting_ignores_power(StateId::Booting, NONE, ProductMessage::Power(true), StateId::Booting)]
fn test_transition(
    #[case] start: StateId,
    #[case] readiness: Readiness,
    #[case] message: ProductMessage,
    #[case] expected: StateId,
) {
    let mut core = core_in(start, readiness);
    core.handle_message(message);
    assert_eq!(core.active_state(), expected);
}

// ============================================================================
// Timers
// ============================================================================

#[rstest]
#[case::no_network(StateId::NetworkStandbyUnconfigured, NONE, TimerKind::NoNetworkConfigured, StateId::Off)]
#[case::voice_unconfigured(StateId::IdleVoiceUnconfigured, NETWORK, TimerKind::VoiceUnconfigured, StateId::NetworkStandbyConfigured)]
#[case::voice_unconfigured_no_network(StateId::IdleVoiceUnconfigured, NONE, TimerKind::VoiceUnconfigured, StateId::NetworkStandbyUnconfigured)]
#[case::user_inactivity(StateId::PlayingActive, NETWORK, TimerKind::PlayingUserInactivity, StateId::NetworkStandbyConfigured)]
#[case::no_audio(StateId::PlayingInactive, NETWORK, TimerKind::PlayingNoAudio, StateId::IdleVoiceUnconfigured)]
#[case::stale_kind(StateId::PlayingActive, NETWORK, TimerKind::PlayingNoAudio, StateId::PlayingActive)]
fn test_timer_expiry(
    #[case] start: StateId,
    #[case] readiness: Readiness,
    #[case] kind: TimerKind,
    #[case] expected: StateId,
) {
    let mut core = core_in(start, readiness);
    core.handle_timer(kind);
    assert_eq!(core.active_state(), expected);
}

#[test]
fn test_voice_unconfigured_timer_ignored_with_autowake() {
    let readiness = Readiness {
        autowake: true,
        ..NETWORK
    };
    let mut core = core_in(StateId::IdleVoiceUnconfigured, readiness);
    core.handle_timer(TimerKind::VoiceUnconfigured);
    assert_eq!(core.active_state(), StateId::IdleVoiceUnconfigured);
}

#[test]
fn test_timers_follow_state_lifetime() {
    let mut core = core_in(StateId::NetworkStandbyConfigured, NETWORK);

    let outcome = core.handle_message(network(false, false));
    assert!(outcome
        .effects
        .contains(&Effect::StartTimer(TimerKind::NoNetworkConfigured)));

    let outcome = core.handle_message(network(true, false));
    assert!(outcome
        .effects
        .contains(&Effect::CancelTimer(TimerKind::NoNetworkConfigured)));
}

#[test]
fn test_key_restarts_playing_timer_and_bubbles() {
    let mut core = core_in(StateId::PlayingActive, NETWORK);
    let outcome = core.handle_message(key(KeyAction::SkipForward));

    assert_eq!(
        outcome.effects,
        vec![
            Effect::StartTimer(TimerKind::PlayingUserInactivity),
            Effect::Command(ProductCommand::Transport(TransportAction::SkipForward)),
        ]
    );
    let dispatch = outcome.dispatch.unwrap_or_default();
    assert_eq!(dispatch.handled_by, Some(StateId::Playing));
}

#[test]
fn test_autowake_toggles_voice_unconfigured_timer() {
    let mut core = core_in(StateId::IdleVoiceUnconfigured, NETWORK);

    let outcome = core.handle_message(ProductMessage::AutowakeStatus { active: true });
    assert!(outcome
        .effects
        .contains(&Effect::CancelTimer(TimerKind::VoiceUnconfigured)));

    let outcome = core.handle_message(ProductMessage::AutowakeStatus { active: false });
    assert!(outcome
        .effects
        .contains(&Effect::StartTimer(TimerKind::VoiceUnconfigured)));
}

// ============================================================================
// Commands
// ============================================================================

#[rstest]
#[case::volume_up(KeyAction::VolumeUp, ProductCommand::SetVolume(41))]
#[case::volume_down(KeyAction::VolumeDown, ProductCommand::SetVolume(39))]
#[case::mute(KeyAction::Mute, ProductCommand::SetMute(true))]
#[case::play_pause(KeyAction::PlayPause, ProductCommand::Transport(TransportAction::PlayPause))]
#[case::thumb_up(KeyAction::ThumbUp, ProductCommand::Transport(TransportAction::ThumbUp))]
#[case::tv(KeyAction::Tv, ProductCommand::SetSource(SourceSelection::Tv))]
#[case::factory_default(KeyAction::FactoryDefault, ProductCommand::FactoryDefault)]
fn test_key_commands_while_playing(#[case] action: KeyAction, #[case] expected: ProductCommand) {
    let mut core = core_in(StateId::PlayingActive, NETWORK);
    core.handle_message(ProductMessage::VolumeStatus {
        level: 40,
        muted: false,
    });

    let outcome = core.handle_message(key(action));
    let commands: Vec<_> = outcome.commands().cloned().collect();
    assert_eq!(commands, vec![expected]);
    assert!(core.active_state() == StateId::PlayingActive);
}

#[test]
fn test_volume_clamped_at_maximum() {
    let mut core = core_in(StateId::PlayingActive, NETWORK);
    core.handle_message(ProductMessage::VolumeStatus {
        level: 100,
        muted: false,
    });
    let outcome = core.handle_message(key(KeyAction::VolumeUp));
    assert_eq!(
        outcome.commands().cloned().collect::<Vec<_>>(),
        vec![ProductCommand::SetVolume(100)]
    );
}

#[test]
fn test_source_key_selects_then_plays() {
    let mut core = core_in(StateId::NetworkStandbyConfigured, NETWORK);
    let outcome = core.handle_message(key(KeyAction::Preset2));
    let commands: Vec<_> = outcome.commands().cloned().collect();
    assert_eq!(
        commands,
        vec![
            ProductCommand::SetSource(SourceSelection::Preset(2)),
            ProductCommand::SetSystemState(SystemState::On),
        ]
    );
}

#[test]
fn test_off_requests_power_off() {
    let mut core = core_in(StateId::NetworkStandbyUnconfigured, NONE);
    let outcome = core.force_state(StateId::Off);
    assert!(outcome
        .effects
        .contains(&Effect::Command(ProductCommand::RequestPowerOff)));
}

#[test]
fn test_update_complete_requests_reboot() {
    let mut core = core_in(StateId::UpdatingSoftware, NONE);
    let outcome = core.handle_message(ProductMessage::SoftwareUpdateStatus { required: false });
    assert_eq!(
        outcome.commands().cloned().collect::<Vec<_>>(),
        vec![ProductCommand::RequestReboot { delay_seconds: 5 }]
    );
    assert_eq!(core.active_state(), StateId::UpdatingSoftware);
}

// ============================================================================
// Boot routing
// ============================================================================

#[rstest]
#[case::plain(None, StateId::NetworkStandbyUnconfigured)]
#[case::update(Some(ProductMessage::SoftwareUpdateStatus { required: true }), StateId::UpdatingSoftware)]
#[case::setup(Some(ProductMessage::SetupStatus { required: true }), StateId::Setup)]
fn test_boot_exit_routing(#[case] before_boot: Option<ProductMessage>, #[case] expected: StateId) {
    let mut core = ProductCore::default();
    core.start();
    if let Some(message) = before_boot {
        core.handle_message(message);
    }
    core.handle_message(ProductMessage::SelectSourceStatus { initialized: true });
    core.handle_message(ProductMessage::AudioPathStatus { connected: true });
    core.handle_message(ProductMessage::CapsStatus { initialized: true });
    assert_eq!(core.active_state(), StateId::Booting);
    core.handle_message(ProductMessage::LpmStatus { connected: true });
    assert_eq!(core.active_state(), expected);
}

#[test]
fn test_boot_in_documented_order() {
    let mut core = ProductCore::default();
    core.start();
    core.handle_message(ProductMessage::AudioPathStatus { connected: true });
    core.handle_message(ProductMessage::CapsStatus { initialized: true });
    core.handle_message(ProductMessage::LpmStatus { connected: true });
    assert!(!core.flags().is_booted());
    assert_eq!(core.active_state(), StateId::Booting);

    core.handle_message(ProductMessage::SelectSourceStatus { initialized: true });
    assert!(core.flags().is_booted());
    assert_ne!(core.active_state(), StateId::Booting);
}

// ============================================================================
// Named scenarios
// ============================================================================

#[test]
fn test_network_sibling_switch_keeps_ancestors() {
    let mut core = core_in(StateId::NetworkStandbyConfigured, NETWORK);
    let outcome = core.handle_message(network(false, false));
    let dispatch = outcome.dispatch.clone().unwrap_or_default();

    assert_eq!(core.active_state(), StateId::NetworkStandbyUnconfigured);
    assert_eq!(dispatch.exited, vec![StateId::NetworkStandbyConfigured]);
    assert_eq!(dispatch.entered, vec![StateId::NetworkStandbyUnconfigured]);
    for ancestor in [StateId::NetworkStandby, StateId::Playable, StateId::On] {
        assert!(!dispatch.exited.contains(&ancestor));
        assert!(!dispatch.entered.contains(&ancestor));
    }
    assert!(!outcome
        .commands()
        .any(|command| matches!(command, ProductCommand::SetSystemState(_))));
}

#[test]
fn test_malformed_key_changes_nothing() {
    let mut core = core_in(StateId::NetworkStandbyConfigured, NETWORK);
    let flags = *core.flags();

    let outcome = core.handle_raw(&CollaboratorEvent::Key {
        origin: Some(KeyOrigin::Capsense),
        state: None,
        id: None,
        action: Some(KeyAction::Power.code()),
    });

    assert!(outcome.dispatch.is_none());
    assert!(outcome.changed.is_empty());
    assert_eq!(*core.flags(), flags);
    assert_eq!(core.active_state(), StateId::NetworkStandbyConfigured);
}

#[test]
fn test_wireless_before_network_status() {
    let mut core = core_in(StateId::NetworkStandbyUnconfigured, NONE);
    assert!(!core.flags().network_configured);

    core.handle_message(ProductMessage::WirelessStatus {
        configured: true,
        frequency_khz: 5000,
    });

    assert!(core.flags().network_configured);
    assert_eq!(core.active_state(), StateId::NetworkStandbyConfigured);
}

#[test]
fn test_raw_key_reaches_machine() {
    let mut core = core_in(StateId::NetworkStandbyConfigured, NETWORK);
    core.handle_raw(&CollaboratorEvent::Key {
        origin: Some(KeyOrigin::Ir),
        state: Some(KeyState::Pressed),
        id: Some(4),
        action: Some(KeyAction::Power.code()),
    });
    assert_eq!(core.active_state(), StateId::PlayingInactive);
}

//! Readiness tracking
//!
//! Holds the latest reported status of every subsystem the controller
//! depends on. Each flag reflects only the most recent report, so a flag may
//! flap between true and false; nothing here assumes monotonic progress.
//!
//! The flags are owned by the core task and mutated only by the normalizer.
//! Other threads only ever see copies (see [`ReadinessFlags`] being `Copy`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::StateError;

/// A single named readiness flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Flag {
    LpmConnected,
    CapsInitialized,
    AudioPathConnected,
    StsInitialized,
    NetworkConfigured,
    NetworkConnected,
    AutoWakeEnabled,
    AccountConfigured,
    MicrophoneEnabled,
    SoftwareUpdateRequired,
    SetupRequired,
}

impl Flag {
    pub const ALL: [Flag; 11] = [
        Flag::LpmConnected,
        Flag::CapsInitialized,
        Flag::AudioPathConnected,
        Flag::StsInitialized,
        Flag::NetworkConfigured,
        Flag::NetworkConnected,
        Flag::AutoWakeEnabled,
        Flag::AccountConfigured,
        Flag::MicrophoneEnabled,
        Flag::SoftwareUpdateRequired,
        Flag::SetupRequired,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Flag::LpmConnected => "lpmConnected",
            Flag::CapsInitialized => "capsInitialized",
            Flag::AudioPathConnected => "audioPathConnected",
            Flag::StsInitialized => "stsInitialized",
            Flag::NetworkConfigured => "networkConfigured",
            Flag::NetworkConnected => "networkConnected",
            Flag::AutoWakeEnabled => "autoWakeEnabled",
            Flag::AccountConfigured => "accountConfigured",
            Flag::MicrophoneEnabled => "microphoneEnabled",
            Flag::SoftwareUpdateRequired => "softwareUpdateRequired",
            Flag::SetupRequired => "setupRequired",
        }
    }
}

impl FromStr for Flag {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Flag::ALL
            .into_iter()
            .find(|flag| flag.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| StateError::UnknownFlag(s.to_string()))
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Derived readiness predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Predicate {
    /// LPM, CAPS, audio path and STS are all up
    IsBooted,
    /// Microphone enabled and voice account configured
    IsVoiceConfigured,
}

impl Predicate {
    pub fn name(self) -> &'static str {
        match self {
            Predicate::IsBooted => "IsBooted",
            Predicate::IsVoiceConfigured => "IsVoiceConfigured",
        }
    }
}

impl FromStr for Predicate {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Predicate::IsBooted, Predicate::IsVoiceConfigured]
            .into_iter()
            .find(|predicate| predicate.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| StateError::UnknownPredicate(s.to_string()))
    }
}

/// Latest known status of each subsystem
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessFlags {
    pub lpm_connected: bool,
    pub caps_initialized: bool,
    pub audio_path_connected: bool,
    pub sts_initialized: bool,
    pub network_configured: bool,
    pub network_connected: bool,
    pub auto_wake_enabled: bool,
    pub account_configured: bool,
    pub microphone_enabled: bool,
    pub software_update_required: bool,
    pub setup_required: bool,
}

impl ReadinessFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a flag, returning whether its value changed
    pub fn update_flag(&mut self, flag: Flag, value: bool) -> bool {
        let slot = self.slot_mut(flag);
        let changed = *slot != value;
        *slot = value;
        changed
    }

    pub fn get(&self, flag: Flag) -> bool {
        match flag {
            Flag::LpmConnected => self.lpm_connected,
            Flag::CapsInitialized => self.caps_initialized,
            Flag::AudioPathConnected => self.audio_path_connected,
            Flag::StsInitialized => self.sts_initialized,
            Flag::NetworkConfigured => self.network_configured,
            Flag::NetworkConnected => self.network_connected,
            Flag::AutoWakeEnabled => self.auto_wake_enabled,
            Flag::AccountConfigured => self.account_configured,
            Flag::MicrophoneEnabled => self.microphone_enabled,
            Flag::SoftwareUpdateRequired => self.software_update_required,
            Flag::SetupRequired => self.setup_required,
        }
    }

    fn slot_mut(&mut self, flag: Flag) -> &mut bool {
        match flag {
            Flag::LpmConnected => &mut self.lpm_connected,
            Flag::CapsInitialized => &mut self.caps_initialized,
            Flag::AudioPathConnected => &mut self.audio_path_connected,
            Flag::StsInitialized => &mut self.sts_initialized,
            Flag::NetworkConfigured => &mut self.network_configured,
            Flag::NetworkConnected => &mut self.network_connected,
            Flag::AutoWakeEnabled => &mut self.auto_wake_enabled,
            Flag::AccountConfigured => &mut self.account_configured,
            Flag::MicrophoneEnabled => &mut self.microphone_enabled,
            Flag::SoftwareUpdateRequired => &mut self.software_update_required,
            Flag::SetupRequired => &mut self.setup_required,
        }
    }

    pub fn is_booted(&self) -> bool {
        self.lpm_connected && self.caps_initialized && self.audio_path_connected && self.sts_initialized
    }

    pub fn is_voice_configured(&self) -> bool {
        self.microphone_enabled && self.account_configured
    }

    pub fn evaluate(&self, predicate: Predicate) -> bool {
        match predicate {
            Predicate::IsBooted => self.is_booted(),
            Predicate::IsVoiceConfigured => self.is_voice_configured(),
        }
    }

    /// Evaluate a predicate by name
    ///
    /// An unknown name is a construction bug: debug builds panic, release
    /// builds log and answer `false`.
    pub fn evaluate_named(&self, name: &str) -> bool {
        match name.parse::<Predicate>() {
            Ok(predicate) => self.evaluate(predicate),
            Err(err) => {
                debug_assert!(false, "{}", err);
                tracing::error!("{}; treating as false", err);
                false
            }
        }
    }
}

impl fmt::Display for ReadinessFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for flag in Flag::ALL {
            if !first {
                f.write_str("|")?;
            }
            first = false;
            write!(f, "{}={}", flag.name(), u8::from(self.get(flag)))?;
        }
        Ok(())
    }
}

//! Configuration for the product controller
//!
//! Timer durations, core settings and facade timeouts. Hosts may embed these
//! in their own settings file; loading and persisting them is up to the host.

use std::time::Duration;

use product_state::{CoreSettings, TimerKind};
use serde::{Deserialize, Serialize};

use crate::error::{ControllerError, Result};

/// Inactivity timeouts, one per timer kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerDurations {
    /// Time in network standby without a configured network before powering off
    /// Default: 2 hours
    pub no_network_configured: Duration,

    /// Time idle without voice before dropping to network standby
    /// Default: 20 minutes
    pub voice_unconfigured: Duration,

    /// Time playing without any key press before stopping
    /// Default: 4 hours
    pub playing_user_inactivity: Duration,

    /// Time in the playing state with no audio before stopping
    /// Default: 20 minutes
    pub playing_no_audio: Duration,
}

impl Default for TimerDurations {
    fn default() -> Self {
        Self {
            no_network_configured: Duration::from_secs(2 * 60 * 60),
            voice_unconfigured: Duration::from_secs(20 * 60),
            playing_user_inactivity: Duration::from_secs(4 * 60 * 60),
            playing_no_audio: Duration::from_secs(20 * 60),
        }
    }
}

impl TimerDurations {
    pub fn duration(&self, kind: TimerKind) -> Duration {
        match kind {
            TimerKind::NoNetworkConfigured => self.no_network_configured,
            TimerKind::VoiceUnconfigured => self.voice_unconfigured,
            TimerKind::PlayingUserInactivity => self.playing_user_inactivity,
            TimerKind::PlayingNoAudio => self.playing_no_audio,
        }
    }

    /// Every timer set to the same duration
    pub fn uniform(duration: Duration) -> Self {
        Self {
            no_network_configured: duration,
            voice_unconfigured: duration,
            playing_user_inactivity: duration,
            playing_no_audio: duration,
        }
    }
}

/// Configuration for [`ProductController`](crate::ProductController)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Inactivity timeouts
    pub timers: TimerDurations,

    /// Settings handed to the core
    pub settings: CoreSettings,

    /// How long `status()` waits for the core task
    /// Default: 2 seconds
    pub status_timeout: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            timers: TimerDurations::default(),
            settings: CoreSettings::default(),
            status_timeout: Duration::from_secs(2),
        }
    }
}

impl ControllerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Short timers suitable for tests and demos
    pub fn for_testing() -> Self {
        Self {
            timers: TimerDurations::uniform(Duration::from_millis(50)),
            settings: CoreSettings {
                reboot_delay_secs: 0,
                ..CoreSettings::default()
            },
            status_timeout: Duration::from_secs(1),
        }
    }

    /// Validate the configuration and return any issues
    pub fn validate(&self) -> Result<()> {
        for kind in TimerKind::ALL {
            if self.timers.duration(kind) == Duration::ZERO {
                return Err(ControllerError::Configuration(format!(
                    "Timer {:?} must be greater than 0",
                    kind
                )));
            }
        }

        if self.settings.volume_step == 0 {
            return Err(ControllerError::Configuration(
                "Volume step must be greater than 0".to_string(),
            ));
        }

        if self.status_timeout == Duration::ZERO {
            return Err(ControllerError::Configuration(
                "Status timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn with_timers(mut self, timers: TimerDurations) -> Self {
        self.timers = timers;
        self
    }

    pub fn with_volume_step(mut self, step: u8) -> Self {
        self.settings.volume_step = step;
        self
    }

    pub fn with_status_timeout(mut self, timeout: Duration) -> Self {
        self.status_timeout = timeout;
        self
    }
}

//! Tunables the states read while handling events

use serde::{Deserialize, Serialize};

/// Behavioural settings of the core
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreSettings {
    /// Volume change per volume key press
    pub volume_step: u8,
    /// Delay before rebooting once a software update is no longer pending
    pub reboot_delay_secs: u32,
}

impl Default for CoreSettings {
    fn default() -> Self {
        Self {
            volume_step: 1,
            reboot_delay_secs: 5,
        }
    }
}

/// Last audio level reported by the audio collaborator
///
/// The volume stays `None` until the first report arrives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioLevels {
    pub volume: Option<u8>,
    pub muted: bool,
}

/// Highest volume level accepted by the audio path
pub const MAX_VOLUME: u8 = 100;

impl AudioLevels {
    /// Volume shifted by `delta`, clamped to 0..=100
    pub fn stepped(&self, delta: i16) -> Option<u8> {
        self.volume
            .map(|level| (i16::from(level) + delta).clamp(0, i16::from(MAX_VOLUME)) as u8)
    }
}

//! Outbound commands and side effects
//!
//! States never call collaborators directly. They push [`Effect`]s, and the
//! owner of the core decides how to deliver them: commands go to the
//! collaborator sink, timer effects are scheduled on the core task.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::event::TimerKind;
use crate::model::{SourceSelection, SourceSlot};

/// Power mode requested from the LPM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SystemState {
    Standby,
    Idle,
    On,
}

/// Transport control forwarded to the content service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportAction {
    PlayPause,
    SkipForward,
    SkipBack,
    ThumbUp,
    ThumbDown,
}

/// Wi-Fi band reported to the LPM so it can avoid in-room radio interference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RadioBand {
    /// Radio off or frequency outside every known band
    Invalid,
    Band24,
    Band52,
    Band58,
}

impl RadioBand {
    /// Classify a Wi-Fi channel frequency given in kHz
    pub fn from_frequency_khz(frequency_khz: u32) -> Self {
        match frequency_khz {
            0 => RadioBand::Invalid,
            1..=2_499_999 => RadioBand::Band24,
            5_100_000..=5_699_999 => RadioBand::Band52,
            5_700_000.. => RadioBand::Band58,
            _ => RadioBand::Invalid,
        }
    }
}

/// Command issued to an external collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductCommand {
    RequestPowerOff,
    RequestReboot { delay_seconds: u32 },
    SetVolume(u8),
    SetMute(bool),
    SetSource(SourceSelection),
    RequestWifiRadioStatus { frequency_khz: u32, band: RadioBand },
    RegisterSourceSlots(Vec<SourceSlot>),
    SetSystemState(SystemState),
    SendAutowakeStatus(bool),
    StopPlayback,
    Transport(TransportAction),
    FactoryDefault,
}

impl fmt::Display for ProductCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductCommand::RequestPowerOff => write!(f, "request-power-off"),
            ProductCommand::RequestReboot { delay_seconds } => {
                write!(f, "request-reboot({}s)", delay_seconds)
            }
            ProductCommand::SetVolume(level) => write!(f, "set-volume({})", level),
            ProductCommand::SetMute(muted) => write!(f, "set-mute({})", muted),
            ProductCommand::SetSource(source) => write!(f, "set-source({})", source),
            ProductCommand::RequestWifiRadioStatus { frequency_khz, band } => {
                write!(f, "wifi-radio-status({}kHz, {:?})", frequency_khz, band)
            }
            ProductCommand::RegisterSourceSlots(slots) => {
                write!(f, "register-source-slots({})", slots.len())
            }
            ProductCommand::SetSystemState(state) => write!(f, "set-system-state({:?})", state),
            ProductCommand::SendAutowakeStatus(active) => write!(f, "send-autowake({})", active),
            ProductCommand::StopPlayback => write!(f, "stop-playback"),
            ProductCommand::Transport(action) => write!(f, "transport({:?})", action),
            ProductCommand::FactoryDefault => write!(f, "factory-default"),
        }
    }
}

/// Side effect produced while handling one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Command(ProductCommand),
    StartTimer(TimerKind),
    CancelTimer(TimerKind),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radio_band_classification() {
        assert_eq!(RadioBand::from_frequency_khz(0), RadioBand::Invalid);
        assert_eq!(RadioBand::from_frequency_khz(2_412_000), RadioBand::Band24);
        assert_eq!(RadioBand::from_frequency_khz(5_000), RadioBand::Band24);
        assert_eq!(RadioBand::from_frequency_khz(3_600_000), RadioBand::Invalid);
        assert_eq!(RadioBand::from_frequency_khz(5_180_000), RadioBand::Band52);
        assert_eq!(RadioBand::from_frequency_khz(5_745_000), RadioBand::Band58);
    }
}

//! Logical key actions
//!
//! Raw key codes are resolved to a single logical action per physical gesture
//! by the key handler upstream of the controller. The integer codes here are
//! stable and shared with that handler; code 0 is reserved.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::StateError;

/// A logical key action delivered by the key handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum KeyAction {
    Power = 1,
    Source = 2,
    Preset1 = 3,
    Preset2 = 4,
    Preset3 = 5,
    Preset4 = 6,
    Preset5 = 7,
    Preset6 = 8,
    VolumeUp = 9,
    VolumeDown = 10,
    PlayPause = 11,
    SkipForward = 12,
    SkipBack = 13,
    Mute = 14,
    SoundTouch = 15,
    Connect = 16,
    Action = 17,
    Tv = 18,
    ThumbUp = 19,
    ThumbDown = 20,
    FactoryDefault = 21,
    WifiOff = 22,
    ApSetup = 23,
    PairSpeakers = 24,
}

impl KeyAction {
    /// Every action, in code order
    pub const ALL: [KeyAction; 24] = [
        KeyAction::Power,
        KeyAction::Source,
        KeyAction::Preset1,
        KeyAction::Preset2,
        KeyAction::Preset3,
        KeyAction::Preset4,
        KeyAction::Preset5,
        KeyAction::Preset6,
        KeyAction::VolumeUp,
        KeyAction::VolumeDown,
        KeyAction::PlayPause,
        KeyAction::SkipForward,
        KeyAction::SkipBack,
        KeyAction::Mute,
        KeyAction::SoundTouch,
        KeyAction::Connect,
        KeyAction::Action,
        KeyAction::Tv,
        KeyAction::ThumbUp,
        KeyAction::ThumbDown,
        KeyAction::FactoryDefault,
        KeyAction::WifiOff,
        KeyAction::ApSetup,
        KeyAction::PairSpeakers,
    ];

    /// Stable integer code of this action
    pub fn code(self) -> u32 {
        self as u32
    }

    /// Canonical upper-case name, as used by test harnesses
    pub fn name(self) -> &'static str {
        match self {
            KeyAction::Power => "POWER",
            KeyAction::Source => "SOURCE",
            KeyAction::Preset1 => "PRESET_1",
            KeyAction::Preset2 => "PRESET_2",
            KeyAction::Preset3 => "PRESET_3",
            KeyAction::Preset4 => "PRESET_4",
            KeyAction::Preset5 => "PRESET_5",
            KeyAction::Preset6 => "PRESET_6",
            KeyAction::VolumeUp => "VOLUME_UP",
            KeyAction::VolumeDown => "VOLUME_DOWN",
            KeyAction::PlayPause => "PLAY_PAUSE",
            KeyAction::SkipForward => "SKIP_FORWARD",
            KeyAction::SkipBack => "SKIP_BACK",
            KeyAction::Mute => "MUTE",
            KeyAction::SoundTouch => "SOUNDTOUCH",
            KeyAction::Connect => "CONNECT",
            KeyAction::Action => "ACTION",
            KeyAction::Tv => "TV",
            KeyAction::ThumbUp => "THUMB_UP",
            KeyAction::ThumbDown => "THUMB_DOWN",
            KeyAction::FactoryDefault => "FACTORY_DEFAULT",
            KeyAction::WifiOff => "WIFI_OFF",
            KeyAction::ApSetup => "AP_SETUP",
            KeyAction::PairSpeakers => "PAIR_SPEAKERS",
        }
    }

    /// Preset number (1..=6) if this is a preset action
    pub fn preset(self) -> Option<u8> {
        match self {
            KeyAction::Preset1 => Some(1),
            KeyAction::Preset2 => Some(2),
            KeyAction::Preset3 => Some(3),
            KeyAction::Preset4 => Some(4),
            KeyAction::Preset5 => Some(5),
            KeyAction::Preset6 => Some(6),
            _ => None,
        }
    }
}

impl TryFrom<u32> for KeyAction {
    type Error = StateError;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        // Codes are dense from 1, so the table index is code - 1.
        code.checked_sub(1)
            .and_then(|index| KeyAction::ALL.get(index as usize).copied())
            .ok_or(StateError::InvalidKeyAction(code))
    }
}

impl FromStr for KeyAction {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(code) = s.parse::<u32>() {
            return KeyAction::try_from(code);
        }
        KeyAction::ALL
            .iter()
            .copied()
            .find(|action| action.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| StateError::UnknownKeyActionName(s.to_string()))
    }
}

impl fmt::Display for KeyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_dense_from_one() {
        for (index, action) in KeyAction::ALL.iter().enumerate() {
            assert_eq!(action.code(), index as u32 + 1);
            assert_eq!(KeyAction::try_from(action.code()).unwrap(), *action);
        }
    }

    #[test]
    fn test_code_zero_is_reserved() {
        assert!(matches!(
            KeyAction::try_from(0),
            Err(StateError::InvalidKeyAction(0))
        ));
        assert!(KeyAction::try_from(25).is_err());
    }

    #[test]
    fn test_parse_by_name_or_code() {
        assert_eq!("volume_up".parse::<KeyAction>().unwrap(), KeyAction::VolumeUp);
        assert_eq!("PRESET_4".parse::<KeyAction>().unwrap(), KeyAction::Preset4);
        assert_eq!("18".parse::<KeyAction>().unwrap(), KeyAction::Tv);
        assert!("LOUDER".parse::<KeyAction>().is_err());
    }

    #[test]
    fn test_preset_numbers() {
        assert_eq!(KeyAction::Preset1.preset(), Some(1));
        assert_eq!(KeyAction::Preset6.preset(), Some(6));
        assert_eq!(KeyAction::Mute.preset(), None);
    }
}

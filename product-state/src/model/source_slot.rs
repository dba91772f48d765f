//! Source slot identity and descriptors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a named source slot registered with the source service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotId(u32);

impl SlotId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot-{}", self.0)
    }
}

impl From<u32> for SlotId {
    fn from(id: u32) -> Self {
        SlotId(id)
    }
}

/// Static description of a source slot, registered once at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSlot {
    pub slot_id: SlotId,
    pub display_name: String,
    pub is_primary: bool,
}

impl SourceSlot {
    pub fn new(slot_id: impl Into<SlotId>, display_name: impl Into<String>, is_primary: bool) -> Self {
        Self {
            slot_id: slot_id.into(),
            display_name: display_name.into(),
            is_primary,
        }
    }
}

/// A source the audio path can be switched to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceSelection {
    /// Cycle to the next available source
    Next,
    Tv,
    SoundTouch,
    /// Preset 1..=6
    Preset(u8),
}

impl fmt::Display for SourceSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceSelection::Next => write!(f, "next"),
            SourceSelection::Tv => write!(f, "tv"),
            SourceSelection::SoundTouch => write!(f, "soundtouch"),
            SourceSelection::Preset(n) => write!(f, "preset-{}", n),
        }
    }
}

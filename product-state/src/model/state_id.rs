//! Identity and topology of the product states
//!
//! The tree is fixed at compile time:
//!
//! ```text
//! Top
//!  ├─ Setup
//!  ├─ Booting                (initial state)
//!  ├─ UpdatingSoftware
//!  ├─ Off
//!  └─ On
//!      ├─ Playable
//!      │   ├─ NetworkStandby
//!      │   │   ├─ NetworkStandbyConfigured
//!      │   │   └─ NetworkStandbyUnconfigured
//!      │   └─ Idle
//!      │       ├─ IdleVoiceConfigured
//!      │       └─ IdleVoiceUnconfigured
//!      └─ Playing
//!          ├─ PlayingActive
//!          └─ PlayingInactive
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::StateError;

/// Deepest nesting level in the tree (Top is depth 0)
pub const MAX_DEPTH: usize = 4;

/// Unique identifier of a node in the product state tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateId {
    Top,
    Setup,
    Booting,
    UpdatingSoftware,
    Off,
    On,
    Playable,
    NetworkStandby,
    NetworkStandbyConfigured,
    NetworkStandbyUnconfigured,
    Idle,
    IdleVoiceConfigured,
    IdleVoiceUnconfigured,
    Playing,
    PlayingActive,
    PlayingInactive,
}

impl StateId {
    pub const ALL: [StateId; 16] = [
        StateId::Top,
        StateId::Setup,
        StateId::Booting,
        StateId::UpdatingSoftware,
        StateId::Off,
        StateId::On,
        StateId::Playable,
        StateId::NetworkStandby,
        StateId::NetworkStandbyConfigured,
        StateId::NetworkStandbyUnconfigured,
        StateId::Idle,
        StateId::IdleVoiceConfigured,
        StateId::IdleVoiceUnconfigured,
        StateId::Playing,
        StateId::PlayingActive,
        StateId::PlayingInactive,
    ];

    /// The state the machine starts in
    pub const INITIAL: StateId = StateId::Booting;

    /// Superstate of this state, `None` only for `Top`
    pub const fn parent(self) -> Option<StateId> {
        use StateId::*;
        match self {
            Top => None,
            Setup | Booting | UpdatingSoftware | Off | On => Some(Top),
            Playable | Playing => Some(On),
            NetworkStandby | Idle => Some(Playable),
            NetworkStandbyConfigured | NetworkStandbyUnconfigured => Some(NetworkStandby),
            IdleVoiceConfigured | IdleVoiceUnconfigured => Some(Idle),
            PlayingActive | PlayingInactive => Some(Playing),
        }
    }

    /// Whether the state can be the single active state
    pub const fn is_leaf(self) -> bool {
        use StateId::*;
        !matches!(self, Top | On | Playable | NetworkStandby | Idle | Playing)
    }

    /// Distance from `Top`
    pub fn depth(self) -> usize {
        let mut depth = 0;
        let mut current = self;
        while let Some(parent) = current.parent() {
            depth += 1;
            current = parent;
        }
        depth
    }

    /// Path from `Top` down to and including this state
    pub fn path(self) -> Vec<StateId> {
        let mut path = Vec::with_capacity(MAX_DEPTH + 1);
        let mut current = Some(self);
        while let Some(state) = current {
            path.push(state);
            current = state.parent();
        }
        path.reverse();
        path
    }

    /// Whether `self` is `other` or one of its ancestors
    pub fn contains(self, other: StateId) -> bool {
        let mut current = Some(other);
        while let Some(state) = current {
            if state == self {
                return true;
            }
            current = state.parent();
        }
        false
    }

    /// Direct children, in declaration order
    pub fn children(self) -> impl Iterator<Item = StateId> {
        StateId::ALL
            .into_iter()
            .filter(move |candidate| candidate.parent() == Some(self))
    }

    pub const fn name(self) -> &'static str {
        use StateId::*;
        match self {
            Top => "Top",
            Setup => "Setup",
            Booting => "Booting",
            UpdatingSoftware => "UpdatingSoftware",
            Off => "Off",
            On => "On",
            Playable => "Playable",
            NetworkStandby => "NetworkStandby",
            NetworkStandbyConfigured => "NetworkStandbyConfigured",
            NetworkStandbyUnconfigured => "NetworkStandbyUnconfigured",
            Idle => "Idle",
            IdleVoiceConfigured => "IdleVoiceConfigured",
            IdleVoiceUnconfigured => "IdleVoiceUnconfigured",
            Playing => "Playing",
            PlayingActive => "PlayingActive",
            PlayingInactive => "PlayingInactive",
        }
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StateId {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StateId::ALL
            .into_iter()
            .find(|state| state.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| StateError::UnknownState(s.to_string()))
    }
}

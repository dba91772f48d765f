//! Idle: awake and listening, nothing playing

use tracing::info;

use super::{ProductState, StateContext};
use crate::command::{ProductCommand, SystemState};
use crate::event::TimerKind;
use crate::model::StateId;

pub struct Idle;

impl ProductState for Idle {
    fn id(&self) -> StateId {
        StateId::Idle
    }

    fn enter(&self, ctx: &mut StateContext<'_>) {
        ctx.command(ProductCommand::SetSystemState(SystemState::Idle));
    }
}

/// Voice assistant usable
pub struct IdleVoiceConfigured;

impl ProductState for IdleVoiceConfigured {
    fn id(&self) -> StateId {
        StateId::IdleVoiceConfigured
    }

    fn handle_network_state(
        &self,
        ctx: &mut StateContext<'_>,
        configured: bool,
        connected: bool,
    ) -> bool {
        if !configured && !ctx.flags().auto_wake_enabled {
            ctx.change_state(StateId::NetworkStandbyUnconfigured);
        } else if !connected || !ctx.flags().is_voice_configured() {
            ctx.change_state(StateId::IdleVoiceUnconfigured);
        }
        true
    }

    fn handle_voice_state(&self, ctx: &mut StateContext<'_>, configured: bool) -> bool {
        if !configured {
            ctx.change_state(StateId::IdleVoiceUnconfigured);
        }
        true
    }
}

/// Awake without a usable voice assistant; drops to standby after a while
pub struct IdleVoiceUnconfigured;

impl ProductState for IdleVoiceUnconfigured {
    fn id(&self) -> StateId {
        StateId::IdleVoiceUnconfigured
    }

    fn enter(&self, ctx: &mut StateContext<'_>) {
        if !ctx.flags().auto_wake_enabled {
            ctx.start_timer(TimerKind::VoiceUnconfigured);
        }
    }

    fn exit(&self, ctx: &mut StateContext<'_>) {
        ctx.cancel_timer(TimerKind::VoiceUnconfigured);
    }

    fn handle_autowake_status(&self, ctx: &mut StateContext<'_>, active: bool) -> bool {
        if active {
            ctx.cancel_timer(TimerKind::VoiceUnconfigured);
        } else {
            ctx.start_timer(TimerKind::VoiceUnconfigured);
        }
        true
    }

    fn handle_network_state(
        &self,
        ctx: &mut StateContext<'_>,
        configured: bool,
        _connected: bool,
    ) -> bool {
        if !configured && !ctx.flags().auto_wake_enabled {
            ctx.change_state(StateId::NetworkStandbyUnconfigured);
        } else if ctx.voice_ready() {
            ctx.change_state(StateId::IdleVoiceConfigured);
        }
        true
    }

    fn handle_voice_state(&self, ctx: &mut StateContext<'_>, _configured: bool) -> bool {
        if ctx.voice_ready() {
            ctx.change_state(StateId::IdleVoiceConfigured);
        }
        true
    }

    fn handle_inactivity_timeout(&self, ctx: &mut StateContext<'_>, kind: TimerKind) -> bool {
        if kind != TimerKind::VoiceUnconfigured {
            return false;
        }
        if ctx.flags().auto_wake_enabled {
            return true;
        }
        let target = if ctx.flags().network_configured {
            StateId::NetworkStandbyConfigured
        } else {
            StateId::NetworkStandbyUnconfigured
        };
        info!(%target, "Voice still unconfigured, dropping to network standby");
        ctx.change_state(target);
        true
    }
}

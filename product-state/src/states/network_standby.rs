//! Network standby: lowest powered-on level, network kept alive

use tracing::info;

use super::{resolve_leaf, ProductState, StateContext};
use crate::command::{ProductCommand, SystemState};
use crate::event::TimerKind;
use crate::model::StateId;

pub struct NetworkStandby;

impl ProductState for NetworkStandby {
    fn id(&self) -> StateId {
        StateId::NetworkStandby
    }

    fn enter(&self, ctx: &mut StateContext<'_>) {
        ctx.command(ProductCommand::SetSystemState(SystemState::Standby));
    }

    fn handle_autowake_status(&self, ctx: &mut StateContext<'_>, active: bool) -> bool {
        if !active {
            return false;
        }
        let target = resolve_leaf(StateId::Idle, ctx.flags());
        info!(%target, "Autowake enabled, leaving network standby");
        ctx.change_state(target);
        true
    }
}

/// Network configured but voice not yet usable
pub struct NetworkStandbyConfigured;

impl ProductState for NetworkStandbyConfigured {
    fn id(&self) -> StateId {
        StateId::NetworkStandbyConfigured
    }

    fn handle_network_state(
        &self,
        ctx: &mut StateContext<'_>,
        configured: bool,
        _connected: bool,
    ) -> bool {
        if ctx.voice_ready() {
            ctx.change_state(StateId::IdleVoiceConfigured);
        } else if !configured {
            ctx.change_state(StateId::NetworkStandbyUnconfigured);
        }
        true
    }

    fn handle_voice_state(&self, ctx: &mut StateContext<'_>, _configured: bool) -> bool {
        if ctx.voice_ready() {
            ctx.change_state(StateId::IdleVoiceConfigured);
        }
        true
    }
}

/// No network configured; powers off if that persists
pub struct NetworkStandbyUnconfigured;

impl ProductState for NetworkStandbyUnconfigured {
    fn id(&self) -> StateId {
        StateId::NetworkStandbyUnconfigured
    }

    fn enter(&self, ctx: &mut StateContext<'_>) {
        ctx.start_timer(TimerKind::NoNetworkConfigured);
    }

    fn exit(&self, ctx: &mut StateContext<'_>) {
        ctx.cancel_timer(TimerKind::NoNetworkConfigured);
    }

    fn handle_network_state(
        &self,
        ctx: &mut StateContext<'_>,
        configured: bool,
        _connected: bool,
    ) -> bool {
        if ctx.voice_ready() {
            ctx.change_state(StateId::IdleVoiceConfigured);
        } else if configured {
            ctx.change_state(StateId::NetworkStandbyConfigured);
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
        if kind != TimerKind::NoNetworkConfigured {
            return false;
        }
        info!("No network configured in time, powering off");
        ctx.change_state(StateId::Off);
        true
    }
}

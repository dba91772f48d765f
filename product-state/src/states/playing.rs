//! Playing states

use tracing::info;

use super::{non_playing_target, ProductState, StateContext};
use crate::command::{ProductCommand, SystemState, TransportAction};
use crate::event::TimerKind;
use crate::message::PlaybackRequest;
use crate::model::{KeyAction, StateId};

pub struct Playing;

impl ProductState for Playing {
    fn id(&self) -> StateId {
        StateId::Playing
    }

    fn enter(&self, ctx: &mut StateContext<'_>) {
        ctx.command(ProductCommand::SetSystemState(SystemState::On));
    }

    fn handle_power_state(&self, ctx: &mut StateContext<'_>) -> bool {
        ctx.command(ProductCommand::StopPlayback);
        let target = non_playing_target(ctx.flags());
        ctx.change_state(target);
        true
    }

    fn handle_key_action(&self, ctx: &mut StateContext<'_>, action: KeyAction) -> bool {
        let transport = match action {
            KeyAction::PlayPause => TransportAction::PlayPause,
            KeyAction::SkipForward => TransportAction::SkipForward,
            KeyAction::SkipBack => TransportAction::SkipBack,
            KeyAction::ThumbUp => TransportAction::ThumbUp,
            KeyAction::ThumbDown => TransportAction::ThumbDown,
            _ => return false,
        };
        ctx.command(ProductCommand::Transport(transport));
        true
    }
}

/// Audio playing with a user around
pub struct PlayingActive;

impl ProductState for PlayingActive {
    fn id(&self) -> StateId {
        StateId::PlayingActive
    }

    fn enter(&self, ctx: &mut StateContext<'_>) {
        ctx.start_timer(TimerKind::PlayingUserInactivity);
    }

    fn exit(&self, ctx: &mut StateContext<'_>) {
        ctx.cancel_timer(TimerKind::PlayingUserInactivity);
    }

    fn handle_key_action(&self, ctx: &mut StateContext<'_>, _action: KeyAction) -> bool {
        // Any key counts as user activity; the key itself is handled above
        ctx.start_timer(TimerKind::PlayingUserInactivity);
        false
    }

    fn handle_playback_request(
        &self,
        ctx: &mut StateContext<'_>,
        request: PlaybackRequest,
    ) -> bool {
        match request {
            PlaybackRequest::Pause | PlaybackRequest::Stop => {
                ctx.change_state(StateId::PlayingInactive);
                true
            }
            PlaybackRequest::Start | PlaybackRequest::Play => false,
        }
    }

    fn handle_inactivity_timeout(&self, ctx: &mut StateContext<'_>, kind: TimerKind) -> bool {
        if kind != TimerKind::PlayingUserInactivity {
            return false;
        }
        info!("No user activity while playing");
        ctx.change_state(StateId::Playable);
        true
    }
}

/// Playing selected but no audio flowing
pub struct PlayingInactive;

impl ProductState for PlayingInactive {
    fn id(&self) -> StateId {
        StateId::PlayingInactive
    }

    fn enter(&self, ctx: &mut StateContext<'_>) {
        ctx.start_timer(TimerKind::PlayingNoAudio);
    }

    fn exit(&self, ctx: &mut StateContext<'_>) {
        ctx.cancel_timer(TimerKind::PlayingNoAudio);
    }

    fn handle_key_action(&self, ctx: &mut StateContext<'_>, _action: KeyAction) -> bool {
        ctx.start_timer(TimerKind::PlayingNoAudio);
        false
    }

    fn handle_playback_request(
        &self,
        ctx: &mut StateContext<'_>,
        request: PlaybackRequest,
    ) -> bool {
        match request {
            PlaybackRequest::Start => {
                ctx.change_state(StateId::PlayingActive);
                true
            }
            PlaybackRequest::Stop => {
                ctx.start_timer(TimerKind::PlayingNoAudio);
                true
            }
            PlaybackRequest::Play | PlaybackRequest::Pause => false,
        }
    }

    fn handle_inactivity_timeout(&self, ctx: &mut StateContext<'_>, kind: TimerKind) -> bool {
        if kind != TimerKind::PlayingNoAudio {
            return false;
        }
        let target = non_playing_target(ctx.flags());
        info!(%target, "No audio while playing, stopping");
        ctx.change_state(target);
        true
    }
}

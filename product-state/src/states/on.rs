//! The powered-on superstate and its playable branch

use tracing::{debug, info, warn};

use super::{ProductState, StateContext};
use crate::command::ProductCommand;
use crate::message::PlaybackRequest;
use crate::model::{KeyAction, SourceSelection, StateId};

/// Everything that runs with the product powered on
pub struct On;

impl On {
    fn fall_back_if_lost(&self, ctx: &mut StateContext<'_>, what: &str, up: bool) -> bool {
        if !up {
            warn!(what, "Subsystem lost while on, returning to booting");
            ctx.change_state(StateId::Booting);
        }
        true
    }

    fn step_volume(&self, ctx: &mut StateContext<'_>, direction: i16) {
        let delta = direction * i16::from(ctx.settings().volume_step);
        match ctx.audio().stepped(delta) {
            Some(level) => ctx.command(ProductCommand::SetVolume(level)),
            None => warn!("Volume key pressed before any volume was reported"),
        }
    }
}

impl ProductState for On {
    fn id(&self) -> StateId {
        StateId::On
    }

    fn handle_lpm_state(&self, ctx: &mut StateContext<'_>, connected: bool) -> bool {
        self.fall_back_if_lost(ctx, "lpm", connected)
    }

    fn handle_caps_state(&self, ctx: &mut StateContext<'_>, initialized: bool) -> bool {
        self.fall_back_if_lost(ctx, "caps", initialized)
    }

    fn handle_audio_path_state(&self, ctx: &mut StateContext<'_>, connected: bool) -> bool {
        self.fall_back_if_lost(ctx, "audio path", connected)
    }

    fn handle_software_update_state(&self, ctx: &mut StateContext<'_>, required: bool) -> bool {
        if !required {
            return false;
        }
        info!("Software update required");
        ctx.change_state(StateId::UpdatingSoftware);
        true
    }

    fn handle_key_action(&self, ctx: &mut StateContext<'_>, action: KeyAction) -> bool {
        match action {
            KeyAction::VolumeUp => self.step_volume(ctx, 1),
            KeyAction::VolumeDown => self.step_volume(ctx, -1),
            KeyAction::Mute => {
                let muted = !ctx.audio().muted;
                ctx.command(ProductCommand::SetMute(muted));
            }
            KeyAction::Tv => ctx.command(ProductCommand::SetSource(SourceSelection::Tv)),
            KeyAction::SoundTouch => {
                ctx.command(ProductCommand::SetSource(SourceSelection::SoundTouch))
            }
            _ => return false,
        }
        true
    }
}

/// Powered on and able to play, but not playing
pub struct Playable;

impl ProductState for Playable {
    fn id(&self) -> StateId {
        StateId::Playable
    }

    fn handle_power_state(&self, ctx: &mut StateContext<'_>) -> bool {
        ctx.change_state(StateId::PlayingInactive);
        true
    }

    fn handle_playback_request(
        &self,
        ctx: &mut StateContext<'_>,
        request: PlaybackRequest,
    ) -> bool {
        if request != PlaybackRequest::Start {
            return false;
        }
        ctx.change_state(StateId::PlayingActive);
        true
    }

    fn handle_key_action(&self, ctx: &mut StateContext<'_>, action: KeyAction) -> bool {
        let selection = match action {
            KeyAction::Source => SourceSelection::Next,
            KeyAction::Tv => SourceSelection::Tv,
            KeyAction::SoundTouch => SourceSelection::SoundTouch,
            other => match other.preset() {
                Some(preset) => SourceSelection::Preset(preset),
                None => return false,
            },
        };
        debug!(%selection, "Source key starts playback");
        ctx.command(ProductCommand::SetSource(selection));
        ctx.change_state(StateId::PlayingActive);
        true
    }
}

//! Startup and software update states

use tracing::{debug, info, warn};

use super::{ProductState, StateContext};
use crate::command::ProductCommand;
use crate::model::{KeyAction, StateId};

/// Waiting for LPM, CAPS, the audio path and STS
pub struct Booting;

impl Booting {
    fn evaluate_exit(&self, ctx: &mut StateContext<'_>) -> bool {
        let flags = ctx.flags();
        if !flags.is_booted() {
            debug!(%flags, "Still booting");
            return true;
        }

        let target = if flags.software_update_required {
            StateId::UpdatingSoftware
        } else if flags.setup_required {
            StateId::Setup
        } else {
            StateId::Playable
        };
        info!(%target, "Boot complete");
        ctx.change_state(target);
        true
    }
}

impl ProductState for Booting {
    fn id(&self) -> StateId {
        StateId::Booting
    }

    fn handle_lpm_state(&self, ctx: &mut StateContext<'_>, _connected: bool) -> bool {
        self.evaluate_exit(ctx)
    }

    fn handle_caps_state(&self, ctx: &mut StateContext<'_>, _initialized: bool) -> bool {
        self.evaluate_exit(ctx)
    }

    fn handle_audio_path_state(&self, ctx: &mut StateContext<'_>, _connected: bool) -> bool {
        self.evaluate_exit(ctx)
    }

    fn handle_sts_sources_init(&self, ctx: &mut StateContext<'_>) -> bool {
        self.evaluate_exit(ctx)
    }

    fn handle_autowake_status(&self, ctx: &mut StateContext<'_>, _active: bool) -> bool {
        self.evaluate_exit(ctx)
    }

    fn handle_key_action(&self, _ctx: &mut StateContext<'_>, action: KeyAction) -> bool {
        debug!(%action, "Key ignored while booting");
        true
    }

    fn handle_power_state(&self, _ctx: &mut StateContext<'_>) -> bool {
        debug!("Power ignored while booting");
        true
    }
}

/// A software update is being installed
pub struct UpdatingSoftware;

impl UpdatingSoftware {
    fn ignore_readiness(&self, what: &str, up: bool) -> bool {
        warn!(what, up, "Readiness change ignored while updating software");
        true
    }
}

impl ProductState for UpdatingSoftware {
    fn id(&self) -> StateId {
        StateId::UpdatingSoftware
    }

    fn handle_lpm_state(&self, _ctx: &mut StateContext<'_>, connected: bool) -> bool {
        self.ignore_readiness("lpm", connected)
    }

    fn handle_caps_state(&self, _ctx: &mut StateContext<'_>, initialized: bool) -> bool {
        self.ignore_readiness("caps", initialized)
    }

    fn handle_audio_path_state(&self, _ctx: &mut StateContext<'_>, connected: bool) -> bool {
        self.ignore_readiness("audio path", connected)
    }

    fn handle_sts_sources_init(&self, _ctx: &mut StateContext<'_>) -> bool {
        self.ignore_readiness("sts", true)
    }

    fn handle_autowake_status(&self, _ctx: &mut StateContext<'_>, active: bool) -> bool {
        self.ignore_readiness("autowake", active)
    }

    fn handle_software_update_state(&self, ctx: &mut StateContext<'_>, required: bool) -> bool {
        if !required {
            let delay_seconds = ctx.settings().reboot_delay_secs;
            info!(delay_seconds, "Software update installed, requesting reboot");
            ctx.command(ProductCommand::RequestReboot { delay_seconds });
        }
        true
    }

    fn handle_key_action(&self, _ctx: &mut StateContext<'_>, action: KeyAction) -> bool {
        debug!(%action, "Key ignored while updating software");
        true
    }

    fn handle_power_state(&self, _ctx: &mut StateContext<'_>) -> bool {
        debug!("Power ignored while updating software");
        true
    }
}

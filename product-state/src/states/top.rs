//! Root of the tree and the simple top-level leaves

use tracing::{debug, info};

use super::{ProductState, StateContext};
use crate::command::ProductCommand;
use crate::model::{KeyAction, SlotId, StateId};

/// Root state; last stop before an event is dropped
pub struct Top;

impl ProductState for Top {
    fn id(&self) -> StateId {
        StateId::Top
    }

    fn handle_source_slot_selected(&self, _ctx: &mut StateContext<'_>, slot: SlotId) -> bool {
        // Selection is informational; the source keys drive transitions
        info!(%slot, "Source slot selected");
        true
    }

    fn handle_key_action(&self, ctx: &mut StateContext<'_>, action: KeyAction) -> bool {
        match action {
            KeyAction::FactoryDefault => {
                info!("Factory default requested");
                ctx.command(ProductCommand::FactoryDefault);
                true
            }
            KeyAction::ApSetup => {
                ctx.change_state(StateId::Setup);
                true
            }
            _ => false,
        }
    }
}

/// Out-of-box setup in progress
pub struct Setup;

impl ProductState for Setup {
    fn id(&self) -> StateId {
        StateId::Setup
    }

    fn handle_setup_state(&self, ctx: &mut StateContext<'_>, required: bool) -> bool {
        if !required {
            info!("Setup complete");
            ctx.change_state(StateId::Playable);
        }
        true
    }

    fn handle_power_state(&self, _ctx: &mut StateContext<'_>) -> bool {
        debug!("Power ignored during setup");
        true
    }
}

/// Product powered down; the LPM keeps the lights off
pub struct Off;

impl ProductState for Off {
    fn id(&self) -> StateId {
        StateId::Off
    }

    fn start(&self, ctx: &mut StateContext<'_>) {
        ctx.command(ProductCommand::RequestPowerOff);
    }

    fn handle_power_state(&self, ctx: &mut StateContext<'_>) -> bool {
        ctx.change_state(StateId::Playable);
        true
    }

    fn handle_lpm_state(&self, ctx: &mut StateContext<'_>, connected: bool) -> bool {
        if connected {
            return false;
        }
        info!("LPM lost while off, rebooting state machine");
        ctx.change_state(StateId::Booting);
        true
    }
}

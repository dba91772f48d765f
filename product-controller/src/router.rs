//! Key and power routing
//!
//! Turns already-resolved key actions into messages on the core queue. The
//! key handler upstream has done all debouncing and long-press resolution;
//! the router only builds the message and enqueues it.

use product_state::{CollaboratorEvent, KeyAction, KeyOrigin, KeyState, ProductMessage};

use crate::error::{ControllerError, Result};
use crate::worker::{Inbound, InboundSender};

/// Posts key and power messages onto the core queue
#[derive(Debug, Clone)]
pub struct KeyRouter {
    tx: InboundSender,
}

impl KeyRouter {
    pub(crate) fn new(tx: InboundSender) -> Self {
        Self { tx }
    }

    /// Route a logical key action
    pub fn route_key(&self, action: KeyAction) -> Result<()> {
        tracing::debug!(%action, "Routing key");
        self.send(Inbound::Message(ProductMessage::KeyData { action }))
    }

    /// Route a power button press
    pub fn route_power(&self) -> Result<()> {
        tracing::debug!("Routing power");
        self.send(Inbound::Message(ProductMessage::Power(true)))
    }

    /// Route a raw key notification as delivered by the key handler
    ///
    /// The notification is validated on the core task; one with a missing
    /// field or an unknown action code is logged and dropped there.
    pub fn route_raw_key(
        &self,
        origin: Option<KeyOrigin>,
        state: Option<KeyState>,
        id: Option<u32>,
        action: Option<u32>,
    ) -> Result<()> {
        self.send(Inbound::Raw(CollaboratorEvent::Key {
            origin,
            state,
            id,
            action,
        }))
    }

    fn send(&self, item: Inbound) -> Result<()> {
        self.tx.send(item).map_err(|_| ControllerError::Stopped)
    }
}

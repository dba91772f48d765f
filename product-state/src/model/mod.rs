//! Core data model types for product state management

pub mod key_action;
pub mod source_slot;
pub mod state_id;

pub use key_action::KeyAction;
pub use source_slot::{SlotId, SourceSelection, SourceSlot};
pub use state_id::StateId;

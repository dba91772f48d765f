use std::time::Duration;

use product_state::SlotId;
use thiserror::Error;

/// Errors that can occur in the product controller
#[derive(Error, Debug)]
pub enum ControllerError {
    /// Configuration rejected by `ControllerConfig::validate`
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// The core task is gone; nothing more can be posted
    #[error("Controller has been stopped")]
    Stopped,

    /// The core task did not answer a status request in time
    #[error("Status request timed out after {0:?}")]
    StatusTimeout(Duration),

    /// The core task thread could not be spawned
    #[error("Failed to spawn core task: {0}")]
    Spawn(#[from] std::io::Error),

    /// Two slot descriptors share an id
    #[error("Duplicate source slot {0}")]
    DuplicateSlot(SlotId),

    /// The coordinator was already initialized
    #[error("Source slots already initialized")]
    AlreadyInitialized,
}

/// Result type for controller operations
pub type Result<T> = std::result::Result<T, ControllerError>;

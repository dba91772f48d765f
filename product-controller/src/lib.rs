//! # Eddie Product Controller
//!
//! A sync-first runtime around the product state machine in `product-state`.
//!
//! ## Overview
//!
//! All product state lives on one core task: a dedicated thread running a
//! current-thread tokio runtime. Collaborators never touch that state. Their
//! callbacks post a message onto the core queue and return immediately, and
//! the core task handles messages one at a time in arrival order.
//!
//! ## Key Features
//!
//! - **Single owner**: readiness flags, the active state and timers are only
//!   ever touched on the core task
//! - **Non-blocking timers**: inactivity timers and deferred messages are
//!   posted back onto the same queue, never slept on
//! - **Key routing**: [`KeyRouter`] turns resolved key actions into messages
//! - **Source slots**: [`SourceSlotCoordinator`] counts slot acknowledgements
//!   and reports completion to the state machine
//! - **Status snapshots**: [`ProductController::status`] copies state out
//!   under the core task's control
//!
//! ## Usage
//!
//! ```rust,no_run
//! use product_controller::{ChannelCommandSink, ControllerConfig, ProductController};
//! use product_state::{KeyAction, ProductMessage};
//!
//! let (sink, commands) = ChannelCommandSink::channel();
//! let controller = ProductController::start(ControllerConfig::default(), sink)?;
//!
//! controller.post(ProductMessage::LpmStatus { connected: true })?;
//! controller.post(ProductMessage::CapsStatus { initialized: true })?;
//! controller.post(ProductMessage::AudioPathStatus { connected: true })?;
//! controller.post(ProductMessage::SelectSourceStatus { initialized: true })?;
//!
//! controller.key_router().route_key(KeyAction::VolumeUp)?;
//!
//! for command in commands.try_iter() {
//!     println!("{}", command);
//! }
//! controller.shutdown();
//! # Ok::<(), product_controller::ControllerError>(())
//! ```

pub mod config;
pub mod error;
pub mod manager;
pub mod router;
pub mod sink;
pub mod sts;
pub mod worker;

// Re-export main types for convenience
pub use config::{ControllerConfig, TimerDurations};
pub use error::{ControllerError, Result};
pub use manager::ProductController;
pub use router::KeyRouter;
pub use sink::{ChannelCommandSink, CommandSink, LoggingCommandSink};
pub use sts::{SinkSourceService, SourceService, SourceSlotCoordinator};
pub use worker::StatusSnapshot;

// Re-export commonly used types from the core
pub use product_state::{
    CollaboratorEvent, KeyAction, ProductCommand, ProductMessage, SlotId, SourceSlot, StateId,
    TimerKind,
};

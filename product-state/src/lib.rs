//! Eddie Product State
//!
//! The control-plane core of the Eddie home audio product: readiness
//! tracking, event normalization, and the hierarchical product state
//! machine that decides the product's power and operating mode.
//!
//! # Architecture
//!
//! ```text
//! CollaboratorEvent → decoder → ProductMessage → normalize → ReadinessFlags
//!                                                    │
//!                                                    ▼
//!                                   ProductEvent → ProductStateMachine → Effects
//! ```
//!
//! Everything in this crate is synchronous and single-owner. The
//! `product-controller` crate wraps [`ProductCore`] in a task with an inbound
//! queue, timers and outbound command delivery.
//!
//! # Quick Start
//!
//! ```rust
//! use product_state::{ProductCore, ProductMessage, StateId};
//!
//! let mut core = ProductCore::default();
//! core.start();
//! core.handle_message(ProductMessage::LpmStatus { connected: true });
//! core.handle_message(ProductMessage::CapsStatus { initialized: true });
//! core.handle_message(ProductMessage::AudioPathStatus { connected: true });
//! core.handle_message(ProductMessage::SelectSourceStatus { initialized: true });
//!
//! assert_eq!(core.active_state(), StateId::NetworkStandbyUnconfigured);
//! ```

pub mod command;
pub mod decoder;
pub mod error;
pub mod event;
pub mod logging;
pub mod machine;
pub mod message;
pub mod model;
pub mod product_core;
pub mod readiness;
pub mod settings;
pub mod states;

pub use command::{Effect, ProductCommand, RadioBand, SystemState, TransportAction};
pub use decoder::{decode_raw, normalize, Normalized};
pub use error::{Result, StateError};
pub use event::{ProductEvent, TimerKind};
pub use machine::{DispatchOutcome, ProductStateMachine};
pub use message::{
    CollaboratorEvent, KeyOrigin, KeyState, NetworkType, PlaybackRequest, ProductMessage,
};
pub use model::{KeyAction, SlotId, SourceSelection, SourceSlot, StateId};
pub use product_core::{CoreSnapshot, HandleOutcome, ProductCore};
pub use readiness::{Flag, Predicate, ReadinessFlags};
pub use settings::{AudioLevels, CoreSettings};

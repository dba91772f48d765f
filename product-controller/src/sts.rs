//! Source-slot coordination
//!
//! Registers the product's source slots with the source service and waits
//! for every one of them to be acknowledged as created. Acknowledgements may
//! arrive in any order and on any thread; the coordinator only counts them.
//!
//! Callbacks always run outside the internal lock so they may call back into
//! the coordinator.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use product_state::{ProductCommand, SlotId, SourceSlot};

use crate::error::{ControllerError, Result};
use crate::sink::CommandSink;

/// External source-management collaborator
pub trait SourceService: Send + Sync {
    /// Register the slots; creation is acknowledged later through
    /// [`SourceSlotCoordinator::acknowledge_created`]
    fn register_slots(&self, slots: &[SourceSlot]);
}

/// Registers slots by issuing a `register-source-slots` command to a sink
pub struct SinkSourceService {
    sink: Arc<dyn CommandSink>,
}

impl SinkSourceService {
    pub fn new(sink: Arc<dyn CommandSink>) -> Self {
        Self { sink }
    }
}

impl SourceService for SinkSourceService {
    fn register_slots(&self, slots: &[SourceSlot]) {
        self.sink
            .deliver(ProductCommand::RegisterSourceSlots(slots.to_vec()));
    }
}

type CreatedCallback = Box<dyn FnOnce() + Send>;
type SelectedCallback = Arc<dyn Fn(SlotId) + Send + Sync>;

#[derive(Default)]
struct Inner {
    initialized: bool,
    slots: Vec<SourceSlot>,
    acknowledged: HashSet<SlotId>,
    selected: Option<SlotId>,
    on_all_created: Option<CreatedCallback>,
    on_slot_selected: Option<SelectedCallback>,
}

impl Inner {
    fn is_complete(&self) -> bool {
        self.initialized && self.acknowledged.len() == self.slots.len()
    }
}

/// Tracks source-slot registration and selection
#[derive(Default)]
pub struct SourceSlotCoordinator {
    inner: Mutex<Inner>,
}

impl SourceSlotCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `slots` with `service`
    ///
    /// `on_all_created` runs exactly once, after every slot has been
    /// acknowledged. `on_slot_selected` runs on every selection reported
    /// through [`slot_selected`](Self::slot_selected).
    pub fn initialize<C, S>(
        &self,
        slots: Vec<SourceSlot>,
        service: &dyn SourceService,
        on_all_created: C,
        on_slot_selected: S,
    ) -> Result<()>
    where
        C: FnOnce() + Send + 'static,
        S: Fn(SlotId) + Send + Sync + 'static,
    {
        let mut seen = HashSet::new();
        if let Some(dup) = slots.iter().find(|slot| !seen.insert(slot.slot_id)) {
            return Err(ControllerError::DuplicateSlot(dup.slot_id));
        }

        let completed = {
            let mut inner = self.inner.lock();
            if inner.initialized {
                return Err(ControllerError::AlreadyInitialized);
            }
            inner.initialized = true;
            inner.slots = slots.clone();
            inner.on_slot_selected = Some(Arc::new(on_slot_selected));

            if slots.is_empty() {
                Some(on_all_created)
            } else {
                inner.on_all_created = Some(Box::new(on_all_created));
                None
            }
        };

        tracing::info!(count = slots.len(), "Registering source slots");
        service.register_slots(&slots);

        if let Some(callback) = completed {
            tracing::info!("No source slots to wait for");
            callback();
        }
        Ok(())
    }

    /// Record that the source service created `slot`
    pub fn acknowledge_created(&self, slot: SlotId) {
        let callback = {
            let mut inner = self.inner.lock();
            if !inner.slots.iter().any(|s| s.slot_id == slot) {
                tracing::warn!(%slot, "Acknowledgement for unknown source slot");
                return;
            }
            if !inner.acknowledged.insert(slot) {
                tracing::debug!(%slot, "Repeated acknowledgement ignored");
                return;
            }
            tracing::debug!(
                %slot,
                acknowledged = inner.acknowledged.len(),
                total = inner.slots.len(),
                "Source slot created"
            );
            if inner.is_complete() {
                inner.on_all_created.take()
            } else {
                None
            }
        };

        if let Some(callback) = callback {
            tracing::info!("All source slots created");
            callback();
        }
    }

    /// Record an external source activation and forward it
    pub fn slot_selected(&self, slot: SlotId) {
        let callback = {
            let mut inner = self.inner.lock();
            if !inner.slots.iter().any(|s| s.slot_id == slot) {
                tracing::debug!(%slot, "Selection of unregistered source slot");
            }
            inner.selected = Some(slot);
            inner.on_slot_selected.clone()
        };

        if let Some(callback) = callback {
            callback(slot);
        }
    }

    /// Most recent selection, if any
    pub fn selected_slot(&self) -> Option<SlotId> {
        self.inner.lock().selected
    }

    pub fn is_complete(&self) -> bool {
        self.inner.lock().is_complete()
    }

    pub fn slots(&self) -> Vec<SourceSlot> {
        self.inner.lock().slots.clone()
    }
}

impl std::fmt::Debug for SourceSlotCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("SourceSlotCoordinator")
            .field("initialized", &inner.initialized)
            .field("slots", &inner.slots.len())
            .field("acknowledged", &inner.acknowledged.len())
            .field("selected", &inner.selected)
            .finish()
    }
}

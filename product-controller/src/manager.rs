//! Sync-first product controller
//!
//! Owns the inbound queue of the single core task. Every method is
//! synchronous and returns as soon as its item is enqueued; the core task
//! processes items strictly in the order they were posted.

use std::sync::{mpsc, Arc};
use std::thread::JoinHandle;
use std::time::Duration;

use parking_lot::Mutex;
use product_state::{CollaboratorEvent, ProductMessage, SourceSlot};
use tokio::sync::mpsc as tokio_mpsc;

use crate::config::ControllerConfig;
use crate::error::{ControllerError, Result};
use crate::router::KeyRouter;
use crate::sink::CommandSink;
use crate::sts::{SinkSourceService, SourceService, SourceSlotCoordinator};
use crate::worker::{spawn_core_worker, Inbound, InboundSender, StatusSnapshot};

/// Handle to a running product controller
///
/// Cloning is cheap; all clones talk to the same core task. The queue
/// closes once every handle and [`KeyRouter`] has been dropped or
/// [`shutdown`](Self::shutdown) was called.
///
/// # Example
///
/// ```rust,no_run
/// use product_controller::{LoggingCommandSink, ProductController, ControllerConfig};
/// use product_state::ProductMessage;
///
/// let controller = ProductController::start(ControllerConfig::default(), LoggingCommandSink)?;
/// controller.post(ProductMessage::LpmStatus { connected: true })?;
/// println!("{}", controller.status()?.state);
/// controller.shutdown();
/// # Ok::<(), product_controller::ControllerError>(())
/// ```
#[derive(Clone)]
pub struct ProductController {
    tx: InboundSender,
    sink: Arc<dyn CommandSink>,
    source_slots: Arc<SourceSlotCoordinator>,
    status_timeout: Duration,
    worker: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl ProductController {
    /// Validate `config` and spawn the core task
    pub fn start<S>(config: ControllerConfig, sink: S) -> Result<Self>
    where
        S: CommandSink + 'static,
    {
        Self::start_with_sink(config, Arc::new(sink))
    }

    /// Like [`start`](Self::start) with a sink the caller keeps a handle to
    pub fn start_with_sink(config: ControllerConfig, sink: Arc<dyn CommandSink>) -> Result<Self> {
        config.validate()?;

        let (tx, rx) = tokio_mpsc::unbounded_channel();
        let status_timeout = config.status_timeout;
        let worker = spawn_core_worker(config, Arc::clone(&sink), tx.downgrade(), rx)?;
        tracing::info!("Product controller started");

        Ok(Self {
            tx,
            sink,
            source_slots: Arc::new(SourceSlotCoordinator::new()),
            status_timeout,
            worker: Arc::new(Mutex::new(Some(worker))),
        })
    }

    /// Enqueue a normalized message
    pub fn post(&self, message: ProductMessage) -> Result<()> {
        self.send(Inbound::Message(message))
    }

    /// Enqueue a raw collaborator notification
    pub fn post_raw(&self, event: CollaboratorEvent) -> Result<()> {
        self.send(Inbound::Raw(event))
    }

    /// Enqueue `message` once `delay` has passed
    ///
    /// Messages posted in the meantime are processed first.
    pub fn post_after(&self, delay: Duration, message: ProductMessage) -> Result<()> {
        self.send(Inbound::Deferred { delay, message })
    }

    /// Snapshot of the controller state, copied out by the core task
    ///
    /// Reflects every item posted before the call.
    pub fn status(&self) -> Result<StatusSnapshot> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.send(Inbound::Status(reply_tx))?;
        match reply_rx.recv_timeout(self.status_timeout) {
            Ok(snapshot) => Ok(snapshot),
            Err(mpsc::RecvTimeoutError::Timeout) => {
                Err(ControllerError::StatusTimeout(self.status_timeout))
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(ControllerError::Stopped),
        }
    }

    /// Router for key and power presses
    pub fn key_router(&self) -> KeyRouter {
        KeyRouter::new(self.tx.clone())
    }

    /// Register the product's source slots through the command sink
    ///
    /// Completion posts `SelectSourceStatus(initialized=true)`; every
    /// selection reported to [`source_slots`](Self::source_slots) posts
    /// `SelectSourceSlot`.
    pub fn register_source_slots(&self, slots: Vec<SourceSlot>) -> Result<()> {
        let service = SinkSourceService::new(Arc::clone(&self.sink));
        self.register_source_slots_with(slots, &service)
    }

    /// Register the product's source slots with an explicit source service
    pub fn register_source_slots_with(
        &self,
        slots: Vec<SourceSlot>,
        service: &dyn SourceService,
    ) -> Result<()> {
        let created_tx = self.tx.downgrade();
        let selected_tx = self.tx.downgrade();

        self.source_slots.initialize(
            slots,
            service,
            move || {
                post_weak(
                    &created_tx,
                    ProductMessage::SelectSourceStatus { initialized: true },
                )
            },
            move |slot| post_weak(&selected_tx, ProductMessage::SelectSourceSlot { slot }),
        )
    }

    /// Coordinator receiving slot acknowledgements and selections
    pub fn source_slots(&self) -> Arc<SourceSlotCoordinator> {
        Arc::clone(&self.source_slots)
    }

    /// Stop the core task and wait for it to exit
    ///
    /// Items posted before the call are processed first. Safe to call more
    /// than once and from any clone.
    pub fn shutdown(&self) {
        let _ = self.tx.send(Inbound::Shutdown);
        if let Some(worker) = self.worker.lock().take() {
            if worker.join().is_err() {
                tracing::error!("Core task panicked");
            }
            tracing::info!("Product controller stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker
            .lock()
            .as_ref()
            .map(|worker| !worker.is_finished())
            .unwrap_or(false)
    }

    fn send(&self, item: Inbound) -> Result<()> {
        self.tx.send(item).map_err(|_| ControllerError::Stopped)
    }
}

impl std::fmt::Debug for ProductController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductController")
            .field("running", &self.is_running())
            .field("source_slots", &self.source_slots)
            .finish()
    }
}

/// Posts from collaborator callbacks, which must not keep the queue open
fn post_weak(tx: &tokio_mpsc::WeakUnboundedSender<Inbound>, message: ProductMessage) {
    let kind = message.kind();
    let delivered = tx
        .upgrade()
        .map(|tx| tx.send(Inbound::Message(message)).is_ok())
        .unwrap_or(false);
    if !delivered {
        tracing::debug!(kind, "Controller stopped, dropping message");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::ChannelCommandSink;

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = ControllerConfig::for_testing().with_volume_step(0);
        let result = ProductController::start(config, ChannelCommandSink::channel().0);
        assert!(matches!(result, Err(ControllerError::Configuration(_))));
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let (sink, _rx) = ChannelCommandSink::channel();
        let controller = ProductController::start(ControllerConfig::for_testing(), sink).unwrap();
        let clone = controller.clone();
        assert!(controller.is_running());

        controller.shutdown();
        clone.shutdown();
        assert!(!clone.is_running());
        assert!(matches!(
            clone.post(ProductMessage::Power(true)),
            Err(ControllerError::Stopped)
        ));
    }
}

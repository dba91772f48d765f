//! The single core task
//!
//! Spawns a thread with its own current-thread tokio runtime. The thread owns
//! the [`ProductCore`] and is the only place the state machine runs. Everyone
//! else talks to it through an unbounded queue, which is processed strictly
//! in arrival order.
//!
//! Timers never block the task: each one is a spawned sleep that posts
//! `TimerExpired` back onto the same queue. A restarted or cancelled timer
//! bumps its generation, so a late expiry from an older generation is
//! recognised and discarded.

use std::collections::HashMap;
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use product_state::{
    CollaboratorEvent, Effect, ProductCore, ProductMessage, ReadinessFlags, SlotId, StateId,
    TimerKind,
};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, WeakUnboundedSender};

use crate::config::{ControllerConfig, TimerDurations};
use crate::sink::CommandSink;

/// Items accepted by the core task
#[derive(Debug)]
pub(crate) enum Inbound {
    /// A normalized message
    Message(ProductMessage),
    /// A raw collaborator notification, normalized on the core task
    Raw(CollaboratorEvent),
    /// Post `message` after `delay`
    Deferred {
        delay: Duration,
        message: ProductMessage,
    },
    /// A state timer fired
    TimerExpired { kind: TimerKind, generation: u64 },
    /// Copy the current state out to the caller
    Status(mpsc::Sender<StatusSnapshot>),
    /// Stop the task
    Shutdown,
}

/// Point-in-time copy of the controller state, taken on the core task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub state: StateId,
    pub active_path: Vec<StateId>,
    pub flags: ReadinessFlags,
    pub volume: Option<u8>,
    pub muted: bool,
    pub selected_slot: Option<SlotId>,
    pub pending_timers: Vec<TimerKind>,
    /// Inbound items handled so far, timers included
    pub processed: u64,
}

/// Spawns the core task thread
pub(crate) fn spawn_core_worker(
    config: ControllerConfig,
    sink: Arc<dyn CommandSink>,
    inbound_tx: WeakUnboundedSender<Inbound>,
    inbound_rx: UnboundedReceiver<Inbound>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("product-core".to_string())
        .spawn(move || {
            let rt = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    tracing::error!("Failed to create tokio runtime for core task: {}", e);
                    return;
                }
            };

            rt.block_on(async move {
                let mut task = CoreTask::new(config, sink, inbound_tx);
                task.run(inbound_rx).await;
            });
        })
}

struct PendingTimer {
    generation: u64,
    handle: tokio::task::JoinHandle<()>,
}

struct CoreTask {
    core: ProductCore,
    timers: TimerDurations,
    sink: Arc<dyn CommandSink>,
    inbound_tx: WeakUnboundedSender<Inbound>,
    pending: HashMap<TimerKind, PendingTimer>,
    next_generation: u64,
}

impl CoreTask {
    fn new(
        config: ControllerConfig,
        sink: Arc<dyn CommandSink>,
        inbound_tx: WeakUnboundedSender<Inbound>,
    ) -> Self {
        Self {
            core: ProductCore::new(config.settings),
            timers: config.timers,
            sink,
            inbound_tx,
            pending: HashMap::new(),
            next_generation: 0,
        }
    }

    async fn run(&mut self, mut inbound_rx: UnboundedReceiver<Inbound>) {
        let effects = self.core.start();
        self.apply(effects);
        tracing::info!(state = %self.core.active_state(), "Core task started");

        while let Some(item) = inbound_rx.recv().await {
            match item {
                Inbound::Message(message) => {
                    let outcome = self.core.handle_message(message);
                    self.apply(outcome.effects);
                }
                Inbound::Raw(raw) => {
                    let outcome = self.core.handle_raw(&raw);
                    self.apply(outcome.effects);
                }
                Inbound::Deferred { delay, message } => self.defer(delay, message),
                Inbound::TimerExpired { kind, generation } => self.on_timer(kind, generation),
                Inbound::Status(reply) => {
                    if reply.send(self.snapshot()).is_err() {
                        tracing::debug!("Status requester went away");
                    }
                }
                Inbound::Shutdown => {
                    tracing::info!("Core task received shutdown command");
                    break;
                }
            }
        }

        for (_, timer) in self.pending.drain() {
            timer.handle.abort();
        }
        tracing::info!("Core task shut down");
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Command(command) => {
                    tracing::debug!(%command, "Delivering command");
                    self.sink.deliver(command);
                }
                Effect::StartTimer(kind) => self.start_timer(kind),
                Effect::CancelTimer(kind) => self.cancel_timer(kind),
            }
        }
    }

    fn start_timer(&mut self, kind: TimerKind) {
        self.cancel_timer(kind);

        self.next_generation += 1;
        let generation = self.next_generation;
        let duration = self.timers.duration(kind);
        let handle = post_later(
            self.inbound_tx.clone(),
            duration,
            Inbound::TimerExpired { kind, generation },
        );
        tracing::debug!(?kind, generation, ?duration, "Timer started");
        self.pending.insert(kind, PendingTimer { generation, handle });
    }

    fn cancel_timer(&mut self, kind: TimerKind) {
        if let Some(timer) = self.pending.remove(&kind) {
            timer.handle.abort();
            tracing::debug!(?kind, generation = timer.generation, "Timer cancelled");
        }
    }

    fn on_timer(&mut self, kind: TimerKind, generation: u64) {
        match self.pending.get(&kind) {
            Some(timer) if timer.generation == generation => {
                self.pending.remove(&kind);
                let outcome = self.core.handle_timer(kind);
                self.apply(outcome.effects);
            }
            _ => tracing::debug!(?kind, generation, "Discarding stale timer"),
        }
    }

    fn defer(&self, delay: Duration, message: ProductMessage) {
        tracing::debug!(kind = message.kind(), ?delay, "Deferring message");
        post_later(self.inbound_tx.clone(), delay, Inbound::Message(message));
    }

    fn snapshot(&self) -> StatusSnapshot {
        let core = self.core.snapshot();
        let mut pending_timers: Vec<TimerKind> = self.pending.keys().copied().collect();
        pending_timers.sort_by_key(|kind| TimerKind::ALL.iter().position(|k| k == kind));
        StatusSnapshot {
            state: core.state,
            active_path: core.active_path,
            flags: core.flags,
            volume: core.audio.volume,
            muted: core.audio.muted,
            selected_slot: core.selected_slot,
            pending_timers,
            processed: core.processed,
        }
    }
}

/// Post `item` back onto the queue after `delay`
///
/// Holds only a weak sender while sleeping so pending timers never keep a
/// dropped controller alive.
fn post_later(
    tx: WeakUnboundedSender<Inbound>,
    delay: Duration,
    item: Inbound,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        match tx.upgrade() {
            Some(tx) => {
                let _ = tx.send(item);
            }
            None => tracing::debug!("Controller gone, dropping delayed item"),
        }
    })
}

/// Sender half of the core queue, shared by the facade and the key router
pub(crate) type InboundSender = UnboundedSender<Inbound>;
